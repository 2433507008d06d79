use crate::utils::constants::{CELSIUS_TO_KELVIN, DBAR_TO_PA};

/// Convert depth to sea pressure in decibars (Saunders, 1981)
///
/// Saunders, P. M., 1981: Practical Conversion of Pressure to Depth.
/// J. Phys. Oceanogr., 11, 573-574.
///
/// # Examples
/// ```
/// use gts_encoder::utils::conversions::pressure_dbar;
///
/// let pressure = pressure_dbar(7321.45, 30.0);
/// assert!((pressure - 7500.006513).abs() < 0.0001);
/// ```
pub fn pressure_dbar(depth_m: f64, latitude_deg: f64) -> f64 {
    let x = latitude_deg.abs().to_radians().sin();
    let c1 = 5.92e-3 + x.powi(2) * 5.25e-3;
    let one_minus_c1 = 1.0 - c1;

    (one_minus_c1 - (one_minus_c1.powi(2) - 8.84e-6 * depth_m).sqrt()) / 4.42e-6
}

/// Convert depth to sea pressure in pascals
pub fn pressure_pa(depth_m: f64, latitude_deg: f64) -> f64 {
    dbar_to_pa(pressure_dbar(depth_m, latitude_deg))
}

pub fn dbar_to_pa(pressure_dbar: f64) -> f64 {
    pressure_dbar * DBAR_TO_PA
}

/// Convert a temperature in degrees Celsius to kelvin
pub fn kelvin(celsius: f64) -> f64 {
    celsius + CELSIUS_TO_KELVIN
}

/// BUFR surface depths are carried in centimetres
pub fn metres_to_centimetres(metres: f64) -> f64 {
    metres * 100.0
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_at_surface_is_zero() {
        for latitude in [-90.0, -45.5, -41.3, 0.0, 12.0, 30.0, 89.9, 90.0] {
            let pressure = pressure_dbar(0.0, latitude);
            assert!(
                pressure.abs() < 1e-9,
                "pressure at latitude {} was {}",
                latitude,
                pressure
            );
        }
    }

    #[test]
    fn test_saunders_check_value() {
        let pressure = pressure_dbar(7321.45, 30.0);
        assert!((pressure - 7500.0065130118019).abs() < 1e-6);
    }

    #[test]
    fn test_pressure_increases_with_depth() {
        for latitude in [-60.0, -41.0, 0.0, 45.0] {
            let mut previous = pressure_dbar(0.0, latitude);
            for step in 1..=400 {
                let depth = step as f64 * 2.5;
                let pressure = pressure_dbar(depth, latitude);
                assert!(pressure > previous, "not increasing at depth {}", depth);
                previous = pressure;
            }
        }
    }

    #[test]
    fn test_pressure_is_symmetric_in_latitude() {
        assert_eq!(pressure_dbar(150.0, -41.2), pressure_dbar(150.0, 41.2));
    }

    #[test]
    fn test_pressure_pa_scaling() {
        let dbar = pressure_dbar(100.0, -40.0);
        assert!((pressure_pa(100.0, -40.0) - dbar * 10000.0).abs() < 1e-6);
        assert_eq!(dbar_to_pa(1.5), 15000.0);
    }

    #[test]
    fn test_kelvin() {
        assert_eq!(kelvin(0.0), 273.15);
        for celsius in [-1.8, 0.0, 4.25, 12.5, 29.9] {
            assert!((kelvin(celsius) - 273.15 - celsius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(30.2268, 2), 30.23);
        assert_eq!(round_to(10.0041, 2), 10.0);
        assert_eq!(metres_to_centimetres(1.25), 125.0);
    }
}
