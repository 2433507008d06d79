pub mod constants;
pub mod conversions;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use conversions::{kelvin, pressure_dbar, pressure_pa};
pub use filename::{bufr_output_path, find_profile_files, output_file_name, profile_name_from_filename};
pub use progress::ProgressReporter;
