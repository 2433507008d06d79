use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// Global attributes attached to a source dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetAttributes {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub public: bool,

    #[serde(default)]
    pub wigos_id: Option<String>,

    /// `dd/mm/YYYY`
    #[serde(default)]
    pub publication_date: Option<String>,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub moana_serial_number: Option<String>,

    #[serde(default, deserialize_with = "deserialize_text")]
    pub deck_unit_serial_number: Option<String>,

    #[serde(default)]
    pub vessel_id: Option<String>,

    #[serde(default)]
    pub platform_code: Option<String>,
}

impl DatasetAttributes {
    pub fn parsed_publication_date(&self) -> Result<Option<NaiveDate>> {
        match present(&self.publication_date) {
            Some(date) => Ok(Some(NaiveDate::parse_from_str(&date, "%d/%m/%Y")?)),
            None => Ok(None),
        }
    }

    pub fn parsed_wigos_id(&self) -> Result<Option<WigosId>> {
        present(&self.wigos_id)
            .map(|id| id.parse::<WigosId>())
            .transpose()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(value) => value,
        FlagRepr::Int(value) => value != 0,
        FlagRepr::Text(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "1"
        ),
    };
    Ok(flag)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<TextRepr>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        TextRepr::Int(i) => i.to_string(),
        TextRepr::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
        TextRepr::Float(f) => f.to_string(),
        TextRepr::Text(s) => s,
    }))
}

/// Blank values and the netCDF `nan` placeholder count as absent
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
        .map(str::to_string)
}

/// WIGOS station identifier, `series-issuer-issue_number-local_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WigosId {
    pub series: u8,
    pub issuer: u32,
    pub issue_number: u32,
    pub local_id: String,
}

impl FromStr for WigosId {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ProcessingError::InvalidWigosId(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();

        if parts.len() != 4 || parts[3].is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            series: parts[0].parse().map_err(|_| invalid())?,
            issuer: parts[1].parse().map_err(|_| invalid())?,
            issue_number: parts[2].parse().map_err(|_| invalid())?,
            local_id: parts[3].to_string(),
        })
    }
}

impl fmt::Display for WigosId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.series, self.issuer, self.issue_number, self.local_id
        )
    }
}

/// Platform fields a template may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Manufacturer,
    InstrumentSerial,
    DeckUnitSerial,
    VesselId,
    CruiseId,
    ProfileName,
}

impl MetadataField {
    pub fn name(&self) -> &'static str {
        match self {
            MetadataField::Manufacturer => "manufacturer",
            MetadataField::InstrumentSerial => "instrument_serial",
            MetadataField::DeckUnitSerial => "deck_unit_serial",
            MetadataField::VesselId => "vessel_id",
            MetadataField::CruiseId => "cruise_id",
            MetadataField::ProfileName => "profile_name",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-profile platform constants, immutable while encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlatformMetadata {
    #[validate(length(min = 1))]
    pub manufacturer: String,

    pub instrument_serial: Option<u32>,
    pub deck_unit_serial: Option<String>,
    pub vessel_id: Option<String>,
    pub cruise_id: Option<String>,
    pub profile_name: Option<String>,
    pub wigos_id: Option<WigosId>,
}

impl PlatformMetadata {
    pub fn new(manufacturer: &str) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            instrument_serial: None,
            deck_unit_serial: None,
            vessel_id: None,
            cruise_id: None,
            profile_name: None,
            wigos_id: None,
        }
    }

    /// Build platform metadata from dataset attributes
    ///
    /// Unparsable serial numbers and identifiers are left empty; the encoder
    /// reports them when the template needs them.
    pub fn from_attributes(
        attributes: &DatasetAttributes,
        manufacturer: &str,
        profile_name: Option<String>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            instrument_serial: present(&attributes.moana_serial_number)
                .and_then(|s| s.parse::<u32>().ok()),
            deck_unit_serial: present(&attributes.deck_unit_serial_number),
            vessel_id: present(&attributes.vessel_id),
            cruise_id: present(&attributes.platform_code),
            profile_name: present(&profile_name),
            wigos_id: attributes.parsed_wigos_id().ok().flatten(),
        }
    }

    pub fn with_instrument_serial(mut self, serial: u32) -> Self {
        self.instrument_serial = Some(serial);
        self
    }

    pub fn with_deck_unit_serial(mut self, serial: &str) -> Self {
        self.deck_unit_serial = Some(serial.to_string());
        self
    }

    pub fn with_vessel_id(mut self, vessel_id: &str) -> Self {
        self.vessel_id = Some(vessel_id.to_string());
        self
    }

    pub fn with_cruise_id(mut self, cruise_id: &str) -> Self {
        self.cruise_id = Some(cruise_id.to_string());
        self
    }

    pub fn with_profile_name(mut self, profile_name: &str) -> Self {
        self.profile_name = Some(profile_name.to_string());
        self
    }

    pub fn has(&self, field: MetadataField) -> bool {
        match field {
            MetadataField::Manufacturer => !self.manufacturer.trim().is_empty(),
            MetadataField::InstrumentSerial => self.instrument_serial.is_some(),
            MetadataField::DeckUnitSerial => present(&self.deck_unit_serial).is_some(),
            MetadataField::VesselId => present(&self.vessel_id).is_some(),
            MetadataField::CruiseId => present(&self.cruise_id).is_some(),
            MetadataField::ProfileName => present(&self.profile_name).is_some(),
        }
    }

    /// Text form of a field, `None` when absent
    pub fn text(&self, field: MetadataField) -> Option<String> {
        match field {
            MetadataField::Manufacturer => Some(self.manufacturer.clone())
                .filter(|m| !m.trim().is_empty()),
            MetadataField::InstrumentSerial => self.instrument_serial.map(|s| s.to_string()),
            MetadataField::DeckUnitSerial => present(&self.deck_unit_serial),
            MetadataField::VesselId => present(&self.vessel_id),
            MetadataField::CruiseId => present(&self.cruise_id),
            MetadataField::ProfileName => present(&self.profile_name),
        }
    }

    /// Fail on the first field in `required` that is absent
    pub fn require(&self, required: &[MetadataField]) -> Result<()> {
        self.validate()?;

        match required.iter().find(|field| !self.has(**field)) {
            Some(field) => Err(ProcessingError::MissingMetadata(field.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wigos_id_parsing() {
        let id: WigosId = "0-554-0-1234567".parse().unwrap();
        assert_eq!(id.series, 0);
        assert_eq!(id.issuer, 554);
        assert_eq!(id.issue_number, 0);
        assert_eq!(id.local_id, "1234567");
        assert_eq!(id.to_string(), "0-554-0-1234567");

        assert!("nan".parse::<WigosId>().is_err());
        assert!("0-554-0".parse::<WigosId>().is_err());
        assert!("x-554-0-12".parse::<WigosId>().is_err());
    }

    #[test]
    fn test_attributes_from_json() {
        let json = r#"{
            "public": "True",
            "wigos_id": "0-554-0-1234567",
            "publication_date": "01/02/2023",
            "moana_serial_number": 58,
            "deck_unit_serial_number": "434",
            "vessel_id": "ZMFR",
            "platform_code": "nan"
        }"#;
        let attributes: DatasetAttributes = serde_json::from_str(json).unwrap();

        assert!(attributes.public);
        assert_eq!(attributes.moana_serial_number.as_deref(), Some("58"));
        assert_eq!(
            attributes.parsed_publication_date().unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );

        let metadata = PlatformMetadata::from_attributes(
            &attributes,
            "Mangopare",
            Some("230228081912".to_string()),
        );
        assert_eq!(metadata.instrument_serial, Some(58));
        assert_eq!(metadata.deck_unit_serial.as_deref(), Some("434"));
        assert_eq!(metadata.cruise_id, None);
        assert!(metadata.wigos_id.is_some());
    }

    #[test]
    fn test_public_flag_variants() {
        let hidden: DatasetAttributes = serde_json::from_str(r#"{"public": "False"}"#).unwrap();
        assert!(!hidden.public);

        let shown: DatasetAttributes = serde_json::from_str(r#"{"public": true}"#).unwrap();
        assert!(shown.public);

        let absent: DatasetAttributes = serde_json::from_str("{}").unwrap();
        assert!(!absent.public);
    }

    #[test]
    fn test_require_reports_first_missing_field() {
        let metadata = PlatformMetadata::new("Mangopare").with_instrument_serial(58);

        assert!(metadata.require(&[MetadataField::InstrumentSerial]).is_ok());

        let err = metadata
            .require(&[MetadataField::InstrumentSerial, MetadataField::DeckUnitSerial])
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MissingMetadata(ref f) if f == "deck_unit_serial"));
    }

    #[test]
    fn test_blank_and_nan_values_are_missing() {
        let metadata = PlatformMetadata::new("Mangopare")
            .with_vessel_id("  ")
            .with_cruise_id("nan");

        assert!(!metadata.has(MetadataField::VesselId));
        assert!(!metadata.has(MetadataField::CruiseId));
        assert!(PlatformMetadata::new("").require(&[]).is_err());
    }
}
