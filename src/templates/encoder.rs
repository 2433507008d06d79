use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{
    Assignment, FieldKey, MetadataField, PlatformMetadata, SelectedLevel, SelectedProfile,
    TemplateMessage, Value,
};
use crate::templates::descriptor::{
    FixedStep, FixedValue, LevelStep, LevelValue, QualityFlagPair, Slot,
    TemplateDescriptor,
};
use crate::templates::TemplateKind;
use crate::utils::constants::{
    BUFR_EDITION, DATA_CATEGORY_OCEANOGRAPHIC, DEFAULT_CENTRE_CODE,
    DEFAULT_MASTER_TABLES_VERSION, DEFAULT_SUB_CENTRE, DIRECTION_MISSING, DIRECTION_UPWARD,
    LOCAL_TABLES_VERSION, MASTER_TABLE_NUMBER, PRESSURE_DECIMALS,
};
use crate::utils::conversions::{dbar_to_pa, metres_to_centimetres, round_to};

const QUALIFIER_KEY: &str = "QualifierForGTSPPQualityFlag";
const GLOBAL_FLAG_KEY: &str = "GlobalGTSPPQualityFlag";

/// Section 1 identification shared by every template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub centre_code: u16,
    pub sub_centre: u16,
    pub master_tables_version: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            centre_code: DEFAULT_CENTRE_CODE,
            sub_centre: DEFAULT_SUB_CENTRE,
            master_tables_version: DEFAULT_MASTER_TABLES_VERSION,
        }
    }
}

/// Occurrence counters for one encode call
///
/// Quality flags form their own repeated group: their occurrence advances
/// once per flag pair, while physical fields advance once per level.
#[derive(Debug, Default)]
struct IndexCounters {
    level: usize,
    flag: usize,
}

impl IndexCounters {
    fn field(&self, base: usize) -> usize {
        self.level + base
    }

    fn next_flag(&mut self) -> usize {
        self.flag += 1;
        self.flag
    }

    fn next_level(&mut self) {
        self.level += 1;
    }
}

/// Borrowed inputs of one encode call
struct EncodingContext<'a> {
    descriptor: &'static TemplateDescriptor,
    profile: &'a SelectedProfile,
    metadata: &'a PlatformMetadata,
    first: &'a SelectedLevel,
    last: &'a SelectedLevel,
}

impl<'a> EncodingContext<'a> {
    fn level_value(&self, level: &SelectedLevel, value: LevelValue) -> Value {
        let timestamp = level.timestamp();
        match value {
            LevelValue::Year => Value::Int(timestamp.year() as i64),
            LevelValue::Month => Value::Int(timestamp.month() as i64),
            LevelValue::Day => Value::Int(timestamp.day() as i64),
            LevelValue::Hour => Value::Int(timestamp.hour() as i64),
            LevelValue::Minute => Value::Int(timestamp.minute() as i64),
            LevelValue::Latitude => Value::Float(level.observation.latitude),
            LevelValue::Longitude => Value::Float(level.observation.longitude),
            LevelValue::Depth => Value::Float(level.depth()),
            LevelValue::Pressure => Value::Float(round_to(
                dbar_to_pa(level.pressure_dbar),
                PRESSURE_DECIMALS,
            )),
            LevelValue::Temperature => Value::Float(level.temperature_kelvin),
            LevelValue::Missing => Value::Missing,
        }
    }

    fn metadata_text(&self, field: MetadataField) -> Result<String> {
        self.metadata
            .text(field)
            .ok_or_else(|| ProcessingError::MissingMetadata(field.to_string()))
    }

    fn fixed_value(&self, value: FixedValue) -> Result<Value> {
        let resolved = match value {
            FixedValue::Int(v) => Value::Int(v),
            FixedValue::Missing => Value::Missing,
            FixedValue::Metadata(MetadataField::InstrumentSerial) => {
                let serial = self.metadata.instrument_serial.ok_or_else(|| {
                    ProcessingError::MissingMetadata(MetadataField::InstrumentSerial.to_string())
                })?;
                Value::Int(serial as i64)
            }
            FixedValue::Metadata(field) | FixedValue::MetadataText(field) => {
                Value::Text(self.metadata_text(field)?)
            }
            FixedValue::Direction => Value::Int(if self.profile.upcast_applied {
                DIRECTION_UPWARD
            } else {
                DIRECTION_MISSING
            }),
            FixedValue::First(level_value) => self.level_value(self.first, level_value),
            FixedValue::Last(level_value) => self.level_value(self.last, level_value),
            FixedValue::MaxDepth => match self.profile.max_depth() {
                Some(depth) => Value::Float(depth),
                None => Value::Missing,
            },
            FixedValue::SurfaceDepthCentimetres => {
                Value::Float(metres_to_centimetres(self.first.depth()))
            }
        };
        Ok(resolved)
    }

    fn fixed(&self, step: &FixedStep) -> Result<Assignment> {
        let key = match step.slot {
            Slot::Plain(name) => FieldKey::plain(name),
            Slot::Nth(n, name) => FieldKey::nth(n, name),
            Slot::AfterLevels(offset, name) => FieldKey::nth(self.profile.len() + offset, name),
        };
        Ok(Assignment::new(key, self.fixed_value(step.value)?))
    }
}

/// Maps a selected profile onto a BUFR template's assignment sequence
#[derive(Debug, Clone, Default)]
pub struct TemplateEncoder {
    settings: EncoderSettings,
}

impl TemplateEncoder {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    /// Build the complete message for one profile
    ///
    /// Required metadata is checked before anything is generated; on error
    /// no partial sequence escapes.
    pub fn encode(
        &self,
        kind: TemplateKind,
        profile: &SelectedProfile,
        metadata: &PlatformMetadata,
    ) -> Result<TemplateMessage> {
        let descriptor = TemplateDescriptor::for_kind(kind);
        metadata.require(descriptor.required_metadata)?;

        let (first, last) = match (profile.first(), profile.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(ProcessingError::NoQualifyingLevels {
                    policy: "empty selected profile".to_string(),
                })
            }
        };

        let context = EncodingContext {
            descriptor,
            profile,
            metadata,
            first,
            last,
        };

        let flags_per_level = descriptor.flags_per_level();
        let mut data = Vec::with_capacity(
            descriptor.leading.len()
                + descriptor.trailing.len()
                + profile.len() * (descriptor.level_steps.len() + flags_per_level),
        );

        for step in descriptor.leading {
            data.push(context.fixed(step)?);
        }

        let mut counters = IndexCounters::default();
        for level in &profile.levels {
            for step in descriptor.level_steps {
                match *step {
                    LevelStep::Field { base, name, value } => data.push(Assignment::new(
                        FieldKey::nth(counters.field(base), name),
                        context.level_value(level, value),
                    )),
                    LevelStep::Flag(pair) => push_flag_pair(&mut data, counters.next_flag(), pair),
                }
            }
            counters.next_level();
            debug_assert_eq!(counters.flag, counters.level * flags_per_level);
        }

        for step in descriptor.trailing {
            data.push(context.fixed(step)?);
        }

        debug!(
            "Encoded {} levels into {} {} assignments",
            profile.len(),
            data.len(),
            kind
        );

        Ok(TemplateMessage {
            template: kind,
            level_count: profile.len(),
            header: self.header(first),
            replication_factors: descriptor.replication_factors(profile.len()),
            unexpanded_descriptors: descriptor.unexpanded_descriptors.to_vec(),
            data,
        })
    }

    /// Identification section, dated by the first level
    fn header(&self, first: &SelectedLevel) -> Vec<Assignment> {
        let timestamp = first.timestamp();
        let set = |name: &'static str, value: i64| Assignment::new(FieldKey::plain(name), Value::Int(value));

        vec![
            set("edition", BUFR_EDITION),
            set("masterTableNumber", MASTER_TABLE_NUMBER),
            set("bufrHeaderSubCentre", self.settings.sub_centre as i64),
            set("bufrHeaderCentre", self.settings.centre_code as i64),
            set("updateSequenceNumber", 0),
            set("dataCategory", DATA_CATEGORY_OCEANOGRAPHIC),
            set("masterTablesVersionNumber", self.settings.master_tables_version as i64),
            set("localTablesVersionNumber", LOCAL_TABLES_VERSION),
            set("typicalYearOfCentury", (timestamp.year() % 100) as i64),
            set("typicalMonth", timestamp.month() as i64),
            set("typicalDay", timestamp.day() as i64),
            set("typicalHour", timestamp.hour() as i64),
            set("typicalMinute", timestamp.minute() as i64),
            set("numberOfSubsets", 1),
            set("observedData", 1),
            set("compressedData", 0),
        ]
    }
}

fn push_flag_pair(data: &mut Vec<Assignment>, occurrence: usize, pair: QualityFlagPair) {
    data.push(Assignment::new(
        FieldKey::nth(occurrence, QUALIFIER_KEY),
        Value::Int(pair.qualifier),
    ));
    data.push(Assignment::new(
        FieldKey::nth(occurrence, GLOBAL_FLAG_KEY),
        Value::Int(pair.global),
    ));
}
