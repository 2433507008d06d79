use crate::models::MetadataField;
use crate::templates::TemplateKind;
use crate::utils::constants::{
    GLOBAL_GOOD, GLOBAL_MISSING, QUALIFIER_DEPTH, QUALIFIER_MISSING, QUALIFIER_POSITION,
    QUALIFIER_PRESSURE, QUALIFIER_TEMPERATURE,
};

/// Key of a field set once per message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `name`
    Plain(&'static str),
    /// `#n#name`
    Nth(usize, &'static str),
    /// `#(levels + offset)#name`, for groups that follow the level block
    AfterLevels(usize, &'static str),
}

/// Value of a field set once per message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedValue {
    Int(i64),
    Missing,
    /// Integer for the instrument serial, text otherwise
    Metadata(MetadataField),
    /// Always text
    MetadataText(MetadataField),
    /// Upward when the upcast was selected, missing otherwise
    Direction,
    First(LevelValue),
    Last(LevelValue),
    MaxDepth,
    SurfaceDepthCentimetres,
}

/// Per-level quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelValue {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Latitude,
    Longitude,
    Depth,
    Pressure,
    Temperature,
    Missing,
}

/// Code table 0 08 080 qualifier with its 0 33 050 global flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityFlagPair {
    pub qualifier: i64,
    pub global: i64,
}

impl QualityFlagPair {
    pub const POSITION: Self = Self::good(QUALIFIER_POSITION);
    pub const DEPTH: Self = Self::good(QUALIFIER_DEPTH);
    pub const PRESSURE: Self = Self::good(QUALIFIER_PRESSURE);
    pub const TEMPERATURE: Self = Self::good(QUALIFIER_TEMPERATURE);
    pub const NOT_MEASURED: Self = Self {
        qualifier: QUALIFIER_MISSING,
        global: GLOBAL_MISSING,
    };

    const fn good(qualifier: i64) -> Self {
        Self {
            qualifier,
            global: GLOBAL_GOOD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    pub slot: Slot,
    pub value: FixedValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LevelStep {
    /// Occurrence `level + base` of `name`, levels counted from zero
    Field {
        base: usize,
        name: &'static str,
        value: LevelValue,
    },
    /// The next quality-flag pair of the flag group
    Flag(QualityFlagPair),
}

/// Declarative layout of one template variant
#[derive(Debug)]
pub struct TemplateDescriptor {
    pub kind: TemplateKind,
    pub unexpanded_descriptors: &'static [u32],
    /// Replication factors of the groups after the level group
    pub trailing_replications: &'static [usize],
    pub required_metadata: &'static [MetadataField],
    pub leading: &'static [FixedStep],
    pub level_steps: &'static [LevelStep],
    pub trailing: &'static [FixedStep],
}

impl TemplateDescriptor {
    pub fn for_kind(kind: TemplateKind) -> &'static TemplateDescriptor {
        match kind {
            TemplateKind::Subfloat => &SUBFLOAT,
            TemplateKind::Ship => &SHIP,
            TemplateKind::Glider => &GLIDER,
        }
    }

    /// Quality-flag pairs written per level
    pub fn flags_per_level(&self) -> usize {
        self.level_steps
            .iter()
            .filter(|step| matches!(step, LevelStep::Flag(_)))
            .count()
    }

    pub fn replication_factors(&self, level_count: usize) -> Vec<usize> {
        std::iter::once(level_count)
            .chain(self.trailing_replications.iter().copied())
            .collect()
    }
}

const fn plain(name: &'static str, value: FixedValue) -> FixedStep {
    FixedStep {
        slot: Slot::Plain(name),
        value,
    }
}

const fn nth(n: usize, name: &'static str, value: FixedValue) -> FixedStep {
    FixedStep {
        slot: Slot::Nth(n, name),
        value,
    }
}

const fn after_levels(offset: usize, name: &'static str, value: FixedValue) -> FixedStep {
    FixedStep {
        slot: Slot::AfterLevels(offset, name),
        value,
    }
}

const fn field(base: usize, name: &'static str, value: LevelValue) -> LevelStep {
    LevelStep::Field { base, name, value }
}

const fn flag(pair: QualityFlagPair) -> LevelStep {
    LevelStep::Flag(pair)
}

use FixedValue::{Direction, Int, Last, Metadata, MetadataText, Missing};
use MetadataField::{CruiseId, DeckUnitSerial, InstrumentSerial, Manufacturer, ProfileName, VesselId};

const INSTRUMENT_TYPE: &str = "instrumentTypeForWaterTemperatureOrSalinityProfileMeasurement";
const INSTRUMENT_SERIAL: &str = "instrumentSerialNumberForWaterTemperatureProfile";
const MEASUREMENT_METHOD: &str = "methodOfWaterTemperatureAndOrOrSalinityMeasurement";
const SALINITY_METHOD: &str = "methodOfSalinityOrDepthMeasurement";
const CURRENT_METHOD: &str = "methodOfSeaOrWaterCurrentMeasurement";
const PLATFORM_MOTION_REMOVAL: &str = "methodOfRemovingVelocityAndMotionOfPlatformFromCurrent";
const CURRENT_DURATION: &str = "durationAndTimeOfCurrentMeasurement";

/// Instrument type 995: attached to marine mammal; 902: unspecified towed sensor
const INSTRUMENT_MARINE_MAMMAL: i64 = 995;
const INSTRUMENT_TOWED: i64 = 902;

static SUBFLOAT: TemplateDescriptor = TemplateDescriptor {
    kind: TemplateKind::Subfloat,
    unexpanded_descriptors: &[315003],
    trailing_replications: &[],
    required_metadata: &[InstrumentSerial, DeckUnitSerial],
    leading: &[
        plain("marineObservingPlatformIdentifier", Metadata(InstrumentSerial)),
        plain("observingPlatformManufacturerModel", Metadata(Manufacturer)),
        plain("observingPlatformManufacturerSerialNumber", Metadata(DeckUnitSerial)),
        plain("buoyType", Int(2)), // subsurface float, moving
        plain("dataCollectionLocationSystem", Int(2)), // GPS
        plain("dataBuoyType", Int(8)), // unspecified subsurface float
        plain("directionOfProfile", Direction),
        plain(INSTRUMENT_TYPE, Int(INSTRUMENT_MARINE_MAMMAL)),
    ],
    level_steps: &[
        field(1, "year", LevelValue::Year),
        field(1, "month", LevelValue::Month),
        field(1, "day", LevelValue::Day),
        field(1, "hour", LevelValue::Hour),
        field(1, "minute", LevelValue::Minute),
        field(1, "latitude", LevelValue::Latitude),
        field(1, "longitude", LevelValue::Longitude),
        field(1, "waterPressure", LevelValue::Pressure),
        flag(QualityFlagPair::PRESSURE),
        field(1, "oceanographicWaterTemperature", LevelValue::Temperature),
        flag(QualityFlagPair::TEMPERATURE),
        field(1, "salinity", LevelValue::Missing),
        flag(QualityFlagPair::NOT_MEASURED),
    ],
    trailing: &[],
};

// Surface record takes the first occurrences of temperature, salinity and
// depth, so level fields start further in. Current and dissolved oxygen
// profiles follow the level block with one empty replication each.
static SHIP: TemplateDescriptor = TemplateDescriptor {
    kind: TemplateKind::Ship,
    unexpanded_descriptors: &[315007],
    trailing_replications: &[1, 1],
    required_metadata: &[VesselId, InstrumentSerial, CruiseId, ProfileName],
    leading: &[
        plain("shipOrMobileLandStationIdentifier", Metadata(VesselId)),
        plain("marineObservingPlatformIdentifier", Metadata(InstrumentSerial)),
        plain("identifierOfTheCruiseOrMission", Metadata(CruiseId)),
        plain("uniqueIdentifierForProfile", Metadata(ProfileName)),
        plain("year", Last(LevelValue::Year)),
        plain("month", Last(LevelValue::Month)),
        plain("day", Last(LevelValue::Day)),
        plain("hour", Last(LevelValue::Hour)),
        plain("minute", Last(LevelValue::Minute)),
        plain("latitude", Last(LevelValue::Latitude)),
        plain("longitude", Last(LevelValue::Longitude)),
        plain("totalWaterDepth", FixedValue::MaxDepth),
        nth(1, INSTRUMENT_TYPE, Int(INSTRUMENT_TOWED)),
        nth(1, INSTRUMENT_SERIAL, MetadataText(InstrumentSerial)),
        // Surface temperature
        nth(1, MEASUREMENT_METHOD, Int(15)),
        nth(1, "oceanographicWaterTemperature", FixedValue::First(LevelValue::Temperature)),
        nth(1, "depthBelowWaterSurface", FixedValue::SurfaceDepthCentimetres),
        // Surface salinity
        nth(1, SALINITY_METHOD, Missing),
        nth(2, "depthBelowWaterSurface", Missing),
        nth(1, "salinity", Missing),
        // Surface current
        nth(1, CURRENT_METHOD, Missing),
        nth(1, PLATFORM_MOTION_REMOVAL, Missing),
        nth(1, CURRENT_DURATION, Missing),
        nth(1, "seaSurfaceCurrentDirection", Missing),
        nth(1, "speedOfSeaSurfaceCurrent", Missing),
        // Temperature profile header
        nth(2, INSTRUMENT_TYPE, Missing),
        nth(2, INSTRUMENT_SERIAL, Missing),
        nth(2, MEASUREMENT_METHOD, Int(14)),
        nth(3, INSTRUMENT_TYPE, Int(INSTRUMENT_TOWED)),
        nth(1, "waterTemperatureProfileRecorderTypes", Int(99)),
        nth(3, INSTRUMENT_SERIAL, MetadataText(InstrumentSerial)),
        nth(2, SALINITY_METHOD, Int(1)),
        nth(1, "indicatorForDigitization", Int(0)),
        nth(1, "directionOfProfile", Direction),
        nth(1, "methodOfDepthCalculation", Int(1)),
    ],
    level_steps: &[
        field(3, "depthBelowWaterSurface", LevelValue::Depth),
        flag(QualityFlagPair::DEPTH),
        field(1, "waterPressure", LevelValue::Pressure),
        flag(QualityFlagPair::PRESSURE),
        field(2, "oceanographicWaterTemperature", LevelValue::Temperature),
        flag(QualityFlagPair::TEMPERATURE),
        field(2, "salinity", LevelValue::Missing),
        flag(QualityFlagPair::NOT_MEASURED),
    ],
    trailing: &[
        // Current profile
        nth(2, "indicatorForDigitization", Missing),
        nth(2, CURRENT_METHOD, Missing),
        nth(2, PLATFORM_MOTION_REMOVAL, Missing),
        nth(2, CURRENT_DURATION, Missing),
        nth(2, "directionOfProfile", Missing),
        nth(2, "methodOfDepthCalculation", Missing),
        after_levels(3, "depthBelowWaterSurface", Missing),
        after_levels(1, "waterPressure", Missing),
        nth(1, "speedOfCurrent", Missing),
        nth(1, "currentDirection", Missing),
        // Dissolved oxygen profile
        nth(3, "indicatorForDigitization", Missing),
        nth(3, "methodOfDepthCalculation", Missing),
        after_levels(4, "depthBelowWaterSurface", Missing),
        after_levels(2, "waterPressure", Missing),
        nth(1, "instrumentTypeOrSensorForDissolvedOxygenMeasurement", Missing),
        nth(1, "oceanographicDissolvedOxygen", Missing),
    ],
};

// The two header time/position groups take the first occurrences, so
// per-level time and position start at the third.
static GLIDER: TemplateDescriptor = TemplateDescriptor {
    kind: TemplateKind::Glider,
    unexpanded_descriptors: &[
        201129, 1087, 201000, 1019, 1036, 2148, 1085, 1086, 8021, 301011, 301013, 301021, 11104,
        2169, 11002, 11001, 2169, 22032, 22005, 301011, 301013, 8021, 4025, 301021, 22031, 22004,
        8021, 5068, 1079, 123000, 31001, 22056, 120000, 31002, 301011, 301013, 301021, 8080,
        33050, 7062, 8080, 33050, 22065, 8080, 33050, 22045, 8080, 33050, 22066, 8080, 33050,
        22064, 8080, 33050,
    ],
    trailing_replications: &[],
    required_metadata: &[DeckUnitSerial, ProfileName],
    leading: &[
        plain("observingPlatformManufacturerModel", Metadata(Manufacturer)),
        plain("observingPlatformManufacturerSerialNumber", Metadata(DeckUnitSerial)),
        nth(1, "timeSignificance", Int(25)), // nominal reporting time
        nth(1, "year", Last(LevelValue::Year)),
        nth(1, "month", Last(LevelValue::Month)),
        nth(1, "day", Last(LevelValue::Day)),
        nth(1, "hour", Last(LevelValue::Hour)),
        nth(1, "minute", Last(LevelValue::Minute)),
        nth(1, "latitude", Last(LevelValue::Latitude)),
        nth(1, "longitude", Last(LevelValue::Longitude)),
        nth(2, "year", Last(LevelValue::Year)),
        nth(2, "month", Last(LevelValue::Month)),
        nth(2, "day", Last(LevelValue::Day)),
        nth(2, "hour", Last(LevelValue::Hour)),
        nth(2, "minute", Last(LevelValue::Minute)),
        nth(2, "timeSignificance", Int(2)), // time averaged
        nth(1, "timePeriod", Int(50)),
        nth(2, "latitude", Last(LevelValue::Latitude)),
        nth(2, "longitude", Last(LevelValue::Longitude)),
        nth(1, "uniqueIdentifierForProfile", Metadata(ProfileName)),
        nth(1, "directionOfProfile", Direction),
    ],
    level_steps: &[
        field(3, "year", LevelValue::Year),
        field(3, "month", LevelValue::Month),
        field(3, "day", LevelValue::Day),
        field(3, "hour", LevelValue::Hour),
        field(3, "minute", LevelValue::Minute),
        field(3, "longitude", LevelValue::Longitude),
        field(3, "latitude", LevelValue::Latitude),
        flag(QualityFlagPair::POSITION),
        field(1, "depthBelowWaterSurface", LevelValue::Depth),
        flag(QualityFlagPair::DEPTH),
        field(1, "waterPressure", LevelValue::Pressure),
        flag(QualityFlagPair::PRESSURE),
        field(1, "oceanographicWaterTemperature", LevelValue::Temperature),
        flag(QualityFlagPair::TEMPERATURE),
        field(1, "oceanographicWaterConductivity", LevelValue::Missing),
        flag(QualityFlagPair::NOT_MEASURED),
        field(1, "salinity", LevelValue::Missing),
        flag(QualityFlagPair::NOT_MEASURED),
    ],
    trailing: &[],
};
