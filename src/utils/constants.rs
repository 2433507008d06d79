/// Unit conversion factors
pub const CELSIUS_TO_KELVIN: f64 = 273.15;
pub const DBAR_TO_PA: f64 = 10000.0;
pub const PRESSURE_DECIMALS: i32 = 2;

/// Inflection points closer together than this are sensor noise
pub const MIN_TURNING_SEPARATION: usize = 3;
pub const MIN_SEGMENT_SAMPLES: usize = 3;

/// Source dataset column names
pub const COLUMN_DATETIME: &str = "DATETIME";
pub const COLUMN_LATITUDE: &str = "LATITUDE";
pub const COLUMN_LONGITUDE: &str = "LONGITUDE";
pub const COLUMN_DEPTH: &str = "DEPTH";
pub const COLUMN_TEMPERATURE: &str = "TEMPERATURE";
pub const COLUMN_QC_FLAG: &str = "QC_FLAG";

/// File extensions
pub const BUFR_EXTENSION: &str = "bufr";
pub const PROFILE_EXTENSION: &str = "csv";
pub const ATTRIBUTES_EXTENSION: &str = "json";
pub const FILTER_RULES_EXTENSION: &str = "bufr.filter";
pub const JSON_MESSAGE_EXTENSION: &str = "bufr.json";

/// Source files are named MOANA_{serial:04}_...
pub const SOURCE_FILE_PREFIX: &str = "MOANA";

/// Section 1 header values
pub const BUFR_EDITION: i64 = 3;
pub const MASTER_TABLE_NUMBER: i64 = 0;
pub const DATA_CATEGORY_OCEANOGRAPHIC: i64 = 31;
pub const LOCAL_TABLES_VERSION: i64 = 0;

/// Processing defaults
pub const DEFAULT_CENTRE_CODE: u16 = 69; // Wellington (RSMC), code table C-11
pub const DEFAULT_SUB_CENTRE: u16 = 0;
pub const DEFAULT_MASTER_TABLES_VERSION: u8 = 28;
pub const DEFAULT_MANUFACTURER: &str = "Mangopare";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_QC_FLAG: u8 = 1;

/// Code table 0 08 080 qualifiers
pub const QUALIFIER_POSITION: i64 = 20;
pub const QUALIFIER_DEPTH: i64 = 13;
pub const QUALIFIER_PRESSURE: i64 = 10;
pub const QUALIFIER_TEMPERATURE: i64 = 11;
pub const QUALIFIER_MISSING: i64 = 63;

/// Code table 0 33 050 global GTSPP flags
pub const GLOBAL_GOOD: i64 = 9;
pub const GLOBAL_MISSING: i64 = 15;

/// Code table 0 22 056 direction of profile
pub const DIRECTION_UPWARD: i64 = 0;
pub const DIRECTION_MISSING: i64 = 3;
