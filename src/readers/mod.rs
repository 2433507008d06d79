pub mod attributes_reader;
pub mod profile_reader;

pub use attributes_reader::AttributesReader;
pub use profile_reader::{parse_timestamp, ProfileReader};
