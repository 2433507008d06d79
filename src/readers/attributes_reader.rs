use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::models::DatasetAttributes;
use crate::utils::filename::attributes_path;

/// Reads the global attributes sidecar of a profile
#[derive(Debug, Default)]
pub struct AttributesReader;

impl AttributesReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_attributes(&self, path: &Path) -> Result<DatasetAttributes> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Attributes stored next to `profile_path` as `<stem>.json`
    pub fn read_for_profile(&self, profile_path: &Path) -> Result<DatasetAttributes> {
        self.read_attributes(&attributes_path(profile_path))
    }
}
