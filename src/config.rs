use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::processors::profile_selector::{QcPolicy, QcPolicyConfig};
use crate::templates::{EncoderSettings, TemplateKind};
use crate::utils::constants::{
    DEFAULT_CENTRE_CODE, DEFAULT_MANUFACTURER, DEFAULT_MASTER_TABLES_VERSION, DEFAULT_OUTPUT_DIR,
    DEFAULT_SUB_CENTRE,
};
use crate::writers::EmitterKind;

/// Prefix of environment overrides, e.g. `GTS_ENCODE_TEMPLATE=glider`
pub const ENV_PREFIX: &str = "GTS_ENCODE";

/// Runtime settings: defaults, then an optional file, then the environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    pub template: TemplateKind,

    #[validate(range(min = 1))]
    pub centre_code: u16,

    pub sub_centre: u16,

    #[validate(range(min = 1))]
    pub master_tables_version: u8,

    /// Encode only the final ascending segment
    pub upcast: bool,

    /// Unset means flag 1 only
    #[serde(default)]
    pub qc: QcPolicyConfig,

    #[validate(length(min = 1))]
    pub manufacturer: String,

    pub output_dir: PathBuf,

    pub emitter: EmitterKind,

    pub check_publication: bool,

    #[validate(range(min = 1, max = 512))]
    pub max_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template: TemplateKind::Ship,
            centre_code: DEFAULT_CENTRE_CODE,
            sub_centre: DEFAULT_SUB_CENTRE,
            master_tables_version: DEFAULT_MASTER_TABLES_VERSION,
            upcast: true,
            qc: QcPolicyConfig::default(),
            manufacturer: DEFAULT_MANUFACTURER.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            emitter: EmitterKind::Filter,
            check_publication: true,
            max_workers: num_cpus::get(),
        }
    }
}

impl Settings {
    /// Layer defaults, `file` (TOML, JSON or YAML by extension) and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Settings::default())?);

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        settings.qc_policy()?;

        Ok(settings)
    }

    pub fn qc_policy(&self) -> Result<QcPolicy> {
        if self.qc.flag.is_none() && self.qc.flags.is_none() {
            return Ok(QcPolicy::default());
        }
        QcPolicy::try_from(&self.qc)
    }

    pub fn encoder_settings(&self) -> EncoderSettings {
        EncoderSettings {
            centre_code: self.centre_code,
            sub_centre: self.sub_centre,
            master_tables_version: self.master_tables_version,
        }
    }
}
