//! BUFR template variants and the encoder that fills them.
//!
//! Each variant is described declaratively by a [`TemplateDescriptor`]; a
//! single [`TemplateEncoder`] walks the descriptor for any profile length.

pub mod descriptor;
pub mod encoder;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

pub use descriptor::{
    FixedStep, FixedValue, LevelStep, LevelValue, QualityFlagPair, Slot,
    TemplateDescriptor,
};
pub use encoder::{EncoderSettings, TemplateEncoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Sub-surface float profile, TM 315003
    Subfloat,
    /// Ship-borne temperature profile, TM 315007
    Ship,
    /// Glider profile with per-level time and position
    Glider,
}

impl TemplateKind {
    pub fn all() -> [TemplateKind; 3] {
        [TemplateKind::Subfloat, TemplateKind::Ship, TemplateKind::Glider]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Subfloat => "subfloat",
            TemplateKind::Ship => "ship",
            TemplateKind::Glider => "glider",
        }
    }

    pub fn descriptor(&self) -> &'static TemplateDescriptor {
        TemplateDescriptor::for_kind(*self)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = ProcessingError;

    /// Accepts the short names and the legacy `GTS_encode_<variant>` names
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let name = lowered
            .strip_prefix("gts_encode_")
            .unwrap_or(lowered.as_str());

        match name {
            "subfloat" => Ok(TemplateKind::Subfloat),
            "ship" => Ok(TemplateKind::Ship),
            "glider" => Ok(TemplateKind::Glider),
            _ => Err(ProcessingError::Config(format!(
                "Unknown template '{}'. Expected one of: subfloat, ship, glider",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_kind_from_str() {
        assert_eq!("ship".parse::<TemplateKind>().unwrap(), TemplateKind::Ship);
        assert_eq!(
            "GTS_encode_subfloat".parse::<TemplateKind>().unwrap(),
            TemplateKind::Subfloat
        );
        assert_eq!(" Glider ".parse::<TemplateKind>().unwrap(), TemplateKind::Glider);
        assert!("argo".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_template_kind_round_trips_through_display() {
        for kind in TemplateKind::all() {
            assert_eq!(kind.to_string().parse::<TemplateKind>().unwrap(), kind);
            assert_eq!(kind.descriptor().kind, kind);
        }
    }
}
