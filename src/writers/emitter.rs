use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{Assignment, TemplateMessage};
use crate::utils::constants::{FILTER_RULES_EXTENSION, JSON_MESSAGE_EXTENSION};

/// Hands a finished message to the BUFR codec
///
/// `artifact` is the path of the `.bufr` message; an emitter may write that
/// file or a companion from which the codec produces it.
pub trait MessageEmitter: Send + Sync {
    /// Extension of the file written next to the artifact name
    fn extension(&self) -> &'static str;

    fn emit(&self, message: &TemplateMessage, artifact: &Path) -> Result<PathBuf>;

    fn output_path(&self, artifact: &Path) -> PathBuf {
        artifact.with_extension(self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmitterKind {
    /// ecCodes `bufr_filter` rules
    #[default]
    Filter,
    /// JSON dump of the assignment sequence
    Json,
}

impl EmitterKind {
    pub fn build(&self) -> Box<dyn MessageEmitter> {
        match self {
            EmitterKind::Filter => Box::new(FilterRulesEmitter::new()),
            EmitterKind::Json => Box::new(JsonEmitter::new()),
        }
    }
}

/// Writes ecCodes filter rules; `bufr_filter <rules> <sample>` packs the message
///
/// Rules are ordered so that the codec sees the replication factors and the
/// descriptor sequence before any indexed data key, then packs and writes.
#[derive(Debug, Default)]
pub struct FilterRulesEmitter;

impl FilterRulesEmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, message: &TemplateMessage, artifact: &Path) -> String {
        let mut rules = String::new();

        push_assignments(&mut rules, &message.header);
        rules.push_str(&format!(
            "set inputExtendedDelayedDescriptorReplicationFactor = {};\n",
            join(&message.replication_factors)
        ));
        rules.push_str(&format!(
            "set unexpandedDescriptors = {};\n",
            join(&message.unexpanded_descriptors)
        ));
        push_assignments(&mut rules, &message.data);
        rules.push_str("set pack = 1;\n");
        rules.push_str(&format!("write \"{}\";\n", artifact.display()));

        rules
    }
}

fn push_assignments(rules: &mut String, assignments: &[Assignment]) {
    for assignment in assignments {
        rules.push_str(&format!("set {} = {};\n", assignment.key, assignment.value));
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("{{{}}}", items.join(", "))
}

impl MessageEmitter for FilterRulesEmitter {
    fn extension(&self) -> &'static str {
        FILTER_RULES_EXTENSION
    }

    fn emit(&self, message: &TemplateMessage, artifact: &Path) -> Result<PathBuf> {
        let path = self.output_path(artifact);
        ensure_parent(&path)?;
        fs::write(&path, self.render(message, artifact))?;

        debug!(
            "Wrote {} filter rules to {}",
            message.assignment_count(),
            path.display()
        );
        Ok(path)
    }
}

/// Writes the message as pretty-printed JSON
#[derive(Debug, Default)]
pub struct JsonEmitter;

impl JsonEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl MessageEmitter for JsonEmitter {
    fn extension(&self) -> &'static str {
        JSON_MESSAGE_EXTENSION
    }

    fn emit(&self, message: &TemplateMessage, artifact: &Path) -> Result<PathBuf> {
        let path = self.output_path(artifact);
        ensure_parent(&path)?;

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, message)?;
        writer.flush()?;

        debug!("Wrote JSON message to {}", path.display());
        Ok(path)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(ProcessingError::from)
        }
        _ => Ok(()),
    }
}
