use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Settings;
use crate::processors::QcPolicyConfig;
use crate::templates::TemplateKind;
use crate::writers::EmitterKind;

#[derive(Parser)]
#[command(name = "gts-encoder")]
#[command(about = "Encode ocean temperature profiles as BUFR messages for the GTS")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Settings file (TOML, JSON or YAML); GTS_ENCODE_* variables override it"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a single profile file
    Encode {
        #[arg(short, long, help = "Profile CSV; attributes are read from <stem>.json")]
        input: PathBuf,

        #[command(flatten)]
        options: EncodeOptions,
    },

    /// Encode every profile in a directory
    Batch {
        #[arg(short, long, help = "Directory containing profile CSV files")]
        input_dir: PathBuf,

        #[arg(short, long, help = "Only files of this sensor serial number")]
        serial: Option<u32>,

        #[command(flatten)]
        options: EncodeOptions,
    },

    /// Show how a profile would be selected, without encoding it
    Inspect {
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        options: EncodeOptions,
    },
}

/// Overrides applied on top of the loaded settings
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeOptions {
    #[arg(short, long, value_enum, help = "Template variant")]
    pub template: Option<TemplateKind>,

    #[arg(short, long, help = "Output directory [default: output]")]
    pub output_dir: Option<PathBuf>,

    #[arg(short, long, value_enum, help = "Output format")]
    pub format: Option<EmitterKind>,

    #[arg(long, help = "Accept levels with this QC flag")]
    pub qc_flag: Option<u8>,

    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with = "qc_flag",
        help = "Accept levels with either of two QC flags, e.g. 1,2"
    )]
    pub qc_flags: Option<Vec<u8>>,

    #[arg(long, help = "Encode the whole profile instead of the upcast")]
    pub full_profile: bool,

    #[arg(long, help = "Originating centre (code table C-11)")]
    pub centre_code: Option<u16>,

    #[arg(long, help = "Encode datasets regardless of publication status")]
    pub skip_publication_check: bool,

    #[arg(long)]
    pub max_workers: Option<usize>,
}

impl EncodeOptions {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(template) = self.template {
            settings.template = template;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            settings.emitter = format;
        }
        if let Some(flag) = self.qc_flag {
            settings.qc = QcPolicyConfig::single(flag);
        }
        if let Some(flags) = &self.qc_flags {
            settings.qc = QcPolicyConfig {
                flag: None,
                flags: Some(flags.clone()),
            };
        }
        if self.full_profile {
            settings.upcast = false;
        }
        if let Some(centre) = self.centre_code {
            settings.centre_code = centre;
        }
        if self.skip_publication_check {
            settings.check_publication = false;
        }
        if let Some(workers) = self.max_workers {
            settings.max_workers = workers;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_batch_arguments() {
        let cli = Cli::try_parse_from([
            "gts-encoder",
            "batch",
            "--input-dir",
            "data",
            "--serial",
            "58",
            "--template",
            "glider",
            "--qc-flags",
            "1,2",
            "--full-profile",
        ])
        .unwrap();

        let Commands::Batch {
            input_dir,
            serial,
            options,
        } = cli.command
        else {
            panic!("expected batch command");
        };
        assert_eq!(input_dir, PathBuf::from("data"));
        assert_eq!(serial, Some(58));

        let mut settings = Settings::default();
        options.apply(&mut settings);
        assert_eq!(settings.template, TemplateKind::Glider);
        assert_eq!(settings.qc.flags, Some(vec![1, 2]));
        assert!(!settings.upcast);
    }

    #[test]
    fn test_conflicting_qc_options() {
        let result = Cli::try_parse_from([
            "gts-encoder",
            "encode",
            "--input",
            "a.csv",
            "--qc-flag",
            "1",
            "--qc-flags",
            "1,2",
        ]);
        assert!(result.is_err());
    }
}
