use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{ProcessingError, Result};
use crate::models::{PlatformMetadata, Profile, TemplateMessage};
use crate::processors::profile_selector::ProfileSelector;
use crate::processors::publication::{check_publication, Publication};
use crate::readers::{AttributesReader, ProfileReader};
use crate::templates::{TemplateEncoder, TemplateKind};
use crate::utils::filename::{bufr_output_path, profile_name_from_filename};
use crate::utils::progress::ProgressReporter;
use crate::writers::{FilterRulesEmitter, MessageEmitter};

/// What happened to one source file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Encoded { artifact: PathBuf, levels: usize },
    Skipped(Publication),
}

#[derive(Debug, Clone)]
pub struct EncodedFile {
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub levels: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub source: PathBuf,
    pub reason: Publication,
}

#[derive(Debug, Clone)]
pub struct FailedFile {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub encoded: Vec<EncodedFile>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.encoded.len() + self.skipped.len() + self.failed.len()
    }

    fn record(&mut self, source: PathBuf, outcome: Result<FileOutcome>) {
        match outcome {
            Ok(FileOutcome::Encoded { artifact, levels }) => self.encoded.push(EncodedFile {
                source,
                artifact,
                levels,
            }),
            Ok(FileOutcome::Skipped(reason)) => self.skipped.push(SkippedFile { source, reason }),
            Err(error) => self.failed.push(FailedFile {
                source,
                error: error.to_string(),
            }),
        }
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== GTS Encoding Report ===\n");
        summary.push_str(&format!("Files: {}\n", self.total()));
        summary.push_str(&format!("Encoded: {}\n", self.encoded.len()));
        summary.push_str(&format!("Skipped: {}\n", self.skipped.len()));
        summary.push_str(&format!("Failed: {}\n", self.failed.len()));

        if !self.skipped.is_empty() {
            summary.push_str("\nSkipped files:\n");
            for skipped in &self.skipped {
                summary.push_str(&format!(
                    "  {}: {}\n",
                    skipped.source.display(),
                    skipped.reason
                ));
            }
        }

        if !self.failed.is_empty() {
            summary.push_str("\nFailed files:\n");
            for failed in &self.failed {
                summary.push_str(&format!("  {}: {}\n", failed.source.display(), failed.error));
            }
        }

        summary
    }
}

/// Encodes profile files in parallel; one file's failure never stops the rest
pub struct BatchProcessor {
    max_workers: usize,
    template: TemplateKind,
    selector: ProfileSelector,
    encoder: TemplateEncoder,
    manufacturer: String,
    check_publication: bool,
    output_dir: PathBuf,
    emitter: Box<dyn MessageEmitter>,
}

impl BatchProcessor {
    pub fn new(max_workers: usize, template: TemplateKind, output_dir: &Path) -> Self {
        Self {
            max_workers,
            template,
            selector: ProfileSelector::default().with_upcast_only(true),
            encoder: TemplateEncoder::default(),
            manufacturer: crate::utils::constants::DEFAULT_MANUFACTURER.to_string(),
            check_publication: true,
            output_dir: output_dir.to_path_buf(),
            emitter: Box::new(FilterRulesEmitter::new()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let selector =
            ProfileSelector::new(settings.qc_policy()?).with_upcast_only(settings.upcast);

        Ok(Self::new(settings.max_workers, settings.template, &settings.output_dir)
            .with_selector(selector)
            .with_encoder(TemplateEncoder::new(settings.encoder_settings()))
            .with_manufacturer(&settings.manufacturer)
            .with_publication_check(settings.check_publication)
            .with_emitter(settings.emitter.build()))
    }

    pub fn with_selector(mut self, selector: ProfileSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_encoder(mut self, encoder: TemplateEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = manufacturer.to_string();
        self
    }

    pub fn with_publication_check(mut self, check_publication: bool) -> Self {
        self.check_publication = check_publication;
        self
    }

    pub fn with_emitter(mut self, emitter: Box<dyn MessageEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Selection and encoding of an in-memory profile
    pub fn encode_profile(
        &self,
        profile: &Profile,
        metadata: &PlatformMetadata,
    ) -> Result<TemplateMessage> {
        let selected = self.selector.select(profile)?;
        self.encoder.encode(self.template, &selected, metadata)
    }

    /// Read, check, encode and emit a single profile file
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome> {
        let attributes = AttributesReader::new().read_for_profile(path)?;
        let profile = ProfileReader::new().read_profile(path)?;

        if self.check_publication {
            let publication = check_publication(&attributes, &profile)?;
            if !publication.is_publishable() {
                info!("Skipping {}: {}", path.display(), publication);
                return Ok(FileOutcome::Skipped(publication));
            }
        }

        let metadata = PlatformMetadata::from_attributes(
            &attributes,
            &self.manufacturer,
            profile_name_from_filename(path),
        );

        let message = self.encode_profile(&profile, &metadata)?;
        let artifact = bufr_output_path(path, &self.output_dir);
        self.emitter.emit(&message, &artifact)?;

        debug!(
            "Encoded {} levels of {} as {}",
            message.level_count,
            path.display(),
            artifact.display()
        );

        Ok(FileOutcome::Encoded {
            artifact,
            levels: message.level_count,
        })
    }

    /// Process every file on a pool of `max_workers` threads
    pub fn process_files(
        &self,
        files: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchReport> {
        fs::create_dir_all(&self.output_dir)?;

        let processed_count = Arc::new(AtomicUsize::new(0));

        if let Some(p) = progress {
            p.set_message(&format!("Encoding {} files...", files.len()));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let outcomes: Vec<(PathBuf, Result<FileOutcome>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let outcome = self.process_file(path);
                    if let Err(e) = &outcome {
                        warn!("Failed to encode {}: {}", path.display(), e);
                    }

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    (path.clone(), outcome)
                })
                .collect()
        });

        let mut report = BatchReport::default();
        for (source, outcome) in outcomes {
            report.record(source, outcome);
        }

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Encoded {} of {} files",
                report.encoded.len(),
                report.total()
            ));
        }

        Ok(report)
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(
            num_cpus::get(),
            TemplateKind::Ship,
            Path::new(crate::utils::constants::DEFAULT_OUTPUT_DIR),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "\
DATETIME,LATITUDE,LONGITUDE,DEPTH,TEMPERATURE,QC_FLAG
2023-02-28T08:19:12Z,-41.2,174.8,10.0,15.2,1
2023-02-28T08:19:14Z,-41.2,174.8,20.0,14.1,1
2023-02-28T08:19:16Z,-41.2,174.8,30.0,13.0,1
2023-02-28T08:19:18Z,-41.2,174.8,20.0,14.0,1
2023-02-28T08:19:20Z,-41.2,174.8,10.0,15.1,1
";

    const PUBLIC: &str = r#"{
        "public": "True",
        "wigos_id": "0-554-0-1234567",
        "publication_date": "01/01/2023",
        "moana_serial_number": 58,
        "deck_unit_serial_number": "434"
    }"#;

    fn write_pair(dir: &Path, stem: &str, attributes: &str) -> PathBuf {
        let csv = dir.join(format!("{}.csv", stem));
        fs::write(&csv, CSV).unwrap();
        fs::write(dir.join(format!("{}.json", stem)), attributes).unwrap();
        csv
    }

    #[test]
    fn test_process_file_writes_rules() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let csv = write_pair(input.path(), "MOANA_0058_434_230228081912_qc", PUBLIC);

        let processor = BatchProcessor::new(1, TemplateKind::Subfloat, output.path());
        let outcome = processor.process_file(&csv).unwrap();

        let artifact = output.path().join("MOANA_0058_434_230228081912_qc.bufr");
        assert_eq!(
            outcome,
            FileOutcome::Encoded {
                artifact: artifact.clone(),
                levels: 3
            }
        );
        assert!(output
            .path()
            .join("MOANA_0058_434_230228081912_qc.bufr.filter")
            .exists());
    }

    #[test]
    fn test_private_dataset_is_skipped() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let csv = write_pair(
            input.path(),
            "MOANA_0058_434_230228081912_qc",
            r#"{"public": "False"}"#,
        );

        let processor = BatchProcessor::new(1, TemplateKind::Subfloat, output.path());
        assert_eq!(
            processor.process_file(&csv).unwrap(),
            FileOutcome::Skipped(Publication::NotPublic)
        );

        let unchecked = BatchProcessor::new(1, TemplateKind::Subfloat, output.path())
            .with_publication_check(false);
        assert!(matches!(
            unchecked.process_file(&csv),
            Err(ProcessingError::MissingMetadata(_))
        ));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let good = write_pair(input.path(), "MOANA_0058_434_230228081912_qc", PUBLIC);
        let skipped = write_pair(
            input.path(),
            "MOANA_0058_434_230301090000_qc",
            r#"{"public": "True", "wigos_id": "nan"}"#,
        );
        let broken = input.path().join("MOANA_0058_434_230302090000_qc.csv");
        fs::write(&broken, "not,a,profile\n").unwrap();

        let out_dir = output.path().join("bufr");
        let processor = BatchProcessor::new(2, TemplateKind::Subfloat, &out_dir);
        let report = processor
            .process_files(&[good.clone(), skipped, broken], None)
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.encoded.len(), 1);
        assert_eq!(report.encoded[0].source, good);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, Publication::MissingWigosId);
        assert_eq!(report.failed.len(), 1);
        assert!(out_dir.is_dir());

        let summary = report.generate_summary();
        assert!(summary.contains("Encoded: 1"));
        assert!(summary.contains("Failed: 1"));
    }
}
