use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::args::{Cli, Commands, EncodeOptions};
use crate::config::Settings;
use crate::models::PlatformMetadata;
use crate::processors::{
    check_publication, extract_cast, inflection_points, BatchProcessor, CastDirection,
    FileOutcome, ProfileSelector,
};
use crate::readers::{AttributesReader, ProfileReader};
use crate::utils::filename::{find_profile_files, profile_name_from_filename};
use crate::utils::progress::ProgressReporter;

/// Initialise the tracing subscriber; `RUST_LOG` takes precedence
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gts_encoder={}", level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();
}

fn load_settings(config: Option<&Path>, options: &EncodeOptions) -> Result<Settings> {
    let mut settings = Settings::load(config).context("Failed to load settings")?;
    options.apply(&mut settings);
    settings
        .qc_policy()
        .context("Invalid quality-control options")?;
    Ok(settings)
}

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Encode { input, options } => {
            let settings = load_settings(config, &options)?;
            info!(
                "Encoding {} with the {} template",
                input.display(),
                settings.template
            );

            let processor = BatchProcessor::from_settings(&settings)?;
            std::fs::create_dir_all(processor.output_dir()).with_context(|| {
                format!(
                    "Cannot create output directory {}",
                    processor.output_dir().display()
                )
            })?;

            let source = input.clone();
            let outcome = tokio::task::spawn_blocking(move || processor.process_file(&source))
                .await?
                .with_context(|| format!("Failed to encode {}", input.display()))?;

            match outcome {
                FileOutcome::Encoded { artifact, levels } => {
                    println!("Encoded {} levels -> {}", levels, artifact.display());
                }
                FileOutcome::Skipped(reason) => {
                    println!("Not encoded: {}", reason);
                }
            }
        }

        Commands::Batch {
            input_dir,
            serial,
            options,
        } => {
            let settings = load_settings(config, &options)?;

            let files = find_profile_files(&input_dir, serial)?;
            if files.is_empty() {
                bail!("No profile files found in {}", input_dir.display());
            }

            info!(
                "Encoding {} files from {} with the {} template on {} workers",
                files.len(),
                input_dir.display(),
                settings.template,
                settings.max_workers
            );

            let processor = BatchProcessor::from_settings(&settings)?;
            let progress =
                ProgressReporter::new(files.len() as u64, "Encoding profiles...", false);

            let report = tokio::task::spawn_blocking(move || {
                processor.process_files(&files, Some(&progress))
            })
            .await??;

            println!("\n{}", report.generate_summary());

            if !report.failed.is_empty() {
                warn!("{} files could not be encoded", report.failed.len());
            }
        }

        Commands::Inspect { input, options } => {
            let settings = load_settings(config, &options)?;
            inspect(&input, &settings)?;
        }
    }

    Ok(())
}

fn inspect(input: &Path, settings: &Settings) -> Result<()> {
    let profile = ProfileReader::new()
        .read_profile(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let policy = settings.qc_policy()?;

    println!("Profile: {}", input.display());
    println!("Levels: {}", profile.len());
    if let Some(first) = profile.first_timestamp() {
        println!("First measurement: {}", first);
    }

    let depths = profile.depths();
    println!("Inflection points: {:?}", inflection_points(&depths));

    let qualifying: Vec<f64> = profile
        .levels()
        .iter()
        .filter(|level| policy.accepts(level.quality_flag))
        .map(|level| level.depth)
        .collect();
    println!("Levels passing {}: {}", policy, qualifying.len());

    for direction in [CastDirection::Downcast, CastDirection::Upcast] {
        match extract_cast(&qualifying, direction) {
            Ok(range) => println!("{}: levels {}..{}", direction, range.start, range.end),
            Err(e) => println!("{}: {}", direction, e),
        }
    }

    match ProfileSelector::new(policy)
        .with_upcast_only(settings.upcast)
        .select(&profile)
    {
        Ok(selected) => println!(
            "Selected {} levels, max depth {:.2} m",
            selected.len(),
            selected.max_depth().unwrap_or_default()
        ),
        Err(e) => println!("Selection failed: {}", e),
    }

    match AttributesReader::new().read_for_profile(input) {
        Ok(attributes) => {
            match check_publication(&attributes, &profile) {
                Ok(publication) => println!("Publication: {}", publication),
                Err(e) => println!("Publication: {}", e),
            }

            let metadata = PlatformMetadata::from_attributes(
                &attributes,
                &settings.manufacturer,
                profile_name_from_filename(input),
            );
            match metadata.require(settings.template.descriptor().required_metadata) {
                Ok(()) => println!("Metadata complete for the {} template", settings.template),
                Err(e) => println!("{} template: {}", settings.template, e),
            }
        }
        Err(e) => println!("Attributes unavailable: {}", e),
    }

    Ok(())
}
