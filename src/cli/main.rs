use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exif_redact::{RedactionPolicy, TagCategory, config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-redact",
    version,
    about = "Selectively remove EXIF metadata (camera, GPS, copyright, date/time, user, technical) from JPEG and PNG images"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Report what would be redacted without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write redacted copies into this directory instead of overwriting
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Remove camera make/model and version tags
    #[arg(long)]
    camera: bool,

    /// Remove the GPS pointer
    #[arg(long)]
    gps: bool,

    /// Remove the copyright notice
    #[arg(long)]
    copyright: bool,

    /// Remove date/time tags
    #[arg(long)]
    datetime: bool,

    /// Remove user comment, maker note and copyright
    #[arg(long)]
    user: bool,

    /// Remove exposure, aperture, ISO and other shooting details
    #[arg(long)]
    technical: bool,

    /// Remove every category
    #[arg(long)]
    all: bool,

    /// Recompute the CRC of redacted PNG eXIf chunks
    #[arg(long = "recompute-crc")]
    recompute_crc: bool,

    /// Also zero tag data stored outside the IFD entries
    #[arg(long)]
    scrub: bool,

    /// Also redact PNG eXIf chunks that start directly with a TIFF header
    #[arg(long = "bare-tiff")]
    bare_tiff: bool,
}

impl Cli {
    /// Categories selected on the command line, if any flag was given.
    fn policy_override(&self) -> Option<RedactionPolicy> {
        if self.all {
            return Some(RedactionPolicy::all());
        }
        let selected: Vec<TagCategory> = [
            (self.camera, TagCategory::CameraInfo),
            (self.gps, TagCategory::GpsInfo),
            (self.copyright, TagCategory::Copyright),
            (self.datetime, TagCategory::DateTime),
            (self.user, TagCategory::UserInfo),
            (self.technical, TagCategory::TechnicalDetail),
        ]
        .into_iter()
        .filter_map(|(flag, category)| flag.then_some(category))
        .collect();

        (!selected.is_empty()).then(|| RedactionPolicy::from_categories(&selected))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::initial();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config, then apply CLI overrides
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(policy) = cli.policy_override() {
        config.policy = policy;
    }
    if cli.dry_run {
        config.output.dry_run = true;
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.output_dir = Some(dir.to_string_lossy().into_owned());
    }
    config.options.recompute_png_crc |= cli.recompute_crc;
    config.options.scrub_out_of_line |= cli.scrub;
    config.options.bare_tiff_chunks |= cli.bare_tiff;

    if config.policy.is_empty() {
        log::warn!("No metadata categories selected; images will be left unchanged");
    }

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }
    log::info!(
        "Removing: {}",
        config
            .policy
            .enabled_categories()
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // Process each image
    let total = images.len();
    let results = pipeline::process_images(&images, &config);

    for result in &results {
        let path = result.path.display();
        if let Some(ref err) = result.error {
            log::error!("{path}: {err}");
        } else if let Some(ref summary) = result.summary {
            let hit = summary.categories_hit();
            if hit.is_empty() {
                log::info!("{path}: nothing to redact");
            } else {
                let action = if config.output.dry_run {
                    "Would redact"
                } else {
                    "Redacted"
                };
                log::info!(
                    "{path}: {action} {} entries: {}",
                    summary.total_redacted(),
                    hit.join(", ")
                );
            }
            if let Some(ref out) = result.output_path {
                if *out != result.path && !config.output.dry_run {
                    log::info!("{path}: written to {}", out.display());
                }
            }
        }
    }

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    if failed > 0 {
        anyhow::bail!("{failed} image(s) failed");
    }
    Ok(())
}
