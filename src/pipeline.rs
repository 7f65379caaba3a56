use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::redact::{self, RedactSummary};

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Container kind of an image file, from its extension.
///
/// The redactor itself sniffs content; this is only used to pick files out
/// of directories and to report what was processed.
///
/// # Example
///
/// ```rust
/// use exif_redact::pipeline::ImageKind;
/// use std::path::Path;
///
/// assert_eq!(ImageKind::from_path(Path::new("photo.JPG")), Some(ImageKind::Jpeg));
/// assert_eq!(ImageKind::from_path(Path::new("photo.heic")), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// Determine the image kind from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// The result of redacting a single image.
#[derive(Debug, Serialize)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub image_kind: Option<ImageKind>,
    /// Where the redacted image was (or, in a dry run, would be) written.
    pub output_path: Option<PathBuf>,
    /// Backup of the original, if one was made.
    pub backup_path: Option<PathBuf>,
    pub summary: Option<RedactSummary>,
    pub error: Option<String>,
    pub dry_run: bool,
}

/// An image found by [`collect_images`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedImage {
    /// Path to read the image from.
    pub path: PathBuf,
    /// Location below `output_dir`: the path relative to the directory it
    /// was found in, or just the file name for a path given directly.
    pub relative: PathBuf,
}

impl CollectedImage {
    /// An image given directly rather than found in a directory.
    pub fn from_file(path: &Path) -> Self {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self {
            path: path.to_path_buf(),
            relative,
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks) and each image keeps its path relative
/// to that directory. Only `.jpg`, `.jpeg` and `.png` files are included.
///
/// # Example
///
/// ```rust,no_run
/// use exif_redact::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<CollectedImage> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(CollectedImage::from_file(path));
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    let relative = p.strip_prefix(path).unwrap_or(p).to_path_buf();
                    images.push(CollectedImage {
                        path: p.to_path_buf(),
                        relative,
                    });
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Create a backup of the original file, unless one already exists.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Destination for the redacted copy of `image`.
///
/// In place unless `output_dir` is set, in which case the image's relative
/// path is recreated below it.
pub fn output_path_for(image: &CollectedImage, config: &Config) -> PathBuf {
    match config.output.output_dir.as_deref() {
        Some(dir) => Path::new(dir).join(&image.relative),
        None => image.path.clone(),
    }
}

fn new_result(image: &CollectedImage, config: &Config) -> ProcessResult {
    ProcessResult {
        path: image.path.clone(),
        image_kind: ImageKind::from_path(&image.path),
        output_path: None,
        backup_path: None,
        summary: None,
        error: None,
        dry_run: config.output.dry_run,
    }
}

/// Redact a single image according to `config`.
///
/// 1. **Read** the whole file
/// 2. **Redact** it in memory (nothing is written if this fails)
/// 3. **Write** it in place (after an optional `.bak` backup) or into
///    `output_dir`, unless this is a dry run
///
/// Errors are captured in [`ProcessResult::error`] so a batch can continue.
pub fn process_image(image: &CollectedImage, config: &Config) -> ProcessResult {
    let mut result = new_result(image, config);
    let output = output_path_for(image, config);
    if let Err(e) = redact_one(&image.path, output, config, &mut result) {
        result.error = Some(format!("{e:#}"));
    }
    result
}

/// Redact every image in `images`, in order.
///
/// An image whose destination was already claimed by an earlier image of
/// the same batch is reported as an error and not written.
pub fn process_images(images: &[CollectedImage], config: &Config) -> Vec<ProcessResult> {
    let mut claimed = HashSet::new();
    let total = images.len();

    images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            log::info!("[{}/{}] Processing: {}", i + 1, total, image.path.display());

            let output = output_path_for(image, config);
            if !claimed.insert(output.clone()) {
                let mut result = new_result(image, config);
                result.error = Some(format!(
                    "{} is already the destination of another image",
                    output.display()
                ));
                return result;
            }
            process_image(image, config)
        })
        .collect()
}

fn redact_one(
    path: &Path,
    output: PathBuf,
    config: &Config,
    result: &mut ProcessResult,
) -> Result<()> {
    let data = std::fs::read(path).context("Failed to read file")?;
    let (redacted, summary) = redact::redact_bytes(&data, &config.policy, &config.options)
        .context("Failed to redact metadata")?;

    result.output_path = Some(output.clone());
    let total = summary.total_redacted();
    result.summary = Some(summary);

    if config.output.dry_run {
        log::debug!("Dry run, not writing {}", output.display());
        return Ok(());
    }

    let in_place = output == path;
    if in_place && redacted == data {
        log::debug!("Nothing to redact in {}", path.display());
        return Ok(());
    }
    if in_place && config.output.backup_originals {
        match backup_file(path) {
            Ok(backup) => result.backup_path = Some(backup),
            Err(e) => log::warn!("Failed to backup {}: {e}", path.display()),
        }
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&output, redacted)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::debug!("Wrote {} ({total} entries redacted)", output.display());
    Ok(())
}
