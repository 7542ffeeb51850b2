//! The three conversion strategies: image, video and verbatim copy.
//!
//! Each one builds its destination, refuses to touch an existing file,
//! produces the output, restores capture dates and, for re-encoded files,
//! flags outputs that did not get smaller.

use crate::classify::Disposition;
use crate::config::Config;
use crate::encoder::Encoder;
use crate::error::{EncodeError, FileError};
use crate::metadata::{MetadataRecord, MetadataTool};
use crate::output::OutputLayout;
use crate::stamp;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// What a strategy did with a file.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Written {
        destination: PathBuf,
        warning: Option<String>,
    },
    /// Destination was already there and the run skips such files.
    AlreadyPresent(PathBuf),
    /// Dry run: nothing was written.
    Planned(PathBuf),
}

/// Extension of the output file, `None` meaning "keep the source's".
pub fn target_extension(disposition: Disposition, source: &Path, config: &Config) -> Option<String> {
    match disposition {
        Disposition::ConvertImage => Some(config.image_extension.clone()),
        Disposition::ConvertVideo => {
            let ext = source
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if config.video.containers.iter().any(|c| *c == ext) {
                Some(ext)
            } else {
                Some(config.video.fallback_container.clone())
            }
        }
        Disposition::CopyOriginal => None,
    }
}

pub struct Converter<'a, E: ?Sized> {
    config: &'a Config,
    layout: OutputLayout,
    encoder: &'a mut E,
}

impl<'a, E: Encoder + ?Sized> Converter<'a, E> {
    pub fn new(config: &'a Config, encoder: &'a mut E) -> Self {
        Self {
            config,
            layout: OutputLayout::new(&config.input_root, &config.output_root),
            encoder,
        }
    }

    pub fn convert<M: MetadataTool + ?Sized>(
        &mut self,
        tool: &mut M,
        source: &Path,
        record: &MetadataRecord,
        disposition: Disposition,
    ) -> Result<Outcome, FileError> {
        let extension = target_extension(disposition, source, self.config);

        if self.config.dry_run {
            let destination = self.layout.destination(source, extension.as_deref())?;
            if destination.try_exists()? {
                tracing::warn!("   {} already exists", destination.display());
            }
            tracing::info!("   would {} to {}", disposition, destination.display());
            return Ok(Outcome::Planned(destination));
        }

        let destination = self.layout.prepare(source, extension.as_deref())?;
        if destination.try_exists()? {
            if self.config.skip_existing {
                tracing::info!("   {} already exists, skipping", destination.display());
                return Ok(Outcome::AlreadyPresent(destination));
            }
            return Err(FileError::Exists(destination));
        }

        match disposition {
            Disposition::ConvertImage => {
                tracing::info!("   converting image to {}", destination.display());
                produce(&destination, || self.encoder.encode_image(source, &destination))?;
            }
            Disposition::ConvertVideo => {
                tracing::info!("   converting video to {}", destination.display());
                produce(&destination, || self.encoder.encode_video(source, &destination))?;
            }
            Disposition::CopyOriginal => {
                tracing::info!("   copying original file to {}", destination.display());
                copy_exclusive(source, &destination)?;
            }
        }

        if let Err(e) = stamp::stamp_dates(tool, &destination, record) {
            tracing::warn!("   error while setting date on {}: {}", destination.display(), e);
        }

        let warning = match disposition {
            Disposition::CopyOriginal => None,
            Disposition::ConvertImage | Disposition::ConvertVideo => {
                size_regression(source, &destination)?
            }
        };
        if let Some(warning) = &warning {
            tracing::warn!("   {warning}");
        }

        Ok(Outcome::Written {
            destination,
            warning,
        })
    }
}

/// Compares output and source sizes. Returns a warning when the output is
/// not strictly smaller.
pub fn size_regression(source: &Path, destination: &Path) -> Result<Option<String>, FileError> {
    let source_len = std::fs::metadata(source)?.len();
    let destination_len = std::fs::metadata(destination)?.len();
    if destination_len >= source_len {
        Ok(Some(format!(
            "converted file \"{}\" is not smaller than the original ({} >= {} bytes), please check which one to keep",
            destination.display(),
            destination_len,
            source_len
        )))
    } else {
        Ok(None)
    }
}

/// Copies `source` byte for byte into a destination that must not exist yet.
fn copy_exclusive(source: &Path, destination: &Path) -> Result<u64, FileError> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => FileError::Exists(destination.to_path_buf()),
            _ => FileError::Io(e),
        })?;
    let partial = PartialOutput::new(destination);
    let copied = std::io::copy(&mut reader, &mut writer)?;
    writer.sync_all()?;
    partial.keep();
    Ok(copied)
}

/// Runs an encoder and removes whatever it left behind if it failed.
fn produce(destination: &Path, encode: impl FnOnce() -> Result<(), EncodeError>) -> Result<(), FileError> {
    let partial = PartialOutput::new(destination);
    match encode() {
        Ok(()) => {
            partial.keep();
            Ok(())
        }
        Err(EncodeError::DestinationExists(path)) => {
            partial.keep();
            Err(FileError::Exists(path))
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes a half-written destination on drop unless told to keep it.
struct PartialOutput<'a> {
    path: &'a Path,
    armed: bool,
}

impl<'a> PartialOutput<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, armed: true }
    }

    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialOutput<'_> {
    fn drop(&mut self) {
        if self.armed && self.path.exists() {
            if let Err(e) = std::fs::remove_file(self.path) {
                tracing::warn!("could not remove partial output {}: {}", self.path.display(), e);
            }
        }
    }
}
