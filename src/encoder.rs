use crate::config::VideoSettings;
use crate::error::EncodeError;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces re-encoded files. Neither method may replace an existing destination.
pub trait Encoder {
    fn encode_image(&mut self, source: &Path, destination: &Path) -> Result<(), EncodeError>;
    fn encode_video(&mut self, source: &Path, destination: &Path) -> Result<(), EncodeError>;
}

/// Runs ImageMagick for images and ffmpeg for videos.
#[derive(Debug, Clone)]
pub struct ExternalEncoder {
    magick: PathBuf,
    ffmpeg: PathBuf,
    video: VideoSettings,
}

impl ExternalEncoder {
    pub fn new(magick: PathBuf, ffmpeg: PathBuf, video: VideoSettings) -> Self {
        Self { magick, ffmpeg, video }
    }
}

impl Encoder for ExternalEncoder {
    fn encode_image(&mut self, source: &Path, destination: &Path) -> Result<(), EncodeError> {
        reserve(destination)?;
        run(&self.magick, &image_args(source, destination))
    }

    fn encode_video(&mut self, source: &Path, destination: &Path) -> Result<(), EncodeError> {
        reserve(destination)?;
        run(&self.ffmpeg, &video_args(source, destination, &self.video))
    }
}

/// Claims `destination` with an exclusive create. The encoders then only ever
/// replace the empty file made here.
fn reserve(destination: &Path) -> Result<(), EncodeError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map(drop)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => EncodeError::DestinationExists(destination.to_path_buf()),
            _ => EncodeError::Io(e),
        })
}

pub fn image_args(source: &Path, destination: &Path) -> Vec<OsString> {
    vec![source.into(), destination.into()]
}

pub fn video_args(source: &Path, destination: &Path, settings: &VideoSettings) -> Vec<OsString> {
    let x265_params = format!("preset={}:crf={}", settings.preset, settings.crf);
    let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(source.into());
    args.extend(
        [
            "-c:v",
            settings.codec.as_str(),
            "-x265-params",
            x265_params.as_str(),
            "-tag:v",
            settings.tag.as_str(),
            "-movflags",
            "+faststart",
            "-y",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(destination.into());
    args
}

fn run(program: &Path, args: &[OsString]) -> Result<(), EncodeError> {
    tracing::debug!(
        "running {} {}",
        program.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| EncodeError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(EncodeError::Failed {
            program: program.to_path_buf(),
            status: output.status,
            stderr: stderr_tail(&output.stderr),
        })
    }
}

/// Last few lines of an encoder's stderr, enough to say what went wrong.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    lines[start..].join(" | ")
}
