use std::path::PathBuf;

/// Run-wide settings, built once from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub skip: SkipSets,
    pub image_extension: String,
    pub video: VideoSettings,
    pub tools: ToolPaths,
    /// Treat an already present destination as done instead of failed.
    pub skip_existing: bool,
    pub dry_run: bool,
}

impl Config {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            skip: SkipSets::default(),
            image_extension: "heic".to_string(),
            video: VideoSettings::default(),
            tools: ToolPaths::default(),
            skip_existing: false,
            dry_run: false,
        }
    }
}

/// MIME types and codec ids that are copied instead of converted.
#[derive(Debug, Clone)]
pub struct SkipSets {
    pub image_mimes: Vec<String>,
    pub video_codecs: Vec<String>,
}

impl Default for SkipSets {
    fn default() -> Self {
        Self {
            image_mimes: vec!["image/heic".to_string()],
            video_codecs: vec!["hvc1".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct VideoSettings {
    /// Source containers kept as-is so their metadata survives.
    pub containers: Vec<String>,
    pub fallback_container: String,
    pub codec: String,
    pub preset: String,
    pub crf: u8,
    pub tag: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            containers: vec!["mov".to_string(), "mp4".to_string()],
            fallback_container: "mov".to_string(),
            codec: "libx265".to_string(),
            preset: "veryslow".to_string(),
            crf: 23,
            tag: "hvc1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub exiftool: PathBuf,
    pub ffmpeg: PathBuf,
    pub magick: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            exiftool: PathBuf::from("exiftool"),
            ffmpeg: PathBuf::from("ffmpeg"),
            magick: PathBuf::from("magick"),
        }
    }
}

impl ToolPaths {
    /// Resolves bare program names through `PATH`. Names that cannot be found
    /// are kept unchanged so the failure surfaces when the tool is first used.
    pub fn resolve(self) -> Self {
        Self {
            exiftool: resolve_program(self.exiftool),
            ffmpeg: resolve_program(self.ffmpeg),
            magick: resolve_program(self.magick),
        }
    }
}

fn resolve_program(program: PathBuf) -> PathBuf {
    match which::which(&program) {
        Ok(found) => {
            tracing::debug!("using {} for {}", found.display(), program.display());
            found
        }
        Err(e) => {
            tracing::warn!("{} not found ({}), files needing it will fail", program.display(), e);
            program
        }
    }
}
