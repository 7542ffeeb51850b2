use anyhow::{Context, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use media_migrate::config::{Config, SkipSets, ToolPaths, VideoSettings};
use media_migrate::encoder::ExternalEncoder;
use media_migrate::exiftool::ExifTool;
use media_migrate::pipeline::Pipeline;
use media_migrate::report::RunReport;
use media_migrate::scan;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "media-migrate")]
#[command(about = "Re-encode a photo and video library into a space-efficient copy")]
struct Cli {
    /// Library to migrate
    input: PathBuf,
    /// Directory receiving the migrated library
    output: PathBuf,
    /// Image MIME type to copy instead of convert (repeatable)
    #[arg(long = "skip-image-mime", value_name = "MIME", default_values_t = ["image/heic".to_string()])]
    skip_image_mimes: Vec<String>,
    /// Video codec id to copy instead of convert (repeatable)
    #[arg(long = "skip-video-codec", value_name = "CODEC", default_values_t = ["hvc1".to_string()])]
    skip_video_codecs: Vec<String>,
    /// x265 preset used for videos
    #[arg(long, default_value = "veryslow")]
    preset: String,
    /// x265 constant rate factor used for videos
    #[arg(long, default_value_t = 23)]
    crf: u8,
    #[arg(long, default_value = "exiftool")]
    exiftool: PathBuf,
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
    #[arg(long, default_value = "magick")]
    magick: PathBuf,
    /// Count files whose output already exists as done instead of failed
    #[arg(long)]
    skip_existing: bool,
    /// Show what would be written without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Only show a progress bar, warnings and the summary
    #[arg(long, short, conflicts_with = "verbose")]
    quiet: bool,
    /// Log every external command
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            skip: SkipSets {
                image_mimes: self.skip_image_mimes.clone(),
                video_codecs: self.skip_video_codecs.clone(),
            },
            video: VideoSettings {
                preset: self.preset.clone(),
                crf: self.crf,
                ..VideoSettings::default()
            },
            tools: ToolPaths {
                exiftool: self.exiftool.clone(),
                ffmpeg: self.ffmpeg.clone(),
                magick: self.magick.clone(),
            },
            skip_existing: self.skip_existing,
            dry_run: self.dry_run,
            ..Config::new(&self.input, &self.output)
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) {
    let default = if verbose {
        "media_migrate=debug,exiftool=debug"
    } else if quiet {
        "media_migrate=warn"
    } else {
        "media_migrate=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(report) => {
            print!("{report}");
            if report.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunReport> {
    let config = cli.config();
    if !config.input_root.is_dir() {
        bail!("input {} is not a directory", config.input_root.display());
    }

    let files = scan::discover_files(&config.input_root).context("failed to discover input files")?;
    tracing::info!("found {} files", files.len());

    let tools = config.tools.clone().resolve();
    let mut exiftool = ExifTool::spawn(&tools.exiftool).context("failed to start the metadata tool")?;
    let mut encoder = ExternalEncoder::new(tools.magick, tools.ffmpeg, config.video.clone());

    let progress = if cli.quiet {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()), // safe: static template string
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let report = Pipeline::new(&config, &mut exiftool, &mut encoder).run(files, &progress);

    tracing::debug!("stopping {}", exiftool.program().display());
    drop(exiftool);
    Ok(report)
}
