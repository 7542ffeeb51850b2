use crate::classify::{self, Disposition};
use crate::config::Config;
use crate::convert::{Converter, Outcome};
use crate::encoder::Encoder;
use crate::error::FileError;
use crate::item::FileItem;
use crate::metadata::MetadataTool;
use crate::report::RunReport;
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Carries files one at a time from metadata read to a final state.
pub struct Pipeline<'a, M: ?Sized, E: ?Sized> {
    config: &'a Config,
    tool: &'a mut M,
    converter: Converter<'a, E>,
}

impl<'a, M, E> Pipeline<'a, M, E>
where
    M: MetadataTool + ?Sized,
    E: Encoder + ?Sized,
{
    pub fn new(config: &'a Config, tool: &'a mut M, encoder: &'a mut E) -> Self {
        Self {
            config,
            tool,
            converter: Converter::new(config, encoder),
        }
    }

    /// Processes every path in order. A failing file never stops the run.
    pub fn run(&mut self, paths: Vec<PathBuf>, progress: &ProgressBar) -> RunReport {
        let total = paths.len();
        let mut report = RunReport::new(total);

        for (index, path) in paths.into_iter().enumerate() {
            let failed = match report.failed.len() {
                0 => String::new(),
                n => format!(" ({n} failed)"),
            };
            tracing::info!("file {} of {}{}: {}", index + 1, total, failed, path.display());

            let item = self.process(path);
            progress.inc(1);
            report.record(item);
        }

        progress.finish_and_clear();
        report
    }

    pub fn process(&mut self, path: PathBuf) -> FileItem {
        let mut item = FileItem::new(path);

        let record = match self.tool.read(&item.path) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("   error while getting media info: {e}");
                item.fail(FileError::MetadataRead(e));
                return item;
            }
        };

        if record.mime_type.is_none() {
            tracing::error!("   no MIME type reported, leaving file alone");
            item.metadata = Some(record);
            item.fail(FileError::MissingMimeType);
            return item;
        }
        let mime = record.mime_type.as_deref().unwrap_or_default();
        let codec = record.compressor_id.as_deref();
        let disposition = classify::classify(mime, codec, &self.config.skip);
        match disposition {
            Disposition::ConvertImage => tracing::info!("   image: {mime}"),
            Disposition::ConvertVideo => tracing::info!("   video: {}", codec.unwrap_or("unknown codec")),
            Disposition::CopyOriginal => tracing::debug!("   keeping original: {mime} {}", codec.unwrap_or_default()),
        }
        item.disposition = Some(disposition);

        let outcome = self.converter.convert(&mut *self.tool, &item.path, &record, disposition);
        item.metadata = Some(record);

        match outcome {
            Ok(Outcome::Written { destination, warning }) => {
                item.destination = Some(destination);
                if let Some(warning) = warning {
                    item.warn(warning);
                }
                item.succeed();
            }
            Ok(Outcome::AlreadyPresent(destination)) => {
                item.destination = Some(destination);
                item.skip();
            }
            Ok(Outcome::Planned(destination)) => {
                item.destination = Some(destination);
                item.succeed();
            }
            Err(e) => {
                tracing::error!("   failed to process file: {e}");
                item.fail(e);
            }
        }
        item
    }
}
