use crate::item::{FileItem, ItemStatus};
use std::fmt;

/// Outcome of a whole run. Only failed and warned items are kept.
#[derive(Debug, Default)]
pub struct RunReport {
    pub total: usize,
    pub done: usize,
    pub skipped: usize,
    pub failed: Vec<FileItem>,
    pub warned: Vec<FileItem>,
}

impl RunReport {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, item: FileItem) {
        match item.status {
            ItemStatus::Done => self.done += 1,
            ItemStatus::Skipped => self.skipped += 1,
            ItemStatus::Warned(_) => self.warned.push(item),
            ItemStatus::Failed(_) => self.failed.push(item),
            ItemStatus::Pending => {
                tracing::warn!("{} was never settled", item.path.display());
            }
        }
    }

    /// Files that ended in a successful state, warnings and skips included.
    pub fn processed(&self) -> usize {
        self.done + self.skipped + self.warned.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Done! Processed {} of {} files", self.processed(), self.total)?;
        if self.skipped > 0 {
            writeln!(f, "Skipped {} files whose output already exists", self.skipped)?;
        }
        if !self.failed.is_empty() {
            writeln!(f, "Errors:")?;
            for item in &self.failed {
                if let Some(error) = item.error() {
                    writeln!(f, "    {}: {}", item.path.display(), error)?;
                }
            }
        }
        if !self.warned.is_empty() {
            writeln!(f, "Warnings:")?;
            for item in &self.warned {
                if let Some(warning) = item.warning() {
                    writeln!(f, "    {}: {}", item.path.display(), warning)?;
                }
            }
        }
        Ok(())
    }
}
