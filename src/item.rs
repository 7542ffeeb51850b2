use crate::classify::Disposition;
use crate::error::FileError;
use crate::metadata::MetadataRecord;
use std::path::PathBuf;

/// One discovered source file and what became of it.
#[derive(Debug)]
pub struct FileItem {
    pub path: PathBuf,
    pub metadata: Option<MetadataRecord>,
    pub disposition: Option<Disposition>,
    pub destination: Option<PathBuf>,
    pub status: ItemStatus,
}

#[derive(Debug)]
pub enum ItemStatus {
    Pending,
    Done,
    /// Destination already present and the run asked to skip such files.
    Skipped,
    Warned(String),
    Failed(FileError),
}

impl FileItem {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            metadata: None,
            disposition: None,
            destination: None,
            status: ItemStatus::Pending,
        }
    }

    pub fn fail(&mut self, error: FileError) {
        debug_assert!(!self.is_terminal(), "{} already settled", self.path.display());
        self.status = ItemStatus::Failed(error);
    }

    pub fn warn(&mut self, message: String) {
        debug_assert!(!self.is_terminal(), "{} already settled", self.path.display());
        self.status = ItemStatus::Warned(message);
    }

    pub fn succeed(&mut self) {
        if matches!(self.status, ItemStatus::Pending) {
            self.status = ItemStatus::Done;
        }
    }

    pub fn skip(&mut self) {
        debug_assert!(!self.is_terminal(), "{} already settled", self.path.display());
        self.status = ItemStatus::Skipped;
    }

    pub fn error(&self) -> Option<&FileError> {
        match &self.status {
            ItemStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Warned(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            ItemStatus::Done | ItemStatus::Skipped | ItemStatus::Warned(_)
        )
    }

    fn is_terminal(&self) -> bool {
        !matches!(self.status, ItemStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_is_pending() {
        let item = FileItem::new(PathBuf::from("a.jpg"));
        assert!(matches!(item.status, ItemStatus::Pending));
        assert!(!item.is_success());
        assert!(item.error().is_none());
        assert!(item.warning().is_none());
    }

    #[test]
    fn succeed_keeps_a_warning() {
        let mut item = FileItem::new(PathBuf::from("a.jpg"));
        item.warn("bigger".to_string());
        item.succeed();
        assert_eq!(item.warning(), Some("bigger"));
        assert!(item.is_success());
    }

    #[test]
    fn failed_item_is_not_a_success() {
        let mut item = FileItem::new(PathBuf::from("a.jpg"));
        item.fail(FileError::Exists(PathBuf::from("b.heic")));
        assert!(!item.is_success());
        assert!(item.error().is_some());
    }
}
