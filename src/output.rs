use crate::error::FileError;
use std::path::{Path, PathBuf};

/// Maps source files onto the output tree, keeping their relative position.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    input_root: PathBuf,
    output_root: PathBuf,
}

impl OutputLayout {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Destination for `source`, with its extension replaced when one is given.
    /// Does not touch the filesystem.
    pub fn destination(&self, source: &Path, extension: Option<&str>) -> Result<PathBuf, FileError> {
        let relative = source
            .strip_prefix(&self.input_root)
            .map_err(|_| FileError::OutsideInput(source.to_path_buf()))?;
        let mut destination = self.output_root.join(relative);
        if let Some(extension) = extension {
            destination.set_extension(extension);
        }
        Ok(destination)
    }

    /// Like [`OutputLayout::destination`], and creates the destination's
    /// directory. Existence of the destination itself is not checked.
    pub fn prepare(&self, source: &Path, extension: Option<&str>) -> Result<PathBuf, FileError> {
        let destination = self.destination(source, extension)?;
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mirrors_relative_directories() {
        let layout = OutputLayout::new("/in", "/out");
        let dest = layout.destination(Path::new("/in/a/b/c.jpg"), Some("heic")).unwrap();
        assert_eq!(dest, Path::new("/out/a/b/c.heic"));
    }

    #[test]
    fn keeps_extension_when_none_given() {
        let layout = OutputLayout::new("/in", "/out");
        let dest = layout.destination(Path::new("/in/x/IMG_1.HEIC"), None).unwrap();
        assert_eq!(dest, Path::new("/out/x/IMG_1.HEIC"));
    }

    #[test]
    fn only_the_last_extension_is_replaced() {
        let layout = OutputLayout::new("/in", "/out");
        let dest = layout.destination(Path::new("/in/clip.final.avi"), Some("mov")).unwrap();
        assert_eq!(dest, Path::new("/out/clip.final.mov"));
    }

    #[test]
    fn extensionless_source_gains_one() {
        let layout = OutputLayout::new("/in", "/out");
        let dest = layout.destination(Path::new("/in/scan"), Some("heic")).unwrap();
        assert_eq!(dest, Path::new("/out/scan.heic"));
    }

    #[test]
    fn source_outside_input_is_rejected() {
        let layout = OutputLayout::new("/in", "/out");
        let err = layout.destination(Path::new("/elsewhere/a.jpg"), None).unwrap_err();
        assert!(matches!(err, FileError::OutsideInput(_)));
    }

    #[test]
    fn prepare_creates_directories_repeatedly() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let layout = OutputLayout::new(input.path(), output.path());
        let source = input.path().join("2020/summer/a.jpg");

        let first = layout.prepare(&source, Some("heic")).unwrap();
        let second = layout.prepare(&source, Some("heic")).unwrap();
        assert_eq!(first, second);
        assert!(output.path().join("2020/summer").is_dir());
        assert!(!first.exists());
    }
}
