use crate::error::MetadataError;
use jiff::civil::{DateTime, Time};
use jiff::fmt::strtime;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};
use std::path::Path;

/// What the metadata tool reported about one file.
#[derive(Debug, Clone)]
pub struct MetadataRecord {
    pub mime_type: Option<String>,
    /// Video codec identifier, e.g. `avc1` or `hvc1`.
    pub compressor_id: Option<String>,
    pub creation_date: Option<String>,
    pub date_time_original: Option<String>,
    pub media_create_date: Option<String>,
    pub create_date: Option<String>,
    /// Always known: falls back to the filesystem when the tool has nothing usable.
    pub file_modify_date: Zoned,
}

/// The date fields consulted when restoring a capture date, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    CreationDate,
    DateTimeOriginal,
    MediaCreateDate,
    CreateDate,
    FileModifyDate,
}

impl DateField {
    pub fn as_str(self) -> &'static str {
        match self {
            DateField::CreationDate => "CreationDate",
            DateField::DateTimeOriginal => "DateTimeOriginal",
            DateField::MediaCreateDate => "MediaCreateDate",
            DateField::CreateDate => "CreateDate",
            DateField::FileModifyDate => "FileModifyDate",
        }
    }
}

/// Reads and writes embedded metadata. Implemented by [`crate::exiftool::ExifTool`].
pub trait MetadataTool {
    fn read(&mut self, path: &Path) -> Result<MetadataRecord, MetadataError>;

    /// Sets every date tag of `path` to `date`. The tool may leave a backup
    /// copy next to the file; see [`crate::stamp::backup_path`].
    fn write_all_dates(&mut self, path: &Path, date: &Zoned) -> Result<(), MetadataError>;
}

pub fn filesystem_mtime(path: &Path) -> std::io::Result<Zoned> {
    let modified = std::fs::metadata(path)?.modified()?;
    let timestamp = Timestamp::try_from(modified).map_err(std::io::Error::other)?;
    Ok(timestamp.to_zoned(TimeZone::system()))
}

const OFFSET_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f%:z",
    "%Y:%m:%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%:z",
];

const LOCAL_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y:%m:%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y:%m:%d", "%Y-%m-%d"];

/// Interprets a date string as written by exiftool. Values without an offset
/// are local time. Placeholders like `0000:00:00 00:00:00` yield `None`.
pub fn parse_exif_datetime(raw: &str) -> Option<Zoned> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = match trimmed.strip_suffix('Z') {
        Some(utc) => format!("{utc}+00:00"),
        None => trimmed.to_string(),
    };

    for fmt in OFFSET_FORMATS {
        if let Ok(parsed) = strtime::parse(fmt, &normalized) {
            if let (Some(offset), Ok(timestamp)) = (parsed.offset(), parsed.to_timestamp()) {
                return Some(timestamp.to_zoned(TimeZone::fixed(offset)));
            }
        }
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(parsed) = strtime::parse(fmt, &normalized) {
            if let Ok(dt) = parsed.to_datetime() {
                return local(dt);
            }
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = strtime::parse(fmt, &normalized) {
            if let Ok(date) = parsed.to_date() {
                return local(date.to_datetime(Time::midnight()));
            }
        }
    }
    None
}

fn local(dt: DateTime) -> Option<Zoned> {
    dt.to_zoned(TimeZone::system()).ok()
}

/// Formats a date the way exiftool expects it on write.
pub fn format_exif_datetime(date: &Zoned) -> String {
    date.strftime("%Y:%m:%d %H:%M:%S%:z").to_string()
}
