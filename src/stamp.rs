//! Restores capture dates on freshly written files.

use crate::error::DateStampError;
use crate::metadata::{self, DateField, MetadataRecord, MetadataTool};
use filetime::FileTime;
use jiff::{Timestamp, Zoned};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The date chosen for a file and the field it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureDate {
    pub field: DateField,
    pub when: Zoned,
}

/// First defined field of CreationDate, DateTimeOriginal, MediaCreateDate,
/// CreateDate, FileModifyDate. When that value is not a usable date the
/// file-modify date is taken instead.
pub fn select_capture_date(record: &MetadataRecord) -> CaptureDate {
    let chain = [
        (DateField::CreationDate, &record.creation_date),
        (DateField::DateTimeOriginal, &record.date_time_original),
        (DateField::MediaCreateDate, &record.media_create_date),
        (DateField::CreateDate, &record.create_date),
    ];
    let selected = chain.into_iter().find_map(|(field, value)| {
        value
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| (field, raw))
    });

    if let Some((field, raw)) = selected {
        match metadata::parse_exif_datetime(raw) {
            Some(when) => return CaptureDate { field, when },
            None => tracing::debug!("unusable {} {:?}, using file modify date", field.as_str(), raw),
        }
    }
    CaptureDate {
        field: DateField::FileModifyDate,
        when: record.file_modify_date.clone(),
    }
}

/// Where the metadata writer leaves its copy of the unmodified file.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push("_original");
    PathBuf::from(name)
}

/// Before 1970 jiff reports a negative sub-second part; `FileTime` wants
/// whole seconds rounded down plus a positive remainder.
fn file_time(timestamp: Timestamp) -> FileTime {
    let nanos = timestamp.as_nanosecond();
    let seconds = nanos.div_euclid(1_000_000_000) as i64;
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    FileTime::from_unix_time(seconds, subsec)
}

/// Writes the capture date into `destination`'s metadata and file times, then
/// removes the writer's backup.
pub fn stamp_dates<M: MetadataTool + ?Sized>(
    tool: &mut M,
    destination: &Path,
    record: &MetadataRecord,
) -> Result<CaptureDate, DateStampError> {
    let date = select_capture_date(record);
    tracing::info!("   writing date {} ({})", date.when, date.field.as_str());

    tool.write_all_dates(destination, &date.when)?;

    let time = file_time(date.when.timestamp());
    filetime::set_file_times(destination, time, time).map_err(DateStampError::FileTimes)?;

    let backup = backup_path(destination);
    std::fs::remove_file(&backup).map_err(|source| DateStampError::Backup { path: backup, source })?;

    Ok(date)
}
