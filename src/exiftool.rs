//! Metadata access through one long-lived `exiftool -stay_open` process.
//!
//! The process handling lives in the `exiftool` crate. This module decides
//! which tags are asked for, turns the JSON answer into a [`MetadataRecord`]
//! and checks that date writes were accepted.

use crate::error::MetadataError;
use crate::metadata::{self, MetadataRecord, MetadataTool};
use jiff::Zoned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

const READ_TAGS: &[&str] = &[
    "-api",
    "largefilesupport=1",
    "-MIMEType",
    "-CompressorID",
    "-CreationDate",
    "-DateTimeOriginal",
    "-MediaCreateDate",
    "-CreateDate",
    "-FileModifyDate",
];

pub struct ExifTool {
    program: PathBuf,
    process: ::exiftool::ExifTool,
}

impl ExifTool {
    /// Starts the tool. It stays alive until the handle is dropped.
    pub fn spawn(program: &Path) -> Result<Self, MetadataError> {
        let process =
            ::exiftool::ExifTool::with_executable(program).map_err(|source| MetadataError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;
        tracing::debug!("started {}", program.display());
        Ok(Self {
            program: program.to_path_buf(),
            process,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl MetadataTool for ExifTool {
    fn read(&mut self, path: &Path) -> Result<MetadataRecord, MetadataError> {
        let answer = self.process.json(path, READ_TAGS)?;
        parse_read_output(path, answer)
    }

    fn write_all_dates(&mut self, path: &Path, date: &Zoned) -> Result<(), MetadataError> {
        let file = path
            .to_str()
            .ok_or_else(|| MetadataError::UnsupportedPath(path.to_path_buf()))?;
        let assignment = format!("-AllDates={}", metadata::format_exif_datetime(date));
        let lines = self.process.execute_lines(&[assignment.as_str(), file])?;
        for line in &lines {
            tracing::debug!(target: "exiftool", "{line}");
        }
        check_write_output(&lines.join("\n"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExifToolRecord {
    #[serde(rename = "MIMEType", default, deserialize_with = "lenient_string")]
    mime_type: Option<String>,
    #[serde(rename = "CompressorID", default, deserialize_with = "lenient_string")]
    compressor_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    creation_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    date_time_original: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    media_create_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    create_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    file_modify_date: Option<String>,
}

/// exiftool prints numeric-looking values (a bare year, a numeric fourcc)
/// without quotes. Those are kept as their text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// Turns the JSON answer for one file into a record. The answer may be the
/// file's object or the single-element array exiftool prints.
fn parse_read_output(path: &Path, answer: Value) -> Result<MetadataRecord, MetadataError> {
    let object = match answer {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(_) => Some(answer),
        _ => None,
    }
    .ok_or_else(|| MetadataError::NoRecord(path.to_path_buf()))?;
    let record: ExifToolRecord = serde_json::from_value(object)?;

    let file_modify_date = match record
        .file_modify_date
        .as_deref()
        .and_then(metadata::parse_exif_datetime)
    {
        Some(date) => date,
        None => metadata::filesystem_mtime(path)?,
    };

    Ok(MetadataRecord {
        mime_type: record.mime_type,
        compressor_id: record.compressor_id,
        creation_date: record.creation_date,
        date_time_original: record.date_time_original,
        media_create_date: record.media_create_date,
        create_date: record.create_date,
        file_modify_date,
    })
}

fn check_write_output(output: &str) -> Result<(), MetadataError> {
    let updated = output.lines().any(|line| {
        let line = line.trim();
        line.ends_with("files updated") && !line.starts_with('0')
    });
    if updated {
        Ok(())
    } else {
        Err(MetadataError::WriteRejected(output.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_json_answer() {
        let answer = json!([{
            "SourceFile": "/in/clip.mov",
            "MIMEType": "video/quicktime",
            "CompressorID": "avc1",
            "CreationDate": "2020:01:02 03:04:05+01:00",
            "MediaCreateDate": "2020:01:02 02:04:05",
            "FileModifyDate": "2024:05:06 07:08:09+02:00"
        }]);
        let record = parse_read_output(Path::new("/in/clip.mov"), answer).unwrap();
        assert_eq!(record.mime_type.as_deref(), Some("video/quicktime"));
        assert_eq!(record.compressor_id.as_deref(), Some("avc1"));
        assert_eq!(record.creation_date.as_deref(), Some("2020:01:02 03:04:05+01:00"));
        assert!(record.date_time_original.is_none());
        assert_eq!(record.media_create_date.as_deref(), Some("2020:01:02 02:04:05"));
        assert_eq!(
            record.file_modify_date.timestamp(),
            metadata::parse_exif_datetime("2024:05:06 07:08:09+02:00").unwrap().timestamp()
        );
    }

    #[test]
    fn accepts_a_bare_object() {
        let answer = json!({
            "MIMEType": "image/jpeg",
            "FileModifyDate": "2024:05:06 07:08:09+02:00"
        });
        let record = parse_read_output(Path::new("/in/a.jpg"), answer).unwrap();
        assert_eq!(record.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn unquoted_numbers_are_kept_as_text() {
        let answer = json!([{
            "MIMEType": "video/mp4",
            "CompressorID": 1234,
            "CreateDate": 2019,
            "FileModifyDate": "2024:05:06 07:08:09+02:00"
        }]);
        let record = parse_read_output(Path::new("/in/a.mp4"), answer).unwrap();
        assert_eq!(record.compressor_id.as_deref(), Some("1234"));
        assert_eq!(record.create_date.as_deref(), Some("2019"));
    }

    #[test]
    fn empty_answer_is_no_record() {
        let err = parse_read_output(Path::new("/in/gone.jpg"), json!([])).unwrap_err();
        assert!(matches!(err, MetadataError::NoRecord(p) if p == Path::new("/in/gone.jpg")));
    }

    #[test]
    fn malformed_answer_is_a_json_error() {
        let err = parse_read_output(Path::new("/in/a.jpg"), json!(["not an object"])).unwrap_err();
        assert!(matches!(err, MetadataError::Json(_)));
    }

    #[test]
    fn missing_modify_date_falls_back_to_filesystem() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"x").unwrap();
        let record = parse_read_output(&path, json!([{"MIMEType": "image/jpeg"}])).unwrap();
        assert_eq!(record.file_modify_date, metadata::filesystem_mtime(&path).unwrap());
    }

    #[test]
    fn write_answer_must_report_an_update() {
        assert!(check_write_output("    1 image files updated\n").is_ok());
        assert!(check_write_output("    0 image files updated\n    1 files weren't updated due to errors\n").is_err());
        assert!(check_write_output("").is_err());
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let err = ExifTool::spawn(Path::new("/nonexistent/exiftool")).err().unwrap();
        assert!(matches!(err, MetadataError::Spawn { .. }));
    }
}
