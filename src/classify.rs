use crate::config::SkipSets;
use std::fmt;

/// How a file is migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    ConvertImage,
    ConvertVideo,
    CopyOriginal,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Disposition::ConvertImage => "convert image",
            Disposition::ConvertVideo => "convert video",
            Disposition::CopyOriginal => "copy original",
        })
    }
}

/// Picks the disposition for a MIME type and codec id. Total: anything that
/// is neither a convertible image nor a convertible video is copied.
pub fn classify(mime: &str, codec: Option<&str>, skip: &SkipSets) -> Disposition {
    if mime.starts_with("image") && !skip.image_mimes.iter().any(|m| m == mime) {
        Disposition::ConvertImage
    } else if mime.starts_with("video")
        && !codec.is_some_and(|c| skip.video_codecs.iter().any(|s| s == c))
    {
        Disposition::ConvertVideo
    } else {
        Disposition::CopyOriginal
    }
}
