//! File categories derived from extensions.

use std::fmt;

use serde::{Deserialize, Serialize};

const IMAGE: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "svg", "tif", "tiff", "ico"];

const DOC: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "xml", "json",
    "html", "htm", "md",
];

const VIDEO: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpeg", "mpg", "3gp", "f4v", "m2v",
    "m2ts", "mts", "ts", "vob",
];

const AUDIO: &[&str] = &[
    "mp3", "wav", "ogg", "m4a", "flac", "aac", "wma", "alac", "aiff", "dsd", "dsf", "dff", "ape",
    "mpc", "opus", "webm", "amr", "3gp", "midi", "kar", "wv", "mka", "spx", "tta", "ra", "dts",
    "ac3", "ec3", "mlp", "m2ts", "mts",
];

/// Coarse content category of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Raster and vector images.
    Image,
    /// Documents, spreadsheets, and text.
    Doc,
    /// Video containers.
    Video,
    /// Audio formats.
    Audio,
    /// Anything else, including files without an extension.
    Other,
}

impl Category {
    /// Categories in matching order. An extension listed under several
    /// categories (`webm`, `3gp`, `mts`) belongs to the first one.
    pub const ALL: [Category; 5] = [
        Self::Image,
        Self::Doc,
        Self::Video,
        Self::Audio,
        Self::Other,
    ];

    /// Lowercase extensions (without the dot) that map to this category.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE,
            Self::Doc => DOC,
            Self::Video => VIDEO,
            Self::Audio => AUDIO,
            Self::Other => &[],
        }
    }

    /// Categorize an extension, with or without its leading dot.
    pub fn of(extension: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            return Self::Other;
        }
        Self::ALL
            .into_iter()
            .find(|category| category.extensions().contains(&ext.as_str()))
            .unwrap_or(Self::Other)
    }

    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Doc => "doc",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bytes attributed to one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUsage {
    /// The category.
    pub category: Category,
    /// Sum of file sizes in the category.
    pub bytes: i64,
}
