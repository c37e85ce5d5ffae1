use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::error::{FileSystemError, Result};

const ATTRIBUTION_SEPARATOR: &str = "=================";

/// Normalized lyrics as fetched from one source.
///
/// Each line is an `(original, translated)` pair kept in page order. The
/// translated half is only meaningful when `is_translated` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsRecord {
    artist: String,
    song: String,
    lines: Vec<(String, String)>,
    is_translated: bool,
    source_url: Option<String>,
}

impl LyricsRecord {
    pub fn new<I>(
        artist: impl Into<String>,
        song: impl Into<String>,
        lines: I,
        is_translated: bool,
        source_url: Option<String>,
    ) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            artist: artist.into(),
            song: song.into(),
            lines: lines.into_iter().collect(),
            is_translated,
            source_url,
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn song(&self) -> &str {
        &self.song
    }

    pub fn lines(&self) -> &[(String, String)] {
        &self.lines
    }

    pub fn is_translated(&self) -> bool {
        self.is_translated
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn export_as_text(&self) -> String {
        let mut result = String::new();
        for (original, translated) in &self.lines {
            if self.is_translated {
                result.push_str(&format!("[orig] {}\n[tr] {}\n\n", original, translated));
            } else {
                result.push_str(original);
                result.push('\n');
            }
        }
        if let Some(url) = &self.source_url {
            result.push_str(&format!("\n\n{}\n\nLyrics from: {}", ATTRIBUTION_SEPARATOR, url));
        }
        result
    }

    pub fn export_to_bytes(&self) -> Vec<u8> {
        self.export_as_text().into_bytes()
    }

    pub fn export_to_writer<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.export_as_text().as_bytes())?;
        writer.flush()
    }

    /// Write the text export to `path`, creating or truncating the file.
    ///
    /// The handle is dropped (and closed) on every return path, including a
    /// failed write.
    pub fn export_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let unwritable = |source| FileSystemError::Unwritable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(unwritable)?;
        let mut writer = BufWriter::new(file);
        self.export_to_writer(&mut writer).map_err(unwritable)?;

        debug!("Exported lyrics for {} - {} to {}", self.artist, self.song, path.display());
        Ok(())
    }
}

impl fmt::Display for LyricsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.export_as_text())
    }
}
