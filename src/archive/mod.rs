//! Archiver: one deflate-compressed ZIP per run, assembled in memory

use std::collections::HashSet;
use std::io::{Cursor, Write};

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::fetch::FetchedAsset;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),

    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Sealed archive, offered for a single download
#[derive(Debug, Clone)]
pub struct ArchiveBundle {
    pub file_name: String,
    pub entries: Vec<String>,
    pub content: Bytes,
}

impl ArchiveBundle {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// In-progress archive. Appended to once per fetched asset, then sealed.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: Vec<String>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Compress `asset` into the archive; its buffer is dropped afterwards
    pub fn append(&mut self, asset: FetchedAsset) -> Result<()> {
        if !self.names.insert(asset.file_name.clone()) {
            return Err(ArchiveError::DuplicateEntry(asset.file_name));
        }

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(asset.content.len() as u64 >= u32::MAX as u64);

        self.writer.start_file(asset.file_name.as_str(), options)?;
        self.writer.write_all(&asset.content)?;

        debug!(entry = %asset.file_name, size = asset.content.len(), "Archived asset");
        self.entries.push(asset.file_name);
        Ok(())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Write the central directory and hand back the finished bytes
    pub fn seal(mut self, file_name: impl Into<String>) -> Result<ArchiveBundle> {
        let cursor = self.writer.finish()?;
        Ok(ArchiveBundle {
            file_name: file_name.into(),
            entries: self.entries,
            content: Bytes::from(cursor.into_inner()),
        })
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
