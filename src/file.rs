use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::decoded::DecodedObject;
use crate::error::{Error, Result};

/// A bencoded file on disk, typically a `.torrent`.
pub struct TorrentFile {
    path: PathBuf,
}

impl TorrentFile {
    pub fn new(path: impl Into<PathBuf>) -> TorrentFile {
        TorrentFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes the file, verifies that it re-encodes to the same
    /// bytes and derives its BTIH.
    ///
    /// A file that is not canonical bencode fails the self-check and is
    /// rejected, since its info hash could not be trusted.
    pub fn parse(&self) -> Result<DecodedObject> {
        let contents = fs::read(&self.path).map_err(|source| Error::File {
            path: self.path.clone(),
            source,
        })?;
        let mut object = DecodedObject::from_bytes(self.path.to_string_lossy(), contents)?;
        object.make_self_check()?;
        object.calculate_btih()?;
        info!(
            path = %self.path.display(),
            len = object.source().len(),
            btih = ?object.btih().map(|b| b.text.as_str()),
            "parsed bencoded file"
        );
        Ok(object)
    }
}
