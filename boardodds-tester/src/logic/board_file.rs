use std::fs;
use std::path::{Path, PathBuf};

use boardodds_game::{BoardConfig, BoardSource, OddsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoardFileError {
    #[error("failed to read board file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid board file {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: OddsError,
    },
}

/// Board description read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileBoard {
    path: PathBuf,
}

impl FileBoard {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl BoardSource for FileBoard {
    type Error = BoardFileError;

    fn load_board(&self) -> Result<BoardConfig, Self::Error> {
        let json = fs::read_to_string(&self.path).map_err(|source| BoardFileError::Io {
            path: self.path.clone(),
            source,
        })?;
        log::debug!("loaded board file {} ({} bytes)", self.path.display(), json.len());
        BoardConfig::from_json(&json).map_err(|source| BoardFileError::Invalid {
            path: self.path.clone(),
            source,
        })
    }
}
