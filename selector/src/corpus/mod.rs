//! Agent profile corpus: directory loading and chunking.

mod splitter;

pub use splitter::{Chunk, RecursiveSplitter};

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("failed to walk corpus directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to read corpus file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid splitter settings: overlap {overlap} exceeds chunk size {chunk_size}")]
    InvalidSplitter { chunk_size: usize, overlap: usize },
}

/// One loaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub source: PathBuf,
}

/// Load every non-hidden file under `dir`, sorted by path.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, CorpusError> {
    if !dir.is_dir() {
        return Err(CorpusError::MissingDirectory(dir.to_path_buf()));
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| CorpusError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let text = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        documents.push(Document {
            text,
            source: path.to_path_buf(),
        });
    }

    tracing::info!(
        dir = %dir.display(),
        documents = documents.len(),
        "Loaded agent documents"
    );
    Ok(documents)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
