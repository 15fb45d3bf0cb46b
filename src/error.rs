// error.rs — Errors from configuration loading and sequence playback.
//
// The detection core never returns these: malformed frames and kernels are
// contract violations and panic. Only the layers that touch the filesystem
// or parse user input are fallible.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("image sequence {} is empty", .0.display())]
    EmptySequence(PathBuf),

    #[error("{}:{line}: expected `<seconds> <relative path>`", path.display())]
    MalformedIndex { path: PathBuf, line: usize },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
