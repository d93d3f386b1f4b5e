use std::path::PathBuf;
use thiserror::Error;

/// Why a single CMake file could not be parsed to the end.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed hpx_option({0}): expected name, type and docstring")]
    MalformedOption(String),

    #[error("maximum nesting depth ({0}) exceeded")]
    TooDeep(usize),
}

pub type Result<T> = std::result::Result<T, ParseError>;
