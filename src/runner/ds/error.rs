use thiserror::Error;

/// Errors raised by the binding core.
#[derive(Debug, Error)]
pub enum KosError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),
    #[error("volume `{volume}` is full: {requested} bytes requested, {free} free")]
    VolumeFull {
        volume: String,
        requested: usize,
        free: usize,
    },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("missing value `{key}` in node `{node}`")]
    MissingValue { node: String, key: String },
    #[error("invalid value `{value}` for `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("processor unit {0} has no booted cpu")]
    NotBooted(i64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type KosResult<T> = Result<T, KosError>;
