use std::path::PathBuf;

use thiserror::Error;

use crate::forms::FormKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read locomotion config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse locomotion config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid locomotion config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no shapeshift forms to spawn")]
    NoForms,
    #[error("form {0:?} listed more than once")]
    DuplicateForm(FormKind),
}
