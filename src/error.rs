use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid graph document")]
    Parse(#[from] serde_json::Error),

    #[error("invalid style config {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("invalid style value {field} = {value}: must be {requirement}")]
    InvalidStyle {
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("graph extent does not fit a finite canvas")]
    CoordinateOverflow,

    #[error("no nodes found")]
    EmptyGraph,

    #[error("relationship #{index} references unknown node {id:?}")]
    UnknownEndpoint { index: usize, id: String },

    #[error("palette exhausted: more than {capacity} distinct label combinations")]
    PaletteExhausted { capacity: usize },
}
