use thiserror::Error;

pub type Result<T, E = ChangeViewError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ChangeViewError {
    #[error("unknown change status code `{0}`")]
    UnknownStatus(char),

    #[error("invalid view settings: {0}")]
    Settings(#[from] serde_json::Error),

    /// A renderer addressed a row that is not currently visible.
    #[error("row {index} is out of range ({len} visible rows)")]
    RowOutOfRange { index: usize, len: usize },
}
