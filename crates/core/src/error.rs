#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Unrecognised prediction output: {0}")]
    UnrecognisedOutput(String),
}
