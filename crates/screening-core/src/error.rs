use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreeningError {
    #[error("Empty mandate: no screening criteria provided")]
    EmptyMandate,

    #[error("Empty universe: no companies to screen")]
    EmptyUniverse,

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
