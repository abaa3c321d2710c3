use larder_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required field missing (tried: {candidates})")]
    MissingField { candidates: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no valid products found in {rows} rows (headers: {headers})")]
    NoValidRows { rows: usize, headers: String },
}
