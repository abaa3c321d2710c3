use larder_core::DataSource;

use crate::error::EnrichError;

/// Outcome of one external source call.
///
/// "Not found" is a normal answer and stays distinct from a failure so the
/// cascade can log the two differently. Neither ever aborts a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found { value: T, source: DataSource },
    NotFound,
    Failed(String),
}

impl<T> Lookup<T> {
    #[must_use]
    pub fn found(value: T, source: DataSource) -> Self {
        Lookup::Found { value, source }
    }

    /// Fold a fallible source call into a `Lookup`, mapping 404-style
    /// errors to [`Lookup::NotFound`].
    pub fn from_result(result: Result<Option<T>, EnrichError>, source: DataSource) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found { value, source },
            Ok(None) | Err(EnrichError::NotFound { .. }) => Lookup::NotFound,
            Err(e) => Lookup::Failed(e.to_string()),
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }

    #[must_use]
    pub fn into_found(self) -> Option<(T, DataSource)> {
        match self {
            Lookup::Found { value, source } => Some((value, source)),
            Lookup::NotFound | Lookup::Failed(_) => None,
        }
    }
}
