pub mod categories;
pub mod opentdb;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::params::{CategoryId, Difficulty};
use crate::session::question::RawQuestionRecord;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Errors emitted while fetching from the question provider.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("question provider answered with response code {0}")]
    Provider(u8),
    #[error("question provider returned a malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("question provider request failed with status {0}")]
    HttpStatus(u16),
    #[cfg(feature = "network")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("network support is not compiled into this build")]
    Offline,
}

/// Where question batches come from. Implementations are called from worker
/// threads, so they must be shareable.
pub trait QuestionSource: Send + Sync {
    fn fetch_batch(
        &self,
        category: CategoryId,
        difficulty: Option<Difficulty>,
        amount: usize,
    ) -> Result<Vec<RawQuestionRecord>, SourceError>;

    fn fetch_categories(&self) -> Result<Vec<Category>, SourceError>;
}
