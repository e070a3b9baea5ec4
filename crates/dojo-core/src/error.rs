//! Error types for `dojo-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("need at least 2 competitors to create matches, found {found}")]
  InsufficientRoster { found: usize },

  #[error("validation error: {0}")]
  Validation(String),

  #[error("match numbers exhausted: {} is the highest match number", u32::MAX)]
  MatchNumbersExhausted,
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
