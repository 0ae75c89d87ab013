use thiserror::Error;

/// Failures surfaced by the filtering and recommendation pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// Filtering left no rating events to work with.
    #[error("no rating events survived filtering")]
    EmptyResult,

    #[error("user {0} is not part of the rating matrix")]
    UnknownUser(u32),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
