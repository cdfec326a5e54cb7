use thiserror::Error;

use crate::model::{ParseIdError, ReviewError, SubjectError};
use crate::state::StateError;

/// Any error the core crate can produce.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
