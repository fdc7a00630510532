use thiserror::Error;

use crate::model::AttemptError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Attempt(#[from] AttemptError),
}
