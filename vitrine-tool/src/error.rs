use thiserror::Error;
use vitrine_core::{BackendError, SubmitError};

use crate::store::AnyStoreError;

#[derive(Debug, Error)]
pub enum VtError {
    #[error("Store error: {0}")]
    Store(#[from] AnyStoreError),

    #[error("Could not load catalog: {0}")]
    Load(#[from] BackendError),

    #[error("Could not add product: {0}")]
    Submit(#[from] SubmitError),

    #[error("No product at index {0}")]
    NotFound(usize),

    #[error("Product {index} has no thumbnail {thumbnail}")]
    NoThumbnail { index: usize, thumbnail: usize },
}
