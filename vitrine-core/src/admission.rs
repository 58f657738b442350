use thiserror::Error;

use crate::config::DEFAULT_ADMISSION_CEILING;
use crate::estimate::estimate_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("images are too large to store: about {total} bytes, the limit is {ceiling} bytes")]
pub struct CapacityExceeded {
    pub total: u64,
    pub ceiling: u64,
}

/// Pre-flight size check over all images of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionCheck {
    ceiling: u64,
}

impl Default for AdmissionCheck {
    fn default() -> Self {
        Self::new(DEFAULT_ADMISSION_CEILING)
    }
}

impl AdmissionCheck {
    pub fn new(ceiling: u64) -> Self {
        Self { ceiling }
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Sums the estimated sizes of `images`, returning the total if it fits.
    pub fn check<'a>(&self, images: impl IntoIterator<Item = &'a str>) -> Result<u64, CapacityExceeded> {
        self.check_estimates(images.into_iter().map(estimate_size))
    }

    /// Same as [`check`](Self::check) for sizes that were already estimated.
    pub fn check_estimates(&self, estimates: impl IntoIterator<Item = u64>) -> Result<u64, CapacityExceeded> {
        let total = estimates.into_iter().sum();
        if total > self.ceiling {
            return Err(CapacityExceeded {
                total,
                ceiling: self.ceiling,
            });
        }
        Ok(total)
    }
}
