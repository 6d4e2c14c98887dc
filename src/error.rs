//! Errors raised by the classification pipeline.
//!
//! Every variant is terminal for the request that produced it; the pipeline
//! never hands back a partial distribution.

use thiserror::Error;

use crate::classifier::BoxError;

#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The uploaded bytes are not a recognised image encoding.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The backing classifier could not be invoked.
    #[error("inference failed: {0}")]
    Inference(#[source] BoxError),

    /// The remapped distribution has no probability mass to normalise.
    #[error("remapped distribution sums to {sum}, cannot normalise")]
    DegenerateDistribution { sum: f32 },
}

impl ClassifyError {
    pub fn inference(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Inference(message.into())
    }
}
