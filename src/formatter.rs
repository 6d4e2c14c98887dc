use serde::Serialize;

use crate::mapping::CategorySet;
use crate::metadata::{MetadataRules, Recyclability};
use crate::postprocess::argmax_and_max;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub category: String,
    pub probability: f32,
}

/// The outcome of classifying one image. Lives for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub category: String,
    pub confidence: f32,
    /// Every category with its probability, in category-set order.
    pub predictions: Vec<Prediction>,
    pub material: String,
    pub recyclability: Recyclability,
}

impl ClassificationResult {
    pub fn probability(&self, category: &str) -> Option<f32> {
        self.predictions
            .iter()
            .find(|prediction| prediction.category == category)
            .map(|prediction| prediction.probability)
    }
}

/// Selects the top category and attaches its derived metadata.
///
/// `distribution` must be non-empty and aligned with `categories`.
pub fn format(
    distribution: &[f32],
    categories: &CategorySet,
    rules: &MetadataRules,
) -> ClassificationResult {
    debug_assert!(!distribution.is_empty());
    debug_assert_eq!(distribution.len(), categories.len());

    let predictions: Vec<Prediction> = categories
        .iter()
        .zip(distribution)
        .map(|(category, &probability)| Prediction {
            category: category.to_string(),
            probability,
        })
        .collect();

    let (top, confidence) = argmax_and_max(distribution);
    let category = predictions[top].category.clone();

    ClassificationResult {
        material: rules.material(&category).to_string(),
        recyclability: rules.recyclability(&category),
        category,
        confidence,
        predictions,
    }
}
