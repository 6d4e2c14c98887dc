//! JSON bodies returned by each endpoint.
//!
//! The endpoints grew different shapes and clients depend on each of them:
//! TrashNet reports a flat `recyclability` string, TACO and WasteNet nest a
//! `metadata` object with a boolean, and the mock routes list the runner-up
//! categories instead of a probability map.

use serde::{Serialize, Serializer};

use crate::formatter::{ClassificationResult, Prediction};
use crate::helpers::timestamp;
use crate::mapping::Variant;
use crate::metadata::Recyclability;

fn serialize_predictions<S: Serializer>(
    predictions: &[Prediction],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        predictions
            .iter()
            .map(|prediction| (&prediction.category, prediction.probability)),
    )
}

#[derive(Debug, Serialize)]
pub struct FlatResponse {
    pub category: String,
    pub confidence: f32,
    #[serde(serialize_with = "serialize_predictions")]
    pub predictions: Vec<Prediction>,
    pub recyclability: Recyclability,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub material: String,
    pub recyclable: bool,
}

#[derive(Debug, Serialize)]
pub struct NestedResponse {
    pub category: String,
    pub confidence: f32,
    #[serde(serialize_with = "serialize_predictions")]
    pub predictions: Vec<Prediction>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ClassifyResponse {
    Flat(FlatResponse),
    Nested(NestedResponse),
}

impl ClassifyResponse {
    pub fn for_variant(variant: Variant, result: ClassificationResult) -> Self {
        match variant {
            Variant::TrashNet => ClassifyResponse::Flat(FlatResponse {
                category: result.category,
                confidence: result.confidence,
                predictions: result.predictions,
                recyclability: result.recyclability,
                timestamp: timestamp(),
            }),
            Variant::Taco | Variant::WasteNet => ClassifyResponse::Nested(NestedResponse {
                category: result.category,
                confidence: result.confidence,
                predictions: result.predictions,
                metadata: Metadata {
                    material: result.material,
                    recyclable: result.recyclability.is_recyclable(),
                },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MockPrediction {
    pub category: String,
    pub confidence: f32,
}

/// Runner-up categories only; the top category is reported on its own.
fn runner_ups(result: &ClassificationResult) -> Vec<MockPrediction> {
    result
        .predictions
        .iter()
        .filter(|prediction| prediction.category != result.category)
        .map(|prediction| MockPrediction {
            category: prediction.category.clone(),
            confidence: prediction.probability,
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockTacoResponse {
    pub category: String,
    pub confidence: f32,
    pub predictions: Vec<MockPrediction>,
    pub timestamp: String,
    pub source: &'static str,
    pub disposal_recommendation: String,
    pub location_based_suggestion: &'static str,
}

impl From<ClassificationResult> for MockTacoResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            predictions: runner_ups(&result),
            disposal_recommendation: format!(
                "Please dispose of {} in appropriate bin",
                result.category
            ),
            category: result.category,
            confidence: result.confidence,
            timestamp: timestamp(),
            source: Variant::Taco.as_str(),
            location_based_suggestion: "Nearest recycling center: 123 Green St",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MockWasteNetResponse {
    pub category: String,
    pub confidence: f32,
    pub predictions: Vec<MockPrediction>,
    pub material_type: String,
    pub recyclability: Recyclability,
    pub timestamp: String,
    pub source: &'static str,
}

impl From<ClassificationResult> for MockWasteNetResponse {
    fn from(result: ClassificationResult) -> Self {
        Self {
            predictions: runner_ups(&result),
            category: result.category,
            confidence: result.confidence,
            material_type: result.material,
            recyclability: result.recyclability,
            timestamp: timestamp(),
            source: Variant::WasteNet.as_str(),
        }
    }
}
