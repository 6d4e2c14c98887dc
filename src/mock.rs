//! Stand-ins that never run a network.
//!
//! [`MockAnalyzer`] fabricates whole results. Its probabilities are drawn
//! from disjoint ranges for the top category and the rest and do not sum to
//! one; that only holds for this path. [`MockClassifier`] plugs into the real
//! pipeline in place of a model and emits a random normalised vector.

use std::sync::Mutex;

use image::RgbImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::analyzer::{Analyzer, Backend};
use crate::classifier::{BoxError, Classifier};
use crate::error::ClassifyError;
use crate::formatter::{ClassificationResult, Prediction};
use crate::mapping::CategorySet;
use crate::metadata::{MATERIAL_TYPES, MIXED_MATERIAL, Recyclability};

pub const MOCK_TACO_CATEGORIES: &[&str] = &[
    "food_waste",
    "recyclable_container",
    "plastic_bag",
    "paper_product",
    "metal_container",
];

pub const MOCK_WASTENET_CATEGORIES: &[&str] =
    &["organic", "recyclable", "hazardous", "electronic", "construction"];

pub const MOCK_RECYCLABILITY: &[Recyclability] = &[
    Recyclability::Recyclable,
    Recyclability::NonRecyclable,
    Recyclability::SpecialDisposal,
];

pub const TOP_CONFIDENCE_RANGE: (f32, f32) = (0.6, 0.95);
pub const OTHER_CONFIDENCE_RANGE: (f32, f32) = (0.1, 0.3);

pub struct MockAnalyzer {
    categories: CategorySet,
    rng: Mutex<StdRng>,
}

impl MockAnalyzer {
    pub fn new(categories: CategorySet) -> Self {
        Self {
            categories,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn taco() -> Self {
        Self::new(CategorySet::from_static(MOCK_TACO_CATEGORIES))
    }

    pub fn wastenet() -> Self {
        Self::new(CategorySet::from_static(MOCK_WASTENET_CATEGORIES))
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn generate(&self) -> Result<ClassificationResult, ClassifyError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ClassifyError::inference("mock rng lock poisoned"))?;

        let top = rng.gen_range(0..self.categories.len());
        let confidence = rng.gen_range(TOP_CONFIDENCE_RANGE.0..=TOP_CONFIDENCE_RANGE.1);
        let predictions = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, category)| Prediction {
                category: category.to_string(),
                probability: if i == top {
                    confidence
                } else {
                    rng.gen_range(OTHER_CONFIDENCE_RANGE.0..=OTHER_CONFIDENCE_RANGE.1)
                },
            })
            .collect::<Vec<_>>();
        let material = MATERIAL_TYPES.choose(&mut *rng).copied().unwrap_or(MIXED_MATERIAL);
        let recyclability = MOCK_RECYCLABILITY
            .choose(&mut *rng)
            .copied()
            .unwrap_or(Recyclability::CheckLocalGuidelines);

        Ok(ClassificationResult {
            category: predictions[top].category.clone(),
            confidence,
            predictions,
            material: material.to_string(),
            recyclability,
        })
    }
}

impl Analyzer for MockAnalyzer {
    fn analyze(&self, _image: &RgbImage) -> Result<ClassificationResult, ClassifyError> {
        self.generate()
    }

    fn backend(&self) -> Backend {
        Backend::Mock
    }
}

pub struct MockClassifier {
    outputs: usize,
    rng: Mutex<StdRng>,
}

impl MockClassifier {
    pub fn new(outputs: usize) -> Self {
        Self::with_rng(outputs, StdRng::from_entropy())
    }

    pub fn with_rng(outputs: usize, rng: StdRng) -> Self {
        Self {
            outputs,
            rng: Mutex::new(rng),
        }
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, _image: &RgbImage) -> Result<Vec<f32>, BoxError> {
        let mut rng = self.rng.lock().map_err(|_| "mock rng lock poisoned")?;
        let scores: Vec<f32> = (0..self.outputs).map(|_| rng.r#gen::<f32>()).collect();
        let sum: f32 = scores.iter().sum();
        if sum <= 0.0 {
            return Ok(scores);
        }
        Ok(scores.into_iter().map(|v| v / sum).collect())
    }
}
