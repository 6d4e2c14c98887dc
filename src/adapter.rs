//! Turns a black-box classifier into a distribution over a fixed category set.

use image::{DynamicImage, RgbImage};

use crate::classifier::Classifier;
use crate::error::ClassifyError;
use crate::mapping::CategorySet;
use crate::postprocess::{remap_modulo, renormalize, to_probabilities};
use crate::preprocess::{INPUT_SIZE, ensure_rgb, resize_exact};

/// One adapter per model variant, parameterised by its classifier, its
/// category set and the input dimensions the classifier expects.
pub struct InferenceAdapter<C> {
    classifier: C,
    categories: CategorySet,
    width: u32,
    height: u32,
}

impl<C: Classifier> InferenceAdapter<C> {
    pub fn new(classifier: C, categories: CategorySet) -> Self {
        Self {
            classifier,
            categories,
            width: INPUT_SIZE,
            height: INPUT_SIZE,
        }
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn predict_dynamic(&self, image: DynamicImage) -> Result<Vec<f32>, ClassifyError> {
        self.predict(&ensure_rgb(image))
    }

    /// Runs the classifier and projects its output onto the category set.
    ///
    /// The returned distribution has one entry per category and sums to one.
    /// The projection is the index-modulo remap of [`remap_modulo`].
    pub fn predict(&self, image: &RgbImage) -> Result<Vec<f32>, ClassifyError> {
        let resized =
            resize_exact(image, self.width, self.height).map_err(ClassifyError::Inference)?;

        let raw = self
            .classifier
            .classify(&resized)
            .map_err(ClassifyError::Inference)?;
        if raw.is_empty() {
            return Err(ClassifyError::inference("classifier returned an empty output vector"));
        }
        let raw = to_probabilities(raw);

        let mapped = remap_modulo(&raw, self.categories.len());
        renormalize(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::BoxError;
    use crate::mapping::Variant;
    use std::sync::Mutex;

    struct FixedClassifier(Vec<f32>);

    impl Classifier for FixedClassifier {
        fn classify(&self, _image: &RgbImage) -> Result<Vec<f32>, BoxError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    impl Classifier for FailingClassifier {
        fn classify(&self, _image: &RgbImage) -> Result<Vec<f32>, BoxError> {
            Err("input shape mismatch".into())
        }
    }

    #[derive(Default)]
    struct RecordingClassifier {
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl Classifier for RecordingClassifier {
        fn classify(&self, image: &RgbImage) -> Result<Vec<f32>, BoxError> {
            self.seen.lock().unwrap().push(image.dimensions());
            Ok(vec![1.0])
        }
    }

    fn trashnet<C: Classifier>(classifier: C) -> InferenceAdapter<C> {
        InferenceAdapter::new(classifier, CategorySet::for_variant(Variant::TrashNet))
    }

    #[test]
    fn short_output_is_cycled_over_categories() {
        let adapter = trashnet(FixedClassifier(vec![0.1, 0.7, 0.2]));
        let dist = adapter.predict(&RgbImage::new(8, 8)).unwrap();

        let expected = [0.05, 0.35, 0.1, 0.05, 0.35, 0.1];
        assert_eq!(dist.len(), expected.len());
        for (actual, expected) in dist.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn distribution_sums_to_one() {
        let raw: Vec<f32> = (1..=1000).map(|i| i as f32).collect();
        for variant in Variant::ALL {
            let adapter = InferenceAdapter::new(FixedClassifier(raw.clone()), CategorySet::for_variant(variant));
            let dist = adapter.predict(&RgbImage::new(4, 4)).unwrap();
            assert_eq!(dist.len(), variant.categories().len());
            assert!((dist.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn unnormalised_output_is_rescaled_before_remap() {
        let adapter = InferenceAdapter::new(
            FixedClassifier(vec![1.0, 3.0]),
            CategorySet::from_static(&["a", "b", "c"]),
        );
        let dist = adapter.predict(&RgbImage::new(4, 4)).unwrap();
        for (actual, expected) in dist.iter().zip([0.2, 0.6, 0.2]) {
            assert!((actual - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn mixed_sign_logits_never_yield_negative_probabilities() {
        let adapter = InferenceAdapter::new(
            FixedClassifier(vec![-1.0, 3.0]),
            CategorySet::from_static(&["a", "b"]),
        );
        let dist = adapter.predict(&RgbImage::new(4, 4)).unwrap();
        assert!(dist.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!((dist.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(dist[1] > dist[0]);
    }

    #[test]
    fn all_negative_logits_are_not_degenerate() {
        let adapter = InferenceAdapter::new(
            FixedClassifier(vec![-2.0, -1.0, -3.0]),
            CategorySet::from_static(&["a", "b", "c"]),
        );
        let dist = adapter.predict(&RgbImage::new(4, 4)).unwrap();
        assert!(dist.iter().all(|p| *p > 0.0));
        assert!((dist.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert_eq!(crate::postprocess::argmax_and_max(&dist).0, 1);
    }

    #[test]
    fn predict_is_idempotent_for_deterministic_classifiers() {
        let adapter = trashnet(FixedClassifier(vec![0.3, 0.3, 0.4]));
        let image = RgbImage::new(16, 16);
        assert_eq!(adapter.predict(&image).unwrap(), adapter.predict(&image).unwrap());
    }

    #[test]
    fn zero_output_is_degenerate() {
        let adapter = trashnet(FixedClassifier(vec![0.0; 1000]));
        let err = adapter.predict(&RgbImage::new(4, 4)).unwrap_err();
        assert!(matches!(err, ClassifyError::DegenerateDistribution { .. }));
    }

    #[test]
    fn empty_output_is_an_inference_error() {
        let adapter = trashnet(FixedClassifier(Vec::new()));
        let err = adapter.predict(&RgbImage::new(4, 4)).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
    }

    #[test]
    fn classifier_failure_keeps_its_cause() {
        let adapter = trashnet(FailingClassifier);
        let err = adapter.predict(&RgbImage::new(4, 4)).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "input shape mismatch");
    }

    #[test]
    fn classifier_sees_resized_rgb_input() {
        let recorder = std::sync::Arc::new(RecordingClassifier::default());
        let adapter = InferenceAdapter::new(recorder.clone(), CategorySet::for_variant(Variant::Taco));
        let gray = DynamicImage::ImageLuma8(image::GrayImage::new(300, 120));

        adapter.predict_dynamic(gray).unwrap();
        adapter.with_input_size(32, 16).predict(&RgbImage::new(5, 5)).unwrap();

        assert_eq!(*recorder.seen.lock().unwrap(), vec![(224, 224), (32, 16)]);
    }
}
