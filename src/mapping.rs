use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, ensure};

use crate::preprocess::PreprocessConfig;

pub const TRASHNET_CATEGORIES: &[&str] = &["cardboard", "glass", "metal", "paper", "plastic", "trash"];

pub const TACO_CATEGORIES: &[&str] = &[
    "food_waste",
    "recyclable_container",
    "plastic_bag",
    "paper_product",
    "metal_container",
    "glass_bottle",
    "cardboard",
    "trash",
    "organic_waste",
    "electronic",
];

pub const WASTENET_CATEGORIES: &[&str] = &[
    "organic",
    "recyclable",
    "hazardous",
    "electronic",
    "construction",
    "metal",
    "plastic",
    "glass",
    "paper",
];

/// The model variants served over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Variant {
    #[value(name = "trashnet")]
    TrashNet,
    #[value(name = "taco")]
    Taco,
    #[value(name = "wastenet")]
    WasteNet,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::TrashNet, Variant::Taco, Variant::WasteNet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::TrashNet => "trashnet",
            Variant::Taco => "taco",
            Variant::WasteNet => "wastenet",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Variant::TrashNet => TRASHNET_CATEGORIES,
            Variant::Taco => TACO_CATEGORIES,
            Variant::WasteNet => WASTENET_CATEGORIES,
        }
    }

    /// TrashNet and TACO run a ResNet-50 backbone, WasteNet a ViT-B/16.
    pub fn preprocess_config(&self) -> PreprocessConfig {
        match self {
            Variant::TrashNet | Variant::Taco => PreprocessConfig::imagenet(),
            Variant::WasteNet => PreprocessConfig::vit(),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, non-empty list of output labels.
///
/// Indices are positional: entry `i` of a distribution belongs to label `i`,
/// so a deployed set must never be reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    labels: Arc<[String]>,
}

impl CategorySet {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        ensure!(!labels.is_empty(), "category set must contain at least one label");
        Ok(Self { labels: labels.into() })
    }

    pub fn from_static(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|label| label.to_string()).collect(),
        }
    }

    pub fn for_variant(variant: Variant) -> Self {
        Self::from_static(variant.categories())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Reads one label per line, skipping blank lines.
pub fn load_category_set(file_path: &Path) -> Result<CategorySet> {
    let file = File::open(file_path)
        .with_context(|| format!("failed to open labels file {}", file_path.display()))?;
    let reader = BufReader::new(file);

    let labels = reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read labels file {}", file_path.display()))?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    CategorySet::new(labels).with_context(|| format!("labels file {} is empty", file_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn variant_category_counts() {
        assert_eq!(CategorySet::for_variant(Variant::TrashNet).len(), 6);
        assert_eq!(CategorySet::for_variant(Variant::Taco).len(), 10);
        assert_eq!(CategorySet::for_variant(Variant::WasteNet).len(), 9);
    }

    #[test]
    fn category_order_is_positional() {
        let set = CategorySet::for_variant(Variant::TrashNet);
        assert_eq!(set.get(0), Some("cardboard"));
        assert_eq!(set.get(5), Some("trash"));
        assert_eq!(set.get(6), None);
    }

    #[test]
    fn empty_category_set_is_rejected() {
        assert!(CategorySet::new(Vec::new()).is_err());
    }

    #[test]
    fn labels_file_is_trimmed_and_skips_blank_lines() {
        let path = std::env::temp_dir().join(format!("labels-{}.txt", uuid::Uuid::new_v4()));
        let mut file = File::create(&path).unwrap();
        writeln!(file, " bottle \n\ncan\n  \njar").unwrap();
        drop(file);

        let set = load_category_set(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["bottle", "can", "jar"]);
    }

    #[test]
    fn blank_labels_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("labels-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "\n  \n").unwrap();

        let result = load_category_set(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }
}
