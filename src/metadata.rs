//! Static rule tables mapping a top category to its material type and
//! recyclability class.

use std::fmt;

use serde::Serialize;

use crate::mapping::Variant;

/// Material names a category can resolve to verbatim.
pub const MATERIAL_TYPES: &[&str] = &["plastic", "metal", "glass", "paper", "organic"];

/// Substrings tried, in order, when a category is not itself a material name.
pub const MATERIAL_SUBSTRINGS: &[&str] = &["plastic", "metal", "paper"];

pub const MIXED_MATERIAL: &str = "mixed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recyclability {
    Recyclable,
    NonRecyclable,
    Compostable,
    SpecialDisposal,
    /// Sentinel for categories absent from a variant's table.
    CheckLocalGuidelines,
}

impl Recyclability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recyclability::Recyclable => "recyclable",
            Recyclability::NonRecyclable => "non-recyclable",
            Recyclability::Compostable => "compostable",
            Recyclability::SpecialDisposal => "special-disposal",
            Recyclability::CheckLocalGuidelines => "check-local-guidelines",
        }
    }

    pub fn is_recyclable(&self) -> bool {
        matches!(self, Recyclability::Recyclable)
    }
}

impl fmt::Display for Recyclability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type RecyclabilityTable = &'static [(&'static str, Recyclability)];

static TRASHNET_RECYCLABILITY: RecyclabilityTable = &[
    ("cardboard", Recyclability::Recyclable),
    ("glass", Recyclability::Recyclable),
    ("metal", Recyclability::Recyclable),
    ("paper", Recyclability::Recyclable),
    ("plastic", Recyclability::Recyclable),
    ("trash", Recyclability::NonRecyclable),
];

// Categories carrying one of container/metal/paper/recyclable in their name.
static TACO_RECYCLABILITY: RecyclabilityTable = &[
    ("recyclable_container", Recyclability::Recyclable),
    ("paper_product", Recyclability::Recyclable),
    ("metal_container", Recyclability::Recyclable),
];

static WASTENET_RECYCLABILITY: RecyclabilityTable = &[
    ("organic", Recyclability::Compostable),
    ("recyclable", Recyclability::Recyclable),
    ("hazardous", Recyclability::SpecialDisposal),
    ("electronic", Recyclability::SpecialDisposal),
    ("construction", Recyclability::SpecialDisposal),
    ("metal", Recyclability::Recyclable),
    ("plastic", Recyclability::Recyclable),
    ("glass", Recyclability::Recyclable),
    ("paper", Recyclability::Recyclable),
];

/// Resolves the material type of a category: an exact material name wins,
/// then the first known material substring, then `"mixed"`.
pub fn material_type(category: &str) -> &'static str {
    if let Some(material) = MATERIAL_TYPES.iter().find(|material| **material == category) {
        return *material;
    }
    MATERIAL_SUBSTRINGS
        .iter()
        .find(|material| category.contains(**material))
        .copied()
        .unwrap_or(MIXED_MATERIAL)
}

/// Per-variant lookup rules for derived metadata.
#[derive(Debug, Clone, Copy)]
pub struct MetadataRules {
    recyclability: RecyclabilityTable,
}

impl MetadataRules {
    pub const fn new(recyclability: RecyclabilityTable) -> Self {
        Self { recyclability }
    }

    /// Rules with an empty recyclability table, so every category reports
    /// [`Recyclability::CheckLocalGuidelines`].
    pub const fn unknown() -> Self {
        Self::new(&[])
    }

    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::TrashNet => Self::new(TRASHNET_RECYCLABILITY),
            Variant::Taco => Self::new(TACO_RECYCLABILITY),
            Variant::WasteNet => Self::new(WASTENET_RECYCLABILITY),
        }
    }

    pub fn material(&self, category: &str) -> &'static str {
        material_type(category)
    }

    pub fn recyclability(&self, category: &str) -> Recyclability {
        self.recyclability
            .iter()
            .find(|(name, _)| *name == category)
            .map(|(_, recyclability)| *recyclability)
            .unwrap_or(Recyclability::CheckLocalGuidelines)
    }
}
