use serde::{Deserialize, Serialize};

use crate::catalog::{TraitCatalog, TraitCategory, TraitVariant};

/// One combination: exactly one variant per category.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateRecord {
    /// Base layer.
    pub face: TraitVariant,
    /// First overlay.
    pub top: TraitVariant,
    /// Second overlay.
    pub bottom: TraitVariant,
}

impl CandidateRecord {
    /// Build a record from anything convertible into variants.
    pub fn new(
        face: impl Into<TraitVariant>,
        top: impl Into<TraitVariant>,
        bottom: impl Into<TraitVariant>,
    ) -> Self {
        Self {
            face: face.into(),
            top: top.into(),
            bottom: bottom.into(),
        }
    }

    /// The variant chosen for `category`.
    pub fn variant(&self, category: TraitCategory) -> &TraitVariant {
        match category {
            TraitCategory::Face => &self.face,
            TraitCategory::Top => &self.top,
            TraitCategory::Bottom => &self.bottom,
        }
    }

    /// Variants paired with their category, in stacking order.
    pub fn layers(&self) -> [(TraitCategory, &TraitVariant); 3] {
        TraitCategory::STACK.map(|c| (c, self.variant(c)))
    }
}

/// Full cartesian product of the catalog.
///
/// Face varies slowest and bottom fastest, so the record at `x·b·c + y·c + z` is
/// `(face[x], top[y], bottom[z])`. Empty when any category is empty.
pub fn combinations(catalog: &TraitCatalog) -> Vec<CandidateRecord> {
    let mut out = Vec::with_capacity(catalog.combination_count());
    for face in &catalog.face {
        for top in &catalog.top {
            for bottom in &catalog.bottom {
                out.push(CandidateRecord {
                    face: face.clone(),
                    top: top.clone(),
                    bottom: bottom.clone(),
                });
            }
        }
    }
    out
}

/// Record at flattened index `i` of [`combinations`] without materializing the product.
pub fn record_at(catalog: &TraitCatalog, i: usize) -> Option<CandidateRecord> {
    if i >= catalog.combination_count() {
        return None;
    }
    let b = catalog.top.len();
    let c = catalog.bottom.len();
    let (x, rest) = (i / (b * c), i % (b * c));
    let (y, z) = (rest / c, rest % c);
    Some(CandidateRecord {
        face: catalog.face[x].clone(),
        top: catalog.top[y].clone(),
        bottom: catalog.bottom[z].clone(),
    })
}

#[cfg(test)]
#[path = "../tests/unit/combine.rs"]
mod tests;
