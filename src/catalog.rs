use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::config::IMAGE_EXT;
use crate::foundation::error::{MintError, MintResult};

/// One of the three trait layers, in stacking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitCategory {
    /// Base layer. Its dimensions define the output size.
    Face,
    /// First overlay.
    Top,
    /// Second overlay, drawn last.
    Bottom,
}

impl TraitCategory {
    /// Base layer first, overlays after.
    pub const STACK: [TraitCategory; 3] = [Self::Face, Self::Top, Self::Bottom];

    /// Directory name under the catalog root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Face => "face",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// `trait_type` label used in metadata documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::Face => "Face",
            Self::Top => "Top",
            Self::Bottom => "Bottom",
        }
    }

    fn from_dir_name(name: &str) -> Option<Self> {
        Self::STACK.into_iter().find(|c| c.dir_name() == name)
    }
}

impl fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Relative path of one trait image, always of the form `<category>/<file>.png`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitVariant(String);

impl TraitVariant {
    /// Build a variant from its category and file name.
    pub fn new(category: TraitCategory, file_name: &str) -> Self {
        Self(format!("{}/{file_name}", category.dir_name()))
    }

    /// The `/`-separated relative path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the catalog root.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |p, seg| p.join(seg))
    }

    /// Human-readable trait value: the file name cut at its first `.`.
    ///
    /// `face/Yummy.png` -> `Yummy`, `top/v1.2.png` -> `v1`.
    pub fn trait_value(&self) -> &str {
        let file = self.0.rsplit('/').next().unwrap_or(self.0.as_str());
        file.split('.').next().unwrap_or(file)
    }
}

impl From<&str> for TraitVariant {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for TraitVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How variants are ordered inside each category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogOrder {
    /// Whatever the directory enumeration returns. Not reproducible across machines.
    #[serde(rename = "filesystem")]
    FileSystem,
    /// Lexicographic by file name.
    #[default]
    #[serde(rename = "sorted")]
    Sorted,
}

/// Variants discovered per category, with exactly one field per known category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraitCatalog {
    /// Base layer variants.
    pub face: Vec<TraitVariant>,
    /// First overlay variants.
    pub top: Vec<TraitVariant>,
    /// Second overlay variants.
    pub bottom: Vec<TraitVariant>,
}

impl TraitCatalog {
    /// Scan `root`, which must hold one subdirectory per [`TraitCategory`].
    ///
    /// Only regular files directly inside a category directory whose name ends in `.png`
    /// (case-sensitive) are collected. Unknown subdirectories of `root` are ignored.
    #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn scan(root: impl AsRef<Path>, order: CatalogOrder) -> MintResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(MintError::not_found(format!(
                "trait catalog root '{}' does not exist",
                root.display()
            )));
        }

        log_unknown_dirs(root)?;

        let mut catalog = Self::default();
        for category in TraitCategory::STACK {
            let mut variants = scan_category(root, category)?;
            if order == CatalogOrder::Sorted {
                variants.sort();
            }
            if variants.is_empty() {
                tracing::warn!(%category, "category has no .{IMAGE_EXT} variants");
            }
            *catalog.variants_mut(category) = variants;
        }

        tracing::info!(
            face = catalog.face.len(),
            top = catalog.top.len(),
            bottom = catalog.bottom.len(),
            "scanned trait catalog"
        );
        Ok(catalog)
    }

    /// Variants of one category.
    pub fn variants(&self, category: TraitCategory) -> &[TraitVariant] {
        match category {
            TraitCategory::Face => &self.face,
            TraitCategory::Top => &self.top,
            TraitCategory::Bottom => &self.bottom,
        }
    }

    fn variants_mut(&mut self, category: TraitCategory) -> &mut Vec<TraitVariant> {
        match category {
            TraitCategory::Face => &mut self.face,
            TraitCategory::Top => &mut self.top,
            TraitCategory::Bottom => &mut self.bottom,
        }
    }

    /// Size of the cartesian product. Zero if any category is empty.
    pub fn combination_count(&self) -> usize {
        self.face.len() * self.top.len() * self.bottom.len()
    }
}

fn scan_category(root: &Path, category: TraitCategory) -> MintResult<Vec<TraitVariant>> {
    let dir = root.join(category.dir_name());
    if !dir.is_dir() {
        return Err(MintError::not_found(format!(
            "category directory '{}' does not exist",
            dir.display()
        )));
    }

    let suffix = format!(".{IMAGE_EXT}");
    let mut out = Vec::new();
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("list category directory '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", dir.display()))?;
        // Follows symlinks, so linked variants count as files.
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            tracing::warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if name.ends_with(&suffix) {
            out.push(TraitVariant::new(category, name));
        }
    }
    Ok(out)
}

fn log_unknown_dirs(root: &Path) -> MintResult<()> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("list trait catalog root '{}'", root.display()))?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let known = name
            .to_str()
            .and_then(TraitCategory::from_dir_name)
            .is_some();
        if !known && entry.path().is_dir() {
            tracing::debug!(dir = %entry.path().display(), "ignoring unknown category directory");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/catalog.rs"]
mod tests;
