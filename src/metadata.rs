use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::catalog::TraitCategory;
use crate::combine::CandidateRecord;
use crate::config::{Collection, IMAGE_EXT, Pacing};
use crate::foundation::error::{MintError, MintResult};
use crate::foundation::fsutil;
use crate::manifest::Manifest;
use crate::report::{BatchReport, ItemOutcome};

/// One `(trait_type, value)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Category label, e.g. `Face`.
    pub trait_type: String,
    /// Variant file name without extension.
    pub value: String,
}

/// Descriptor document for one manifest position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// `"<collection> #<position>"`.
    pub name: String,
    /// Collection description, identical for every item.
    pub description: String,
    /// Collection link, identical for every item.
    pub external_url: String,
    /// `<image_base_uri>/<position>.png`
    pub image: String,
    /// One entry per category, in stacking order.
    pub attributes: Vec<Attribute>,
}

impl MetadataDocument {
    /// Build the document for the 0-based `index` of `records`.
    pub fn for_position(
        records: &[CandidateRecord],
        index: usize,
        collection: &Collection,
    ) -> MintResult<Self> {
        let record = records.get(index).ok_or_else(|| {
            MintError::validation(format!(
                "index {index} out of range for manifest of {} records",
                records.len()
            ))
        })?;
        Ok(Self::for_record(record, index + 1, collection))
    }

    /// Build the document for `record` at 1-based `position`.
    pub fn for_record(record: &CandidateRecord, position: usize, collection: &Collection) -> Self {
        let attributes = TraitCategory::STACK
            .iter()
            .map(|&c| Attribute {
                trait_type: c.label().to_string(),
                value: record.variant(c).trait_value().to_string(),
            })
            .collect();

        Self {
            name: format!("{} #{position}", collection.name),
            description: collection.description.clone(),
            external_url: collection.external_url.clone(),
            image: format!(
                "{}/{position}.{IMAGE_EXT}",
                collection.image_base_uri.trim_end_matches('/')
            ),
            attributes,
        }
    }

    /// Pretty JSON with 2-space indentation.
    pub fn to_json(&self) -> MintResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MintError::metadata(format!("serialize '{}': {e}", self.name)))
    }
}

/// Writes one extension-less JSON file per manifest position.
#[derive(Clone, Debug)]
pub struct MetadataEmitter {
    output_dir: PathBuf,
    collection: Collection,
}

impl MetadataEmitter {
    /// Write documents for `collection` into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>, collection: Collection) -> Self {
        Self {
            output_dir: output_dir.into(),
            collection,
        }
    }

    /// `<output_dir>/<position>`
    pub fn output_path(&self, position: usize) -> PathBuf {
        self.output_dir.join(position.to_string())
    }

    /// Position encoded in an output file name (`7` -> 7).
    pub fn position_of(file_name: &str) -> Option<usize> {
        file_name.parse().ok()
    }

    /// Write the document for the 0-based `index`, replacing any previous file.
    pub fn emit(&self, records: &[CandidateRecord], index: usize) -> MintResult<PathBuf> {
        let doc = MetadataDocument::for_position(records, index, &self.collection)?;
        let out = self.output_path(index + 1);
        self.write(&doc, &out)
            .map_err(|e| MintError::metadata(format!("item {}: {e:#}", index + 1)))?;
        Ok(out)
    }

    fn write(&self, doc: &MetadataDocument, out: &Path) -> anyhow::Result<()> {
        fsutil::ensure_dir(&self.output_dir)?;
        let json = doc.to_json()?;
        std::fs::write(out, json.as_bytes())
            .with_context(|| format!("write metadata '{}'", out.display()))?;
        Ok(())
    }

    /// Emit every position of `manifest`, isolating per-item failures.
    #[tracing::instrument(skip_all, fields(records = manifest.len()))]
    pub fn emit_batch(&self, manifest: &Manifest, pacing: Pacing) -> BatchReport {
        let mut report = BatchReport::default();
        for i in 0..manifest.len() {
            if i > 0 {
                pacing.pause();
            }
            let result = self.emit(&manifest.records, i);
            match &result {
                Ok(path) => tracing::info!(position = i + 1, path = %path.display(), "saved metadata"),
                Err(e) => tracing::error!(position = i + 1, error = %e, "failed to save metadata"),
            }
            report.push(ItemOutcome::from_result(i + 1, result));
        }
        tracing::info!(
            ok = report.succeeded().count(),
            failed = report.failed().count(),
            "metadata batch finished"
        );
        report
    }
}

#[cfg(test)]
#[path = "../tests/unit/metadata.rs"]
mod tests;
