//! Phase entry points: generate a manifest, then consume it independently.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::catalog::TraitCatalog;
use crate::combine::combinations;
use crate::compositor::Compositor;
use crate::config::{MintConfig, Pacing};
use crate::foundation::error::{MintError, MintResult};
use crate::manifest::{Fingerprint, Manifest, OutputStamp, StampStatus};
use crate::metadata::MetadataEmitter;
use crate::report::BatchReport;
use crate::shuffle::{SecureSampler, SeededSampler, shuffled};

/// Options for [`generate`].
#[derive(Clone, Debug, Default)]
pub struct GenerateOpts {
    /// Replace an existing manifest. Without it, an existing manifest is never reshuffled.
    pub force: bool,
    /// Use a seeded sampler instead of the secure one. Debugging only.
    pub seed: Option<u64>,
}

/// What [`generate`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Variant counts as `(face, top, bottom)`.
    pub category_sizes: (usize, usize, usize),
    /// Number of records written.
    pub records: usize,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// Fingerprint of the written manifest.
    pub fingerprint: Fingerprint,
}

/// Options shared by the consuming phases.
#[derive(Clone, Debug, Default)]
pub struct ConsumeOpts {
    /// Refuse to run unless the manifest hashes to this value.
    pub expect_fingerprint: Option<Fingerprint>,
    /// Overwrite an output directory stamped by a different manifest.
    pub force: bool,
    /// Override the configured pacing for this phase.
    pub pacing: Option<Pacing>,
}

/// Scan the catalog, build and shuffle every combination, and freeze the order on disk.
#[tracing::instrument(skip_all)]
pub fn generate(cfg: &MintConfig, opts: &GenerateOpts) -> MintResult<GenerateSummary> {
    cfg.validate()?;
    let manifest_path = cfg.layout.manifest_path();
    if manifest_path.exists() && !opts.force {
        return Err(MintError::validation(format!(
            "manifest '{}' already exists; regenerating reshuffles every position \
             (re-run with --force to overwrite)",
            manifest_path.display()
        )));
    }

    let catalog = TraitCatalog::scan(&cfg.layout.images_root, cfg.catalog_order)?;
    let ordered = combinations(&catalog);

    let records = match opts.seed {
        Some(seed) => {
            tracing::warn!(seed, "shuffling with a seeded sampler");
            shuffled(&ordered, &mut SeededSampler::new(seed))
        }
        None => shuffled(&ordered, &mut SecureSampler),
    };

    let manifest = Manifest::new(records);
    let fingerprint = manifest.write(&manifest_path)?;

    Ok(GenerateSummary {
        category_sizes: (catalog.face.len(), catalog.top.len(), catalog.bottom.len()),
        records: manifest.len(),
        manifest_path,
        fingerprint,
    })
}

/// Composite one image per manifest position.
#[tracing::instrument(skip_all)]
pub fn render_images(cfg: &MintConfig, opts: &ConsumeOpts) -> MintResult<BatchReport> {
    let out_dir = cfg.layout.images_out_dir();
    let (manifest, status) = load_checked(cfg, opts, &cfg.layout.images_stamp_path())?;
    handle_leftovers(&out_dir, manifest.len(), status, Compositor::position_of)?;
    let compositor = Compositor::new(&cfg.layout.images_root, &out_dir, cfg.resize_filter);
    let pacing = opts.pacing.unwrap_or_else(|| cfg.pacing.images());
    Ok(compositor.render_batch(&manifest, pacing))
}

/// Write one metadata document per manifest position.
#[tracing::instrument(skip_all)]
pub fn emit_metadata(cfg: &MintConfig, opts: &ConsumeOpts) -> MintResult<BatchReport> {
    let out_dir = cfg.layout.metadata_out_dir();
    let (manifest, status) = load_checked(cfg, opts, &cfg.layout.metadata_stamp_path())?;
    handle_leftovers(&out_dir, manifest.len(), status, MetadataEmitter::position_of)?;
    let emitter = MetadataEmitter::new(&out_dir, cfg.collection.clone());
    let pacing = opts.pacing.unwrap_or_else(|| cfg.pacing.metadata());
    Ok(emitter.emit_batch(&manifest, pacing))
}

/// Fingerprint of the manifest currently on disk.
pub fn manifest_fingerprint(cfg: &MintConfig) -> MintResult<Fingerprint> {
    Manifest::read(cfg.layout.manifest_path())?.fingerprint()
}

fn load_checked(
    cfg: &MintConfig,
    opts: &ConsumeOpts,
    stamp_path: &Path,
) -> MintResult<(Manifest, StampStatus)> {
    cfg.validate()?;
    let manifest = Manifest::read(cfg.layout.manifest_path())?;
    if let Some(expected) = &opts.expect_fingerprint {
        manifest.ensure_fingerprint(expected)?;
    }
    let status =
        OutputStamp::at(stamp_path).check_or_create(&manifest.fingerprint()?, opts.force)?;
    tracing::info!(records = manifest.len(), ?status, "loaded manifest");
    Ok((manifest, status))
}

/// Numbered outputs in `out_dir` whose position lies beyond a manifest of `len` records.
fn outputs_beyond(
    out_dir: &Path,
    len: usize,
    position_of: fn(&str) -> Option<usize>,
) -> MintResult<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(out_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("list output directory '{}'", out_dir.display()))
                .into());
        }
    };
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in '{}'", out_dir.display()))?;
        let name = entry.file_name();
        let Some(position) = name.to_str().and_then(position_of) else {
            continue;
        };
        if position > len && entry.path().is_file() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

/// Outputs past the end of the manifest belong to an older, longer order. A replaced stamp
/// means the caller accepted that order is gone, so they are removed; otherwise they are
/// only reported.
fn handle_leftovers(
    out_dir: &Path,
    len: usize,
    status: StampStatus,
    position_of: fn(&str) -> Option<usize>,
) -> MintResult<()> {
    let leftovers = outputs_beyond(out_dir, len, position_of)?;
    if leftovers.is_empty() {
        return Ok(());
    }
    if status != StampStatus::Replaced {
        tracing::warn!(
            dir = %out_dir.display(),
            count = leftovers.len(),
            records = len,
            "output directory holds items beyond the end of the manifest"
        );
        return Ok(());
    }
    for path in &leftovers {
        std::fs::remove_file(path)
            .with_context(|| format!("remove leftover output '{}'", path.display()))?;
    }
    tracing::warn!(
        dir = %out_dir.display(),
        removed = leftovers.len(),
        records = len,
        "removed outputs beyond the end of the manifest"
    );
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
