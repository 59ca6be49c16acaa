use std::path::PathBuf;

use anyhow::Context as _;
use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::catalog::TraitVariant;
use crate::combine::CandidateRecord;
use crate::config::{IMAGE_EXT, Pacing, ResizeFilter};
use crate::foundation::error::{MintError, MintResult};
use crate::foundation::fsutil;
use crate::manifest::Manifest;
use crate::report::{BatchReport, ItemOutcome};

/// Stacks the three trait layers of a record into one PNG.
#[derive(Clone, Debug)]
pub struct Compositor {
    images_root: PathBuf,
    output_dir: PathBuf,
    filter: FilterType,
}

impl Compositor {
    /// Read variants under `images_root` and write `<n>.png` files into `output_dir`.
    pub fn new(
        images_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        filter: ResizeFilter,
    ) -> Self {
        Self {
            images_root: images_root.into(),
            output_dir: output_dir.into(),
            filter: filter.into(),
        }
    }

    /// Output path for a 1-based position.
    pub fn output_path(&self, position: usize) -> PathBuf {
        self.output_dir.join(format!("{position}.{IMAGE_EXT}"))
    }

    /// Position encoded in an output file name (`7.png` -> 7).
    pub fn position_of(file_name: &str) -> Option<usize> {
        file_name
            .strip_suffix(IMAGE_EXT)?
            .strip_suffix('.')?
            .parse()
            .ok()
    }

    /// Composite one record and write it as `<position>.png`.
    ///
    /// The face layer sets the canvas size. Top and bottom are stretched to exactly that size
    /// and drawn over it at (0, 0) in that order, so bottom wins where both are opaque.
    pub fn composite(&self, record: &CandidateRecord, position: usize) -> MintResult<PathBuf> {
        self.try_composite(record, position)
            .map_err(|e| MintError::composite(format!("item {position}: {e:#}")))
    }

    fn try_composite(&self, record: &CandidateRecord, position: usize) -> anyhow::Result<PathBuf> {
        let mut canvas = self.load(&record.face)?;
        let (width, height) = canvas.dimensions();

        for overlay in [&record.top, &record.bottom] {
            let layer = self.load(overlay)?;
            let layer = if layer.dimensions() == (width, height) {
                layer
            } else {
                imageops::resize(&layer, width, height, self.filter)
            };
            imageops::overlay(&mut canvas, &layer, 0, 0);
        }

        fsutil::ensure_dir(&self.output_dir)?;
        let out = self.output_path(position);
        canvas
            .save_with_format(&out, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", out.display()))?;
        Ok(out)
    }

    fn load(&self, variant: &TraitVariant) -> anyhow::Result<RgbaImage> {
        let path = variant.resolve(&self.images_root);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read layer '{}'", path.display()))?;
        let img = image::load_from_memory(&bytes)
            .with_context(|| format!("decode layer '{}'", path.display()))?;
        Ok(img.to_rgba8())
    }

    /// Composite every record of `manifest`, isolating per-item failures.
    ///
    /// Failures are logged with their position and recorded in the report; the batch always
    /// runs to the end.
    #[tracing::instrument(skip_all, fields(records = manifest.len()))]
    pub fn render_batch(&self, manifest: &Manifest, pacing: Pacing) -> BatchReport {
        let mut report = BatchReport::default();
        for (i, record) in manifest.records.iter().enumerate() {
            if i > 0 {
                pacing.pause();
            }
            let position = i + 1;
            let result = self.composite(record, position);
            match &result {
                Ok(path) => tracing::info!(position, path = %path.display(), "saved image"),
                Err(e) => tracing::error!(position, error = %e, "failed to save image"),
            }
            report.push(ItemOutcome::from_result(position, result));
        }
        tracing::info!(
            ok = report.succeeded().count(),
            failed = report.failed().count(),
            "image batch finished"
        );
        report
    }
}

#[cfg(test)]
#[path = "../tests/unit/compositor.rs"]
mod tests;
