use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogOrder;
use crate::foundation::error::{MintError, MintResult};

/// File name of the order manifest under `<output_root>/orders`.
pub const MANIFEST_FILE_NAME: &str = "images.json";
/// Extension of trait variants and composited outputs.
pub const IMAGE_EXT: &str = "png";

/// Run configuration. Every field has a default, so an empty JSON object is valid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MintConfig {
    /// Input and output locations.
    pub layout: Layout,
    /// Constant fields of every metadata document.
    pub collection: Collection,
    /// Throttle between successive per-item writes.
    pub pacing: PacingConfig,
    /// Variant ordering inside each category.
    pub catalog_order: CatalogOrder,
    /// Resampling filter used to fit overlays to the base layer.
    pub resize_filter: ResizeFilter,
}

impl MintConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MintResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| MintError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MintResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MintError::not_found(format!("config '{}' does not exist", path.display()))
            } else {
                MintError::validation(format!("open config JSON '{}': {e}", path.display()))
            }
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> MintResult<()> {
        if self.collection.name.trim().is_empty() {
            return Err(MintError::validation("collection name must be non-empty"));
        }
        if self.layout.images_root.as_os_str().is_empty() {
            return Err(MintError::validation("images_root must be non-empty"));
        }
        if self.layout.output_root.as_os_str().is_empty() {
            return Err(MintError::validation("output_root must be non-empty"));
        }
        Ok(())
    }
}

/// Directory layout. Outputs are derived from `output_root`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Trait catalog root holding one subdirectory per category.
    pub images_root: PathBuf,
    /// Root of all generated artifacts.
    pub output_root: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            images_root: PathBuf::from("images"),
            output_root: PathBuf::from("output"),
        }
    }
}

impl Layout {
    /// `<output_root>/orders/images.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.output_root.join("orders").join(MANIFEST_FILE_NAME)
    }

    /// `<output_root>/images`
    pub fn images_out_dir(&self) -> PathBuf {
        self.output_root.join("images")
    }

    /// `<output_root>/metadata`
    pub fn metadata_out_dir(&self) -> PathBuf {
        self.output_root.join("metadata")
    }

    /// `<output_root>/orders/images.stamp`, kept out of the published image directory.
    pub fn images_stamp_path(&self) -> PathBuf {
        self.output_root.join("orders").join("images.stamp")
    }

    /// `<output_root>/orders/metadata.stamp`
    pub fn metadata_stamp_path(&self) -> PathBuf {
        self.output_root.join("orders").join("metadata.stamp")
    }
}

/// Constant metadata fields shared by every item of a collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Collection {
    /// Display name prefix; items are named `"<name> #<n>"`.
    pub name: String,
    /// Description copied verbatim into every document.
    pub description: String,
    /// External link copied verbatim into every document.
    pub external_url: String,
    /// Content-addressed location of the composited images, without the trailing file name.
    pub image_base_uri: String,
}

impl Default for Collection {
    fn default() -> Self {
        Self {
            name: "Bomm".to_string(),
            description: "Meow dia~ Hi there! I'm Bomm(봄이), the cutest little ragdoll fluff you'll ever meet! 🐾 I was born on 2020.2.24, and my purr-fect life with my family began on 2020.4.10. I'm super playful and totally lovable—just ask anyone! Oh, and I share my cozy home with my bestie, Kong-ee(콩이). We have so much fun together! Purr~ 😽".to_string(),
            external_url: "https://www.instagram.com/cat__bomkong/profilecard".to_string(),
            image_base_uri:
                "ipfs://bafybeicsan7qpqccimr7ppt3d27jl343kj6tfuyuepbnucyjzrag6tl6ym".to_string(),
        }
    }
}

/// Per-phase pacing delays in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingConfig {
    /// Delay between successive composited images.
    pub image_delay_ms: u64,
    /// Delay between successive metadata documents.
    pub metadata_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            image_delay_ms: 1,
            metadata_delay_ms: 5,
        }
    }
}

impl PacingConfig {
    /// Pacing for the image phase.
    pub fn images(&self) -> Pacing {
        Pacing::from_millis(self.image_delay_ms)
    }

    /// Pacing for the metadata phase.
    pub fn metadata(&self) -> Pacing {
        Pacing::from_millis(self.metadata_delay_ms)
    }
}

/// Throttle inserted between successive items of a batch. Not a correctness requirement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pacing {
    /// Sleep duration between two items.
    pub delay: Duration,
}

impl Pacing {
    /// No delay.
    pub const NONE: Pacing = Pacing {
        delay: Duration::ZERO,
    };

    /// Build a pacing from a millisecond count.
    pub fn from_millis(ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(ms),
        }
    }

    /// Sleep for the configured delay.
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

/// Resampling filter, mirroring [`image::imageops::FilterType`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl From<ResizeFilter> for image::imageops::FilterType {
    fn from(f: ResizeFilter) -> Self {
        match f {
            ResizeFilter::Nearest => Self::Nearest,
            ResizeFilter::Triangle => Self::Triangle,
            ResizeFilter::CatmullRom => Self::CatmullRom,
            ResizeFilter::Gaussian => Self::Gaussian,
            ResizeFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
