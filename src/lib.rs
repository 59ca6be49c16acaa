//! layermint generates combinatorial image assets from layered PNG traits.
//!
//! A run has one producing phase and two independent consuming phases:
//!
//! - [`generate`] scans the trait catalog, enumerates every face/top/bottom combination,
//!   shuffles them with a secure sampler and freezes that order in a JSON [`Manifest`].
//! - [`render_images`] composites one PNG per manifest position.
//! - [`emit_metadata`] writes one JSON descriptor per manifest position.
//!
//! Consumers refuse to mix outputs from different manifests (see [`OutputStamp`]).
#![forbid(unsafe_code)]

mod foundation;

pub mod catalog;
pub mod combine;
pub mod compositor;
pub mod config;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod shuffle;

pub use crate::catalog::{CatalogOrder, TraitCatalog, TraitCategory, TraitVariant};
pub use crate::combine::{CandidateRecord, combinations, record_at};
pub use crate::compositor::Compositor;
pub use crate::config::{Collection, Layout, MintConfig, Pacing, PacingConfig, ResizeFilter};
pub use crate::foundation::error::{MintError, MintResult};
pub use crate::manifest::{Fingerprint, Manifest, OutputStamp, StampStatus};
pub use crate::metadata::{Attribute, MetadataDocument, MetadataEmitter};
pub use crate::pipeline::{
    ConsumeOpts, GenerateOpts, GenerateSummary, emit_metadata, generate, manifest_fingerprint,
    render_images,
};
pub use crate::report::{BatchReport, ItemOutcome};
pub use crate::shuffle::{IndexSampler, SecureSampler, SeededSampler, shuffled};
