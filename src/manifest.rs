use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use sha2::Digest as _;

use crate::combine::CandidateRecord;
use crate::foundation::error::{MintError, MintResult};
use crate::foundation::fsutil;

/// The frozen generation order. Downstream phases index into it by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Records in generation order; position `i` renders as item `i + 1`.
    pub records: Vec<CandidateRecord>,
}

impl Manifest {
    /// Wrap an ordered record list.
    pub fn new(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the manifest has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical serialization: a top-level JSON array, 2-space indentation.
    pub fn to_json(&self) -> MintResult<String> {
        serde_json::to_string_pretty(&self.records)
            .map_err(|e| MintError::Other(anyhow::Error::new(e).context("serialize manifest")))
    }

    /// Parse a manifest from its JSON text.
    pub fn from_json(s: &str) -> MintResult<Self> {
        let records: Vec<CandidateRecord> = serde_json::from_str(s)
            .map_err(|e| MintError::parse(format!("manifest JSON: {e}")))?;
        Ok(Self { records })
    }

    /// Content fingerprint of the canonical serialization.
    pub fn fingerprint(&self) -> MintResult<Fingerprint> {
        Ok(Fingerprint::of_bytes(self.to_json()?.as_bytes()))
    }

    /// Write to `path`, creating parent directories, and return the fingerprint.
    pub fn write(&self, path: impl AsRef<Path>) -> MintResult<Fingerprint> {
        let path = path.as_ref();
        fsutil::ensure_parent(path)?;
        let json = self.to_json()?;
        std::fs::write(path, json.as_bytes())
            .with_context(|| format!("write manifest '{}'", path.display()))?;
        let fp = Fingerprint::of_bytes(json.as_bytes());
        tracing::info!(path = %path.display(), records = self.len(), %fp, "wrote manifest");
        Ok(fp)
    }

    /// Read from `path`.
    pub fn read(path: impl AsRef<Path>) -> MintResult<Self> {
        let path = path.as_ref();
        let s = fsutil::read_to_string(path, "manifest")?;
        Self::from_json(&s).map_err(|e| match e {
            MintError::Parse(msg) => MintError::parse(format!("'{}': {msg}", path.display())),
            other => other,
        })
    }

    /// Fail with [`MintError::Stale`] unless this manifest hashes to `expected`.
    pub fn ensure_fingerprint(&self, expected: &Fingerprint) -> MintResult<()> {
        let actual = self.fingerprint()?;
        if &actual != expected {
            return Err(MintError::stale(format!(
                "manifest fingerprint is {actual}, expected {expected}"
            )));
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of a manifest's canonical bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash raw bytes.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(sha2::Sha256::digest(bytes)))
    }

    /// Parse a user-supplied hex digest (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> MintResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        let decoded = hex::decode(&s)
            .map_err(|e| MintError::validation(format!("fingerprint '{s}' is not hex: {e}")))?;
        if decoded.len() != 32 {
            return Err(MintError::validation(format!(
                "fingerprint '{s}' must be 32 bytes, got {}",
                decoded.len()
            )));
        }
        Ok(Self(s))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What [`OutputStamp::check_or_create`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StampStatus {
    /// No stamp existed; one was written.
    Created,
    /// The stamp already named this manifest.
    Matched,
    /// A different (or unreadable) stamp was overwritten under `force`.
    Replaced,
}

/// Binds one consumer phase's outputs to the manifest they were produced from.
///
/// Regenerating the manifest reshuffles positions, so writing new items next to items from an
/// older manifest would silently mix two orders. The stamp turns that into a hard error. Stamps
/// live next to the manifest, never inside the published output directories.
#[derive(Clone, Debug)]
pub struct OutputStamp {
    path: PathBuf,
}

impl OutputStamp {
    /// Stamp stored at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the stamp is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fingerprint currently recorded, if any.
    pub fn load(&self) -> MintResult<Option<Fingerprint>> {
        match fsutil::read_to_string(&self.path, "output stamp") {
            Ok(s) => Fingerprint::parse(&s).map(Some).map_err(|e| {
                MintError::stale(format!("unreadable stamp '{}': {e}", self.path.display()))
            }),
            Err(MintError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Record `fp`, replacing any previous stamp.
    pub fn store(&self, fp: &Fingerprint) -> MintResult<()> {
        fsutil::ensure_parent(&self.path)?;
        std::fs::write(&self.path, fp.as_str())
            .with_context(|| format!("write output stamp '{}'", self.path.display()))?;
        Ok(())
    }

    /// Accept `fp` if the phase is unstamped or stamped with `fp`.
    ///
    /// With `force`, a mismatching stamp is overwritten instead of rejected and the caller gets
    /// [`StampStatus::Replaced`], meaning outputs on disk may belong to another manifest.
    pub fn check_or_create(&self, fp: &Fingerprint, force: bool) -> MintResult<StampStatus> {
        match self.load() {
            Ok(Some(existing)) if &existing == fp => Ok(StampStatus::Matched),
            Ok(None) => self.store(fp).map(|()| StampStatus::Created),
            Ok(Some(existing)) if !force => Err(MintError::stale(format!(
                "'{}' records manifest {existing}, current manifest is {fp} \
                 (re-run with --force to overwrite)",
                self.path.display()
            ))),
            Err(MintError::Stale(msg)) if !force => Err(MintError::stale(msg)),
            Ok(Some(_)) | Err(MintError::Stale(_)) => {
                tracing::warn!(path = %self.path.display(), %fp, "overwriting output stamp");
                self.store(fp).map(|()| StampStatus::Replaced)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/manifest.rs"]
mod tests;
