//! Named asset catalog
//!
//! The host loads images, sounds and particle emitter files by name. Every
//! lookup goes through the catalog and comes back as a `Result`, so a missing
//! asset is reported instead of taking the process down.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What sort of resource an asset is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Sound,
    Emitter,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Image => "image",
            AssetKind::Sound => "sound",
            AssetKind::Emitter => "emitter",
        };
        f.write_str(s)
    }
}

/// A single manifest entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub name: String,
    pub kind: AssetKind,
    /// File path relative to the asset root
    pub file: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    assets: Vec<AssetEntry>,
}

/// Everything the game needs out of the bundle
const BUILTIN: &[(&str, AssetKind, &str)] = &[
    ("sliceBackground", AssetKind::Image, "sliceBackground.png"),
    ("sliceLife", AssetKind::Image, "sliceLife.png"),
    ("sliceLifeGone", AssetKind::Image, "sliceLifeGone.png"),
    ("sliceBomb", AssetKind::Image, "sliceBomb.png"),
    ("penguin", AssetKind::Image, "penguin.png"),
    ("penguinBonus", AssetKind::Image, "penguinBonus.png"),
    ("gameOver", AssetKind::Image, "gameOver.png"),
    ("launch.caf", AssetKind::Sound, "launch.caf"),
    ("whack.caf", AssetKind::Sound, "whack.caf"),
    ("explosion.caf", AssetKind::Sound, "explosion.caf"),
    ("wrong.caf", AssetKind::Sound, "wrong.caf"),
    ("gameOver.caf", AssetKind::Sound, "gameOver.caf"),
    ("swoosh1.caf", AssetKind::Sound, "swoosh1.caf"),
    ("swoosh2.caf", AssetKind::Sound, "swoosh2.caf"),
    ("swoosh3.caf", AssetKind::Sound, "swoosh3.caf"),
    ("sliceBombFuse.caf", AssetKind::Sound, "sliceBombFuse.caf"),
    ("sliceHitEnemy", AssetKind::Emitter, "sliceHitEnemy.sks"),
    ("sliceHitBomb", AssetKind::Emitter, "sliceHitBomb.sks"),
    ("sliceFuse", AssetKind::Emitter, "sliceFuse.sks"),
];

/// Asset name → entry, rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
    entries: BTreeMap<String, AssetEntry>,
}

impl AssetCatalog {
    /// Catalog of the built-in asset set under `root`
    pub fn builtin(root: impl Into<PathBuf>) -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(name, kind, file)| {
                let entry = AssetEntry {
                    name: name.to_string(),
                    kind,
                    file: PathBuf::from(file),
                };
                (name.to_string(), entry)
            })
            .collect();
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Apply a JSON manifest on top of the catalog (entries replace by name)
    pub fn apply_manifest(&mut self, json: &str) -> Result<usize, AssetError> {
        let manifest: Manifest = serde_json::from_str(json).map_err(AssetError::Manifest)?;
        let count = manifest.assets.len();
        for entry in manifest.assets {
            self.entries.insert(entry.name.clone(), entry);
        }
        log::debug!("Applied asset manifest ({count} entries)");
        Ok(count)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an asset by name, checking it is the expected kind
    pub fn lookup(&self, name: &str, kind: AssetKind) -> Result<&AssetEntry, AssetError> {
        let entry = self.entries.get(name).ok_or_else(|| AssetError::Unknown {
            name: name.to_string(),
        })?;
        if entry.kind != kind {
            return Err(AssetError::WrongKind {
                name: name.to_string(),
                expected: kind,
                found: entry.kind,
            });
        }
        Ok(entry)
    }

    /// Full on-disk path of an asset, which must exist
    pub fn path_of(&self, name: &str, kind: AssetKind) -> Result<PathBuf, AssetError> {
        let entry = self.lookup(name, kind)?;
        let path = self.root.join(&entry.file);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(AssetError::MissingFile { name: name.to_string(), path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::MissingFile { name: name.to_string(), path })
            }
            Err(e) => Err(AssetError::Io { path, source: e }),
        }
    }

    /// Check every catalogued file exists; returns all failures
    pub fn verify(&self) -> Result<(), Vec<AssetError>> {
        let errors: Vec<AssetError> = self
            .entries
            .values()
            .filter_map(|entry| self.path_of(&entry.name, entry.kind).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Asset lookup failure
#[derive(Debug)]
pub enum AssetError {
    Unknown { name: String },
    WrongKind { name: String, expected: AssetKind, found: AssetKind },
    MissingFile { name: String, path: PathBuf },
    Io { path: PathBuf, source: std::io::Error },
    Manifest(serde_json::Error),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Unknown { name } => write!(f, "Unknown asset `{name}`"),
            AssetError::WrongKind {
                name,
                expected,
                found,
            } => write!(f, "Asset `{name}` is a {found}, expected a {expected}"),
            AssetError::MissingFile { name, path } => {
                write!(f, "Asset `{name}` missing at {}", path.display())
            }
            AssetError::Io { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            AssetError::Manifest(e) => write!(f, "Malformed asset manifest: {e}"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            AssetError::Manifest(e) => Some(e),
            _ => None,
        }
    }
}
