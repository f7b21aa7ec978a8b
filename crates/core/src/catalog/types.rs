//! Types for the inventory catalog and the order feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// How the image of an inventory entry is acquired.
///
/// Catalog rows carry a short code; [`SourceKind::from_code`] maps every code
/// onto one of these variants. Unrecognized codes (and an empty code) select
/// [`SourceKind::MultiRemote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Copy from the primary reference library (`rp`).
    LocalPrimary,
    /// Copy from the secondary reference library (`rs`).
    LocalSecondary,
    /// Download only the first image reference (`sc`).
    SingleRemote,
    /// Download every image reference (`mr`, default).
    MultiRemote,
}

impl SourceKind {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "rp" => Self::LocalPrimary,
            "rs" => Self::LocalSecondary,
            "sc" => Self::SingleRemote,
            _ => Self::MultiRemote,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::LocalPrimary => "rp",
            Self::LocalSecondary => "rs",
            Self::SingleRemote => "sc",
            Self::MultiRemote => "mr",
        }
    }

    /// Name of the output subdirectory holding orders of this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::LocalPrimary => "local_primary",
            Self::LocalSecondary => "local_secondary",
            Self::SingleRemote => "single_remote",
            Self::MultiRemote => "multi_remote",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::LocalPrimary | Self::LocalSecondary)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One row of the inventory catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRecord {
    pub sku: String,
    /// Image URLs or library file names, empty entries removed.
    pub image_refs: Vec<String>,
    pub source_kind: SourceKind,
}

impl InventoryRecord {
    /// Build a record from raw row fields: sku, pipe-delimited refs, kind code.
    pub fn from_fields(fields: &[String]) -> Self {
        let field = |idx: usize| fields.get(idx).map(String::as_str).unwrap_or("");

        Self {
            sku: field(0).to_string(),
            image_refs: field(1)
                .split('|')
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            source_kind: SourceKind::from_code(field(2)),
        }
    }
}

/// One row of the order feed, as read.
///
/// Fields are kept raw; interpreting them (timestamp parsing, SKU
/// tokenization) is the engine's job. A field is `None` when the row is too
/// short to contain it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRecord {
    /// Zero-based row index in the source, banner rows included.
    pub row: usize,
    pub date: Option<String>,
    pub time: Option<String>,
    pub order_id: Option<String>,
    pub skus: Option<String>,
}

impl OrderRecord {
    pub fn from_fields(row: usize, fields: &[String]) -> Self {
        let field = |idx: usize| fields.get(idx).cloned();

        Self {
            row,
            date: field(0),
            time: field(1),
            order_id: field(2),
            skus: field(3),
        }
    }

    /// Whitespace-separated SKU tokens; empty when the field is blank or absent.
    pub fn sku_tokens(&self) -> Vec<&str> {
        self.skus
            .as_deref()
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to open {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read row {row}")]
    Read {
        row: usize,
        #[source]
        source: csv::Error,
    },
}
