//! Shared types serialized into `catalogo.json`.
//!
//! The JSON field names are the public contract consumed by the storefront
//! page, so they stay in Spanish while the Rust names are English.

use serde::{Deserialize, Serialize};

/// One validated product, the unit emitted into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Category directory name, lower-cased.
    #[serde(rename = "categoria")]
    pub category: String,
    /// First non-blank line of `info.txt`.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Whole currency units, never negative.
    #[serde(rename = "precio")]
    pub price: u64,
    /// Remaining `info.txt` lines joined with single spaces.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// `<root>/<category>/<product>/imagenes/<file>`, naturally sorted.
    #[serde(rename = "imagenes")]
    pub images: Vec<String>,
}
