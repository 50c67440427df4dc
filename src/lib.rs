//! # Simple Catalog
//!
//! A static product-catalog generator. The filesystem is the data source:
//! category directories hold product directories, each with an `info.txt`
//! and an `imagenes/` folder.
//!
//! # Pipeline
//!
//! ```text
//! 1. Build     Catalogo/   →  catalogo.json          (filesystem → records)
//! 2. Optimize  Catalogo/   →  CatalogoOptimizado/    (mirrored WebP/JPEG tree)
//! 3. Render    catalogo.json → index.html            (static page)
//! ```
//!
//! The stages are independent. The JSON catalog is the contract between the
//! builder and whatever renders it (the bundled [`generate`] stage or an
//! external front end); the optimizer never touches the catalog.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the catalog root, parses `info.txt`, collects images, records skip reasons |
//! | [`catalog`] | Builds and atomically writes `catalogo.json`, derives the build summary |
//! | [`optimize`] | Mirrored-tree transcoding, legacy HEIC/HEIF conversion and size reports |
//! | [`imaging`] | Image backend trait, pure dimension math, per-image operations |
//! | [`generate`] | Renders `index.html` from the catalog with Maud |
//! | [`config`] | `catalog.toml` loading, merging over stock defaults, and validation |
//! | [`types`] | `ProductRecord`, the serialized catalog entry |
//! | [`naming`] | Natural (numeric-aware) ordering of file and directory names |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## Explicit Skip Reasons
//!
//! A malformed product never aborts a build. The scanner returns every
//! rejected directory with a [`scan::SkipReason`], and the build summary is
//! derived from that list instead of from log output.
//!
//! ## Deterministic Ordering
//!
//! Categories, products and images are sorted with [`naming::natural_cmp`]
//! (`2.jpg` before `10.jpg`). The catalog is identical across machines and
//! filesystems for the same tree.
//!
//! ## Strictness As Configuration
//!
//! The strict and lenient validation rules are one scanner driven by
//! [`config::Strictness`], not two code paths.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod optimize;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
