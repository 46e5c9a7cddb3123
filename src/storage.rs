//! Persistence for catalogs and plans.
//!
//! Records are single text lines in a length-prefixed wire format (see
//! [`codec`]); the [`Directory`] reads and writes them under a data root.

pub mod catalog;
pub mod codec;
mod directory;
pub mod plan;

pub use catalog::CatalogLoad;
pub use codec::CodecError;
pub use directory::{Directory, LoadError};
pub use plan::PlanLoad;
