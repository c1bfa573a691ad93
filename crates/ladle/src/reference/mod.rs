//! Read-only reference repository: ingredients, forms, densities, unit
//! constants, and the meaning-carrying token allow-list.
//!
//! The snapshot is loaded once from a directory of delimited files and is
//! immutable afterwards; all indices are built at load time and queried
//! concurrently without locks.

mod density;
mod form;
mod ingredient;
pub mod normalize;
mod snapshot;
mod tokens;
pub mod units;

pub use density::Density;
pub use form::Form;
pub use ingredient::Ingredient;
pub use snapshot::ReferenceSnapshot;
pub use tokens::MeaningTokens;
