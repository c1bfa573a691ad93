//! Record types flowing through the pipeline.
//!
//! Each stage reads the accumulating [`CanonicalRecord`] and contributes its
//! own closed block of fields; no stage rewrites a field written by an
//! earlier one. Enum-valued fields serialize to the exact strings of the
//! external contract.

mod canonical;
mod enums;
mod row;

pub use canonical::{CanonicalRecord, LinkCandidate};
pub use enums::{
    BridgeRequirement, BridgeSelectionPath, BridgeWarning, CanonicalUnit, ConversionPath,
    Dimension, FormSource, FormWarning, LinkMethod, LinkReason, PackageSizeUnit, PackageWarning,
    PackedState, QtyPrecision, QtyWarning, RejectCode, SiUnit, TargetDimension, UnitEnum,
};
pub use row::{CleanRow, RawRow};
