// ==========================================
// tabload - domain layer
// ==========================================
// Column-level type declarations and the per-dataset specification.
// ==========================================

pub mod dimension;
pub mod spec;

pub use dimension::{Dimension, DimensionType, Value};
pub use spec::{DataSpecification, DataSpecificationBuilder, DuplicateKeyAction};
