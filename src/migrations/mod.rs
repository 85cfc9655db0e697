//! Concrete migration definitions, one module per target version.
pub mod v0_8_0;
