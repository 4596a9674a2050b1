//! Validates that an on-disk artifact package matches its manifest
//! byte-for-byte: top-level layout, traversal-safe enumeration, and a
//! full size/hash cross-check against every referenced file.

pub mod enumerate;
pub mod errors;
pub mod validate;

pub use errors::PackageError;
pub use validate::validate_package;
