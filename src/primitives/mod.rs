// src/primitives/mod.rs
//! Pure cryptographic primitives: no storage, no logging
//!
//! Thin adapters over the RustCrypto and BLAKE3 crates. Commands call these
//! only after all input validation has passed.

mod cipher;
mod compare;
mod digest;

pub use cipher::{open, random_iv, seal, Sealed};
pub use compare::constant_time_eq;
pub use digest::{digest, keyed_digest};

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{CryptoError, OperationResult};

/// Run a primitive, turning a panic into `OperationFailed`
///
/// Only the operation name and algorithm travel with the error.
pub(crate) fn guarded<T>(
    operation: &str,
    algorithm: impl std::fmt::Display,
    f: impl FnOnce() -> OperationResult<T>,
) -> OperationResult<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => Err(CryptoError::operation_failed(
            operation,
            algorithm,
            "primitive aborted unexpectedly",
        )),
    }
}
