// src/primitives/compare.rs

use subtle::ConstantTimeEq;

/// Constant-time equality for equal-length inputs
///
/// Lengths are not secret, so a length mismatch returns at once.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
