//! Validation utilities for sketch deserialization and parameter bounds checking

use crate::common::{Result, SketchError};

/// Maximum serialized sketch size (256MB) to prevent resource exhaustion
pub const MAX_BYTE_SIZE: usize = 256 * 1024 * 1024; // 256MB

/// Validate that a deserialized byte size doesn't exceed safety limits
pub fn validate_byte_size(size: usize) -> Result<()> {
    if size > MAX_BYTE_SIZE {
        return Err(SketchError::DeserializationError(format!(
            "Deserialized sketch size {} exceeds maximum allowed size {}",
            size, MAX_BYTE_SIZE
        )));
    }
    Ok(())
}

/// Validate minimum required bytes for deserialization header
pub fn validate_min_size(actual: usize, required: usize) -> Result<()> {
    if actual < required {
        return Err(SketchError::DeserializationError(format!(
            "Insufficient data: need at least {} bytes, got {}",
            required, actual
        )));
    }
    Ok(())
}

/// Validate the `(p, sp)` precision pair used by the HyperLogLog++ sketch:
/// `p` in `[10, 24]`, `sp` in `[p, 25]`.
pub fn validate_hll_plus_precisions(p: u8, sp: u8) -> Result<()> {
    if !(10..=24).contains(&p) {
        return Err(SketchError::InvalidParameter {
            param: "p".to_string(),
            value: p.to_string(),
            constraint: "must be in range [10, 24]".to_string(),
        });
    }
    if !(p..=25).contains(&sp) {
        return Err(SketchError::InvalidParameter {
            param: "sp".to_string(),
            value: sp.to_string(),
            constraint: format!("must be in range [{p}, 25]"),
        });
    }
    Ok(())
}
