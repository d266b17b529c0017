//! HyperLogLog++: cardinality estimation with a dual dense/sparse
//! representation, wire-compatible with the ZetaSketch / BigQuery
//! `HyperLogLogPlusUniqueStateProto` envelope.
//!
//! # Algorithm overview
//!
//! A freshly constructed sketch starts in **sparse** mode: observations are
//! packed into 32-bit codes and kept in a sorted, delta-varint-encoded list
//! (`sparse`) backed by an unsorted write buffer that amortizes merge cost.
//! Once the sparse representation's estimated byte cost crosses a threshold
//! proportional to the dense register count, the sketch *normalizes* —
//! decodes every sparse entry into dense register coordinates and switches
//! to a flat `2^p`-byte array (`dense`). This transition is one-way: a
//! dense sketch never returns to sparse mode.
//!
//! Estimation uses linear counting while many registers are still zero, and
//! an alpha-normalized harmonic-mean raw estimate with an empirical bias
//! correction otherwise (`estimator`). The bit-level encoding and the
//! precision-downgrade rank math live in `bits`; `tables` holds the
//! alpha/threshold/bias lookups the estimator treats as opaque data.
//!
//! # Examples
//!
//! ```
//! use sketch_oxide::cardinality::HyperLogLogPlus;
//!
//! let mut hll = HyperLogLogPlus::new(14, 25).unwrap();
//! for i in 0u64..10_000 {
//!     hll.add(i.wrapping_mul(0x9E37_79B9_7F4A_7C15));
//! }
//! let estimate = hll.estimate();
//! assert!((estimate as f64 - 10_000.0).abs() / 10_000.0 < 0.05);
//! ```

mod bits;
mod dense;
mod envelope;
mod estimator;
mod sparse;
mod tables;
mod varint;

pub use envelope::Envelope;

use dense::DenseRepr;
use sparse::SparseRepr;

use crate::common::{validation, Result, SketchError};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Representation {
    Sparse(SparseRepr),
    Dense(DenseRepr),
}

/// A HyperLogLog++ sketch.
///
/// Owns either a sparse representation or a dense register array, never
/// both, plus the `(p, sp)` precision pair. `p` is the normal precision
/// (`10..=24`) used by the dense register array; `sp` is the sparse
/// precision (`p..=25`) used while the sketch is still in sparse mode.
///
/// Mutating an operation that needs to merge unflushed sparse entries
/// (`estimate`, `to_envelope`, `downgrade`) takes `&mut self` even in
/// sparse mode, because those operations may trigger a `Flush`. See the
/// sparse module for why this crate does not force that mutation behind an
/// immutable-estimate trait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HyperLogLogPlus {
    p: u8,
    sp: u8,
    repr: Representation,
}

impl HyperLogLogPlus {
    /// Creates an empty sketch in sparse mode.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `p` is outside `[10, 24]` or `sp` is
    /// outside `[p, 25]`.
    pub fn new(p: u8, sp: u8) -> Result<Self> {
        validation::validate_hll_plus_precisions(p, sp)?;
        Ok(Self {
            p,
            sp,
            repr: Representation::Sparse(SparseRepr::new(p, sp)),
        })
    }

    pub fn precision(&self) -> u8 {
        self.p
    }

    pub fn sparse_precision(&self) -> u8 {
        self.sp
    }

    /// True iff the sketch is currently in sparse mode.
    pub fn is_sparse(&self) -> bool {
        matches!(self.repr, Representation::Sparse(_))
    }

    /// Adds a pre-computed 64-bit hash. Never fails once the sketch exists.
    pub fn add(&mut self, hash: u64) {
        match &mut self.repr {
            Representation::Sparse(sparse) => {
                sparse.add(hash);
                if sparse.over_max() {
                    self.normalize();
                }
            }
            Representation::Dense(dense) => dense.add(hash),
        }
    }

    /// Estimated cardinality. May trigger a sparse `Flush`.
    pub fn estimate(&mut self) -> u64 {
        match &mut self.repr {
            Representation::Sparse(sparse) => sparse.estimate(),
            Representation::Dense(dense) => estimator::estimate(dense.registers(), dense.p()) as u64,
        }
    }

    /// True iff nothing has ever been added.
    pub fn is_empty(&self) -> bool {
        match &self.repr {
            Representation::Sparse(sparse) => sparse.is_empty(),
            Representation::Dense(dense) => dense.registers().iter().all(|&r| r == 0),
        }
    }

    /// Promotes a sparse sketch to dense in place. No-op if already dense.
    fn normalize(&mut self) {
        if let Representation::Sparse(sparse) = &mut self.repr {
            let mut dense = DenseRepr::new(self.p);
            sparse.iterate(|pos, rho| dense.set_if_greater(pos, rho));
            self.repr = Representation::Dense(dense);
        }
    }

    fn dense_registers(&self) -> &[u8] {
        match &self.repr {
            Representation::Dense(dense) => dense.registers(),
            Representation::Sparse(_) => {
                unreachable!("dense_registers called before normalize()")
            }
        }
    }

    /// Merges `other` into `self`. A no-op if `other` is empty. Never fails
    /// once both sketches exist: any precision mismatch is resolved by
    /// downgrading rather than erroring.
    ///
    /// Both operands are normalized to dense first (this crate does not
    /// implement keeping a sparse-on-sparse merge in sparse form — see
    /// `DESIGN.md`). If precisions differ, the side with the finer `p` is
    /// downgraded to the coarser one before the element-wise max merge.
    /// `sp` is never widened: if `other`'s `sp` is smaller, the receiver's
    /// `sp` drops to match.
    pub fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }

        self.normalize();
        let mut other = other.clone();
        other.normalize();
        let other_p = other.p;
        let other_sp = other.sp;

        match self.p.cmp(&other_p) {
            std::cmp::Ordering::Less => {
                let target_p = self.p;
                let mut registers = self.dense_registers().to_vec();
                if let Representation::Dense(dense) = &other.repr {
                    dense.downgrade_each(target_p, |pos, rho| {
                        let slot = &mut registers[pos as usize];
                        if rho > *slot {
                            *slot = rho;
                        }
                    });
                }
                self.repr = Representation::Dense(DenseRepr::from_registers(self.p, registers));
            }
            std::cmp::Ordering::Greater => {
                self.downgrade(other_p, self.sp.min(other_sp));
                self.dense_max_merge(other.dense_registers());
            }
            std::cmp::Ordering::Equal => {
                self.dense_max_merge(other.dense_registers());
            }
        }

        if other_sp < self.sp {
            self.sp = other_sp;
        }
    }

    fn dense_max_merge(&mut self, other_registers: &[u8]) {
        if let Representation::Dense(dense) = &mut self.repr {
            dense.merge_registers(other_registers);
        }
    }

    /// Lowers `p` and/or `sp`. Silently ignores any dimension that would
    /// *increase* rather than erroring — this is normal usage (e.g. a
    /// merge that only needs to touch one dimension), not a mistake.
    ///
    /// If the resulting `p` is lower than the current one, the dense
    /// register array (normalizing first if the sketch is still sparse) is
    /// rebuilt by folding each touched register through
    /// [`bits::normal_downgrade`] and taking the register-wise max. Always
    /// normalizing a sparse sketch on a `p` downgrade — rather than leaving
    /// sparse-register downgrade unimplemented, which the spec explicitly
    /// permits — keeps this one code path instead of two half-finished
    /// ones; see `DESIGN.md`.
    ///
    /// If `p` is unchanged but `sp` is lowered while the sketch is still
    /// sparse, the stored sparse codes are re-packed at the new `sp` via
    /// [`SparseRepr::downgrade_sp`] — `sp` is encoded into every sparse
    /// code's `idx_sp`/trailer layout, so just relabeling the field would
    /// leave the sketch reporting a `sp` its codes weren't actually packed
    /// at, corrupting later decodes (including by an external consumer of
    /// the exported envelope).
    pub fn downgrade(&mut self, p_new: u8, sp_new: u8) {
        let p_target = p_new.min(self.p);
        let sp_target = sp_new.min(self.sp);

        if p_target < self.p {
            self.normalize();
            if let Representation::Dense(dense) = &self.repr {
                let mut registers = vec![0u8; 1usize << p_target];
                dense.downgrade_each(p_target, |pos, rho| {
                    let slot = &mut registers[pos as usize];
                    if rho > *slot {
                        *slot = rho;
                    }
                });
                self.repr = Representation::Dense(DenseRepr::from_registers(p_target, registers));
            }
            self.p = p_target;
        } else if sp_target < self.sp {
            if let Representation::Sparse(sparse) = &mut self.repr {
                sparse.downgrade_sp(sp_target);
            }
        }
        self.sp = sp_target;
    }

    /// Renders this sketch as the named-field interchange envelope (§6).
    /// Flushes any pending sparse buffer first.
    pub fn to_envelope(&mut self) -> Envelope {
        match &mut self.repr {
            Representation::Sparse(sparse) => {
                let (bytes, len) = sparse.get_data();
                Envelope {
                    precision_or_num_buckets: self.p as i32,
                    sparse_precision_or_num_buckets: self.sp as i32,
                    sparse_size: Some(len as i32),
                    sparse_data: Some(bytes),
                    data: None,
                }
            }
            Representation::Dense(dense) => Envelope {
                precision_or_num_buckets: self.p as i32,
                sparse_precision_or_num_buckets: self.sp as i32,
                sparse_size: None,
                sparse_data: None,
                data: Some(dense.registers().to_vec()),
            },
        }
    }

    /// Reconstructs a sketch from an interchange envelope.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the envelope's precisions are out of
    /// range, or `DeserializationError` if the register array length does
    /// not match `2^p`, or if present, `sparse_data` is a malformed varint
    /// stream.
    pub fn from_envelope(envelope: Envelope) -> Result<Self> {
        let p = u8::try_from(envelope.precision_or_num_buckets).map_err(|_| {
            SketchError::InvalidParameter {
                param: "precision_or_num_buckets".to_string(),
                value: envelope.precision_or_num_buckets.to_string(),
                constraint: "must fit in u8".to_string(),
            }
        })?;
        let sp = u8::try_from(envelope.sparse_precision_or_num_buckets).map_err(|_| {
            SketchError::InvalidParameter {
                param: "sparse_precision_or_num_buckets".to_string(),
                value: envelope.sparse_precision_or_num_buckets.to_string(),
                constraint: "must fit in u8".to_string(),
            }
        })?;
        validation::validate_hll_plus_precisions(p, sp)?;

        if envelope.is_sparse() {
            let bytes = envelope.sparse_data.unwrap_or_default();
            let sparse = SparseRepr::from_bytes(p, sp, &bytes)?;
            Ok(Self {
                p,
                sp,
                repr: Representation::Sparse(sparse),
            })
        } else {
            let registers = envelope.data.unwrap_or_default();
            let expected = 1usize << p;
            if registers.len() != expected {
                return Err(SketchError::DeserializationError(format!(
                    "expected {expected} register bytes for precision {p}, got {}",
                    registers.len()
                )));
            }
            Ok(Self {
                p,
                sp,
                repr: Representation::Dense(DenseRepr::from_registers(p, registers)),
            })
        }
    }

    /// Serializes to a compact byte form used for round-tripping within
    /// this crate: `[p][sp][mode tag][payload]`. This is distinct from
    /// [`Envelope`], which mirrors the external ZetaSketch wire fields.
    pub fn to_bytes(&mut self) -> Vec<u8> {
        let mut bytes = vec![self.p, self.sp];
        match &mut self.repr {
            Representation::Sparse(sparse) => {
                bytes.push(0);
                let (data, len) = sparse.get_data();
                bytes.extend_from_slice(&(len as u32).to_le_bytes());
                bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
                bytes.extend_from_slice(&data);
            }
            Representation::Dense(dense) => {
                bytes.push(1);
                bytes.extend_from_slice(dense.registers());
            }
        }
        bytes
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns `DeserializationError` if the buffer is too short or
    /// internally inconsistent, or `InvalidParameter` if the encoded
    /// precisions are out of range.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validation::validate_min_size(bytes.len(), 3)?;
        validation::validate_byte_size(bytes.len())?;

        let p = bytes[0];
        let sp = bytes[1];
        validation::validate_hll_plus_precisions(p, sp)?;

        match bytes[2] {
            0 => {
                validation::validate_min_size(bytes.len(), 11)?;
                let logical_len =
                    u32::from_le_bytes(bytes[3..7].try_into().unwrap()) as usize;
                let byte_len = u32::from_le_bytes(bytes[7..11].try_into().unwrap()) as usize;
                let data = bytes.get(11..11 + byte_len).ok_or_else(|| {
                    SketchError::DeserializationError(
                        "sparse payload shorter than declared length".to_string(),
                    )
                })?;
                let sparse = SparseRepr::from_bytes(p, sp, data)?;
                let _ = logical_len; // carried for parity with the envelope; not re-checked here
                Ok(Self {
                    p,
                    sp,
                    repr: Representation::Sparse(sparse),
                })
            }
            1 => {
                let expected = 1usize << p;
                let registers = bytes.get(3..3 + expected).ok_or_else(|| {
                    SketchError::DeserializationError(format!(
                        "expected {expected} register bytes for precision {p}"
                    ))
                })?;
                Ok(Self {
                    p,
                    sp,
                    repr: Representation::Dense(DenseRepr::from_registers(
                        p,
                        registers.to_vec(),
                    )),
                })
            }
            tag => Err(SketchError::DeserializationError(format!(
                "unknown HyperLogLogPlus mode tag {tag}"
            ))),
        }
    }
}
