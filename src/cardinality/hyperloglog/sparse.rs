//! Sparse representation: a sorted, delta-varint-encoded list of sparse
//! codes plus an unsorted write buffer that amortizes the cost of keeping
//! that list merged.
//!
//! The sorted list is kept decoded in memory (`Vec<u32>` of codes) rather
//! than as a live byte buffer — [`encode_sparse`](super::bits::encode_sparse)
//! only ever produces codes this module trusts, so there is nothing to
//! re-validate between flushes. The varint-delta byte stream from §4.2 is
//! produced on demand by [`SparseRepr::get_data`] (the persisted/exported
//! form) and parsed once, validating as it goes, by
//! [`SparseRepr::from_bytes`] (the only place a `CorruptEncoding` can
//! surface). This keeps `Add`/`Flush`/`Iterate`/`Estimate` infallible, which
//! matches §7's policy that only construction and import can fail.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::bits::{decode_sparse, downgrade_sparse_code, encode_sparse, sparse_idx};
use super::varint::{self, varint_len};
use crate::common::Result;

/// Buffer is flushed (sorted, deduplicated, and merged into the sorted
/// list) once it holds this many unmerged entries. A few hundred to a few
/// thousand is typical; this amortizes merge cost without holding a large
/// transient allocation.
const BUFFER_CAP: usize = 4096;

/// Over-max threshold: 6 bits per virtual dense register, i.e. `m * 6 / 8`
/// bytes. Any constant multiple of `m` in this neighborhood is conforming;
/// this is the value the spec itself suggests.
fn over_max_bytes(p: u8) -> usize {
    (1usize << p) * 6 / 8
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseRepr {
    p: u8,
    sp: u8,
    sorted: Vec<u32>,
    buffer: Vec<u32>,
}

impl SparseRepr {
    pub fn new(p: u8, sp: u8) -> Self {
        Self {
            p,
            sp,
            sorted: Vec::new(),
            buffer: Vec::new(),
        }
    }

    pub fn add(&mut self, hash: u64) {
        self.buffer.push(encode_sparse(hash, self.p, self.sp));
        if self.buffer.len() >= BUFFER_CAP {
            self.flush();
        }
    }

    /// Sorts and deduplicates the buffer against the existing sorted list,
    /// keeping for each `idx_sp` the entry with the largest implied
    /// `rhoW_p` (ties broken by the larger raw code). The buffer becomes
    /// empty.
    pub fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let (p, sp) = (self.p, self.sp);
        let incoming = std::mem::take(&mut self.buffer);

        let mut merged: BTreeMap<u32, u32> = BTreeMap::new();
        for &code in &self.sorted {
            insert_best(&mut merged, code, p, sp);
        }
        for code in incoming {
            insert_best(&mut merged, code, p, sp);
        }
        self.sorted = merged.into_values().collect();
    }

    /// Flushes, then delivers each entry's `(idx_p, rhoW_p)` in ascending
    /// `idx_sp` order. No allocation happens per decoded entry.
    pub fn iterate(&mut self, mut f: impl FnMut(u32, u8)) {
        self.flush();
        for &code in &self.sorted {
            let (idx_p, rho_p) = decode_sparse(code, self.p, self.sp);
            f(idx_p, rho_p);
        }
    }

    /// Linear-counting estimate at the sparse precision.
    pub fn estimate(&mut self) -> u64 {
        self.flush();
        let m_sp = (1u64 << self.sp) as f64;
        let k = self.sorted.len() as f64;
        if k + 0.5 >= m_sp {
            // Sparse mode would have promoted to dense well before this
            // point (OverMax fires long before k approaches m_sp); this is
            // the unreachable corner the spec allows handling by falling
            // back to the pre-rounded bound instead of dividing by zero.
            return m_sp.round() as u64;
        }
        (m_sp * (m_sp / (m_sp - k)).ln()).round() as u64
    }

    /// True iff the combined byte cost of the sorted list plus the
    /// unflushed buffer exceeds the §3 threshold. Computed without
    /// flushing: the sorted list's cost sums each entry's delta-varint
    /// length directly (no allocation), and unflushed buffer entries are
    /// costed as absolute varints of their raw code — a conservative
    /// (never an under-estimate) stand-in for their eventual delta cost.
    pub fn over_max(&self) -> bool {
        let mut prev = 0u32;
        let mut list_cost = 0usize;
        for &code in &self.sorted {
            list_cost += varint_len(code.wrapping_sub(prev));
            prev = code;
        }
        let buffer_cost: usize = self.buffer.iter().map(|&c| varint_len(c)).sum();
        list_cost + buffer_cost > over_max_bytes(self.p)
    }

    /// Flushes, then returns the varint-delta byte stream and the logical
    /// entry count it represents.
    pub fn get_data(&mut self) -> (Vec<u8>, usize) {
        self.flush();
        let mut bytes = Vec::with_capacity(self.sorted.len() * 2);
        varint::write_deltas(&mut bytes, self.sorted.iter().copied());
        (bytes, self.sorted.len())
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty() && self.buffer.is_empty()
    }

    /// Lowers `sp` in place, re-packing every stored code so it decodes
    /// correctly under the narrower sparse precision.
    ///
    /// A code's `idx_sp` (and therefore whether it needs an explicit rank
    /// trailer) depends on `sp`: simply relabeling `self.sp` while leaving
    /// the codes themselves unchanged would desynchronize every future
    /// `encode_sparse`/`decode_sparse` call from what is actually stored. No
    /// effect if `new_sp >= self.sp`. Flushes first, then re-derives each
    /// code via [`downgrade_sparse_code`], deduplicating collisions the same
    /// way `flush` does (codes that previously had distinct `idx_sp` values
    /// can collapse onto the same narrower index).
    pub fn downgrade_sp(&mut self, new_sp: u8) {
        if new_sp >= self.sp {
            return;
        }
        self.flush();
        let (p, old_sp) = (self.p, self.sp);

        let mut merged: BTreeMap<u32, u32> = BTreeMap::new();
        for &code in &self.sorted {
            let downgraded = downgrade_sparse_code(code, p, old_sp, new_sp);
            insert_best(&mut merged, downgraded, p, new_sp);
        }
        self.sorted = merged.into_values().collect();
        self.sp = new_sp;
    }

    /// Parses a previously-exported varint-delta stream. The only point at
    /// which a malformed sparse stream surfaces `CorruptEncoding`.
    pub fn from_bytes(p: u8, sp: u8, bytes: &[u8]) -> Result<Self> {
        let sorted = varint::decode_deltas(bytes)?;
        Ok(Self {
            p,
            sp,
            sorted,
            buffer: Vec::new(),
        })
    }
}

fn insert_best(map: &mut BTreeMap<u32, u32>, code: u32, p: u8, sp: u8) {
    let idx = sparse_idx(code, sp);
    match map.entry(idx) {
        Entry::Vacant(entry) => {
            entry.insert(code);
        }
        Entry::Occupied(mut entry) => {
            let (_, existing_rho) = decode_sparse(*entry.get(), p, sp);
            let (_, new_rho) = decode_sparse(code, p, sp);
            if new_rho > existing_rho || (new_rho == existing_rho && code > *entry.get()) {
                entry.insert(code);
            }
        }
    }
}
