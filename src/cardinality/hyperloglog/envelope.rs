//! The interchange envelope: a plain struct carrying the named fields of
//! the ZetaSketch / BigQuery `HyperLogLogPlusUniqueStateProto` message.
//!
//! Actual protobuf byte (de)serialization is out of scope for this crate
//! (spec §1 treats the wire codec as an external collaborator) — callers
//! that need real protobuf bytes plug their own codec in front of this
//! struct, the same way the rest of this crate takes a pre-computed hash
//! rather than owning a hash function.

/// Named fields of the HLL++ interchange message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// `p`: always present.
    pub precision_or_num_buckets: i32,
    /// `sp`: always present.
    pub sparse_precision_or_num_buckets: i32,
    /// Logical element count of the sparse list; present iff sparse mode.
    pub sparse_size: Option<i32>,
    /// Varint-delta sparse stream; present iff sparse mode.
    pub sparse_data: Option<Vec<u8>>,
    /// Raw register array of length `2^p`; present iff dense mode.
    pub data: Option<Vec<u8>>,
}

impl Envelope {
    /// An envelope selects sparse mode iff `sparse_data` is present at all,
    /// per §6's "present iff sparse mode" — field presence, not byte length.
    /// A freshly constructed sparse sketch with zero entries still has
    /// `sparse_data: Some(vec![])`, and must still round-trip as sparse: a
    /// length-based check would route it through the dense branch instead,
    /// where `data` is absent against an expected `2^p` bytes, breaking the
    /// empty-sketch round trip (spec §8 invariant 6 / scenario S7).
    pub fn is_sparse(&self) -> bool {
        self.sparse_data.is_some()
    }
}
