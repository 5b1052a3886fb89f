//! freq-table: a single-threaded frequency table that counts byte-string
//! keys (typically adjacent word pairs) and reports them ranked by count.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small counting table whose every invariant can be checked by
//!   walking it, with growth that never recreates entries.
//! - Layers:
//!   - `digest`: the fixed 64-bit hash (XXH64, seed 0). Stateless.
//!   - `FrequencyTable`: separate chaining over a bucket array, merge on
//!     matching digest, load-factor-triggered growth, ranked dump.
//!
//! Storage
//! - Entries are owned by a `SlotMap` arena. A bucket is an intrusive
//!   singly-linked chain of arena keys with cached `head`/`tail`, so
//!   appends are O(1) and chain order is insertion order.
//! - Growth allocates a bucket array `growth_factor` times larger and
//!   relinks each entry at the tail of bucket `digest % bucket_count`.
//!   Entries are never copied or recreated; their key and count survive.
//!
//! Matching
//! - Two keys are the same key iff their digests are equal. There is no
//!   byte-wise fallback, so distinct keys with colliding digests share one
//!   entry.
//! - On a match the stored key is replaced by the newly inserted one and
//!   the count is incremented. The table therefore holds the latest key
//!   seen for each digest.
//!
//! Invariants (checked by `FrequencyTable::check_invariants`)
//! - Every entry lives in bucket `digest % bucket_count`.
//! - `unique_entries` equals the sum of chain lengths; each entry is
//!   reachable from exactly one chain.
//! - `unique_entries / bucket_count` is at or below the threshold, except
//!   right after growth steps that could not restore it, or after a growth
//!   that failed to allocate (retried on the next new entry).
//!
//! Notes and non-goals
//! - Single-threaded; no internal synchronization.
//! - No removal, no shrinking, no persistence.
//! - The hash is fixed; there is no `BuildHasher` parameter.
//! - Tie order among equal counts in a ranked dump is unspecified.

mod config;
mod digest;
mod error;
mod frequency_table;
mod frequency_table_proptest;

// Public surface
pub use config::{
    TableConfig, DEFAULT_GROWTH_FACTOR, DEFAULT_INITIAL_BUCKETS, DEFAULT_LOAD_FACTOR_THRESHOLD,
};
pub use digest::{digest, DIGEST_SEED};
pub use error::{InvariantError, TableError};
pub use frequency_table::{display_limit, Entry, FrequencyTable, Iter, TableStats};
