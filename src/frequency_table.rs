//! FrequencyTable: separate-chaining counter over byte-string keys.
//!
//! Entries live in a `SlotMap` arena and never move once inserted. Each
//! bucket is an intrusive singly-linked chain of arena keys (`head`, `tail`,
//! per-entry `next`), so growth only relinks keys into a fresh bucket array.

use crate::config::TableConfig;
use crate::digest::{bucket_index, digest};
use crate::error::{InvariantError, TableError};
use core::fmt;
use slotmap::{DefaultKey, SlotMap};
use std::collections::HashSet;

/// One distinct digest seen by the table, with the latest key that produced it.
#[derive(Debug)]
pub struct Entry {
    key: Box<[u8]>,
    count: u64,
    digest: u64,
    next: Option<DefaultKey>,
}

impl Entry {
    /// The most recently inserted key with this entry's digest.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The key as UTF-8, if it is valid UTF-8.
    pub fn key_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.key).ok()
    }

    /// Number of inserts that matched this entry, including the first.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// XXH64 digest of the key; fixed at first insertion.
    pub fn digest(&self) -> u64 {
        self.digest
    }
}

/// `count` right-aligned to width 10, a space, then the key (lossy UTF-8).
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10} {}", self.count, String::from_utf8_lossy(&self.key))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Chain {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    len: usize,
}

/// Point-in-time shape of a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStats {
    pub bucket_count: usize,
    pub unique_entries: usize,
    pub total_insertions: u64,
    pub load_factor: f64,
    pub longest_chain: usize,
    pub empty_buckets: usize,
}

#[derive(Debug)]
pub struct FrequencyTable {
    config: TableConfig,
    buckets: Vec<Chain>,
    entries: SlotMap<DefaultKey, Entry>,
    total_insertions: u64,
    // Set when the last growth attempt failed to allocate; the load factor
    // may exceed the threshold until a later growth succeeds.
    growth_pending: bool,
}

/// Map the external display-limit convention onto `ranked_dump`'s limit:
/// any negative value means "no limit".
pub fn display_limit(raw: i64) -> Option<usize> {
    usize::try_from(raw).ok()
}

fn alloc_buckets(n: usize) -> Result<Vec<Chain>, TableError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(n)
        .map_err(|_| TableError::OutOfMemory { buckets: n })?;
    buckets.resize(n, Chain::default());
    Ok(buckets)
}

// Append `k` at the tail of `chain`. `k` becomes the last link.
fn link_tail(entries: &mut SlotMap<DefaultKey, Entry>, chain: &mut Chain, k: DefaultKey) {
    if let Some(e) = entries.get_mut(k) {
        e.next = None;
    }
    match chain.tail {
        Some(t) => {
            if let Some(tail) = entries.get_mut(t) {
                tail.next = Some(k);
            }
        }
        None => chain.head = Some(k),
    }
    chain.tail = Some(k);
    chain.len += 1;
}

impl FrequencyTable {
    /// Create a table with `initial_bucket_count` buckets and the default
    /// load factor threshold and growth factor.
    pub fn new(initial_bucket_count: usize) -> Result<Self, TableError> {
        let config = TableConfig::default().with_initial_bucket_count(initial_bucket_count);
        Self::with_config(config)
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        config.validate()?;
        let buckets = alloc_buckets(config.initial_bucket_count)?;
        tracing::debug!(
            buckets = config.initial_bucket_count,
            threshold = config.load_factor_threshold,
            growth_factor = config.growth_factor,
            "created frequency table"
        );
        Ok(Self {
            config,
            buckets,
            entries: SlotMap::with_key(),
            total_insertions: 0,
            growth_pending: false,
        })
    }

    /// Parameters the table was built with.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Current number of buckets; only ever grows.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Every insert call so far, merges included.
    pub fn total_insertions(&self) -> u64 {
        self.total_insertions
    }

    /// Number of distinct digests stored.
    pub fn unique_entries(&self) -> usize {
        self.entries.len()
    }

    /// Same as [`unique_entries`](Self::unique_entries).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `unique_entries / bucket_count`.
    pub fn load_factor(&self) -> f64 {
        self.entries.len() as f64 / self.buckets.len() as f64
    }

    /// Count one occurrence of `key`.
    ///
    /// Keys match purely by digest. On a match the stored key is replaced by
    /// `key` and the count bumped; otherwise a new entry is appended to its
    /// bucket's chain, possibly triggering growth.
    ///
    /// Fails only if growth cannot allocate the larger bucket array. The
    /// occurrence is still recorded and the table stays consistent at its
    /// previous bucket count.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>) -> Result<(), TableError> {
        let key = key.into();
        let d = digest(&key);
        self.insert_with_digest(key.into_boxed_slice(), d)
    }

    pub(crate) fn insert_with_digest(
        &mut self,
        key: Box<[u8]>,
        digest: u64,
    ) -> Result<(), TableError> {
        let idx = bucket_index(digest, self.buckets.len());
        self.total_insertions += 1;

        if let Some(e) = self
            .find_in_chain(idx, digest)
            .and_then(|k| self.entries.get_mut(k))
        {
            e.key = key;
            e.count += 1;
            return Ok(());
        }

        let k = self.entries.insert(Entry {
            key,
            count: 1,
            digest,
            next: None,
        });
        link_tail(&mut self.entries, &mut self.buckets[idx], k);
        tracing::trace!(digest, bucket = idx, unique = self.entries.len(), "new entry");

        if self.load_factor() > self.config.load_factor_threshold {
            if let Err(e) = self.grow() {
                self.growth_pending = true;
                tracing::warn!(buckets = self.buckets.len(), error = %e, "growth failed");
                return Err(e);
            }
        }
        Ok(())
    }

    fn find_in_chain(&self, idx: usize, digest: u64) -> Option<DefaultKey> {
        let mut cur = self.buckets.get(idx)?.head;
        while let Some(k) = cur {
            let e = self.entries.get(k)?;
            if e.digest == digest {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    // Relink every entry into a bucket array `growth_factor` times larger.
    // Entries stay put in the arena; only chain links change.
    fn grow(&mut self) -> Result<(), TableError> {
        let old_count = self.buckets.len();
        let new_count = old_count
            .checked_mul(self.config.growth_factor)
            .ok_or(TableError::OutOfMemory { buckets: usize::MAX })?;
        let mut fresh = alloc_buckets(new_count)?;

        for chain in &self.buckets {
            let mut cur = chain.head;
            while let Some(k) = cur {
                // Chain keys are always live in the arena.
                let e = &self.entries[k];
                let (d, next) = (e.digest, e.next);
                link_tail(&mut self.entries, &mut fresh[bucket_index(d, new_count)], k);
                cur = next;
            }
        }
        self.buckets = fresh;
        self.growth_pending = false;

        tracing::debug!(
            old_buckets = old_count,
            new_buckets = new_count,
            unique = self.entries.len(),
            load_factor = self.load_factor(),
            "grew frequency table"
        );
        Ok(())
    }

    /// Look up the entry whose digest equals `key`'s digest.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Entry> {
        let d = digest(key.as_ref());
        let k = self.find_in_chain(bucket_index(d, self.buckets.len()), d)?;
        self.entries.get(k)
    }

    /// Entries in bucket-index order, chain order within each bucket.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            bucket: 0,
            cur: None,
            remaining: self.entries.len(),
        }
    }

    /// All entries ordered by descending count, truncated to `limit`
    /// (`None`, or a limit above `unique_entries`, returns everything).
    ///
    /// Order among equal counts is unspecified.
    pub fn ranked_dump(&self, limit: Option<usize>) -> Vec<&Entry> {
        let mut ranked: Vec<&Entry> = self.iter().collect();
        ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count));
        let n = limit.map_or(ranked.len(), |l| l.min(ranked.len()));
        ranked.truncate(n);
        ranked
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            bucket_count: self.buckets.len(),
            unique_entries: self.entries.len(),
            total_insertions: self.total_insertions,
            load_factor: self.load_factor(),
            longest_chain: self.buckets.iter().map(|c| c.len).max().unwrap_or(0),
            empty_buckets: self.buckets.iter().filter(|c| c.len == 0).count(),
        }
    }

    /// Walk every chain and verify the structural invariants: each entry
    /// sits in bucket `digest % bucket_count`, chain bookkeeping matches the
    /// links, every stored entry is reachable exactly once, digests are
    /// unique across the table, and the load factor is within the threshold
    /// unless the growth sequence from the initial size could not restore it.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let n = self.buckets.len();
        let mut reached = 0usize;
        let mut digests = HashSet::with_capacity(self.entries.len());

        for (idx, chain) in self.buckets.iter().enumerate() {
            let mut cur = chain.head;
            let mut last = None;
            let mut len = 0usize;
            while let Some(k) = cur {
                let e = self.entries.get(k).ok_or_else(|| {
                    InvariantError::new(format!("bucket {idx} links to a missing entry"))
                })?;
                if bucket_index(e.digest, n) != idx {
                    return Err(InvariantError::new(format!(
                        "digest {:#x} found in bucket {idx}, expected {}",
                        e.digest,
                        bucket_index(e.digest, n)
                    )));
                }
                if !digests.insert(e.digest) {
                    return Err(InvariantError::new(format!(
                        "digest {:#x} stored twice",
                        e.digest
                    )));
                }
                len += 1;
                if len > self.entries.len() {
                    return Err(InvariantError::new(format!("cycle in bucket {idx}")));
                }
                last = Some(k);
                cur = e.next;
            }
            if last != chain.tail {
                return Err(InvariantError::new(format!("stale tail in bucket {idx}")));
            }
            if len != chain.len {
                return Err(InvariantError::new(format!(
                    "bucket {idx} records {} links, walked {len}",
                    chain.len
                )));
            }
            reached += len;
        }

        if reached != self.entries.len() {
            return Err(InvariantError::new(format!(
                "chains hold {reached} entries, arena holds {}",
                self.entries.len()
            )));
        }

        if !self.growth_pending && !self.load_bound_reachable() {
            return Err(InvariantError::new(format!(
                "load factor {} exceeds threshold {} at {} buckets",
                self.load_factor(),
                self.config.load_factor_threshold,
                n
            )));
        }
        Ok(())
    }

    // A load factor over the threshold is only legitimate right after growth
    // steps that each fired on a new entry yet could not bring it back down:
    // walk back one entry and one growth step at a time until the bound holds
    // or the initial size is reached.
    fn load_bound_reachable(&self) -> bool {
        let TableConfig {
            initial_bucket_count: initial,
            load_factor_threshold: threshold,
            growth_factor: factor,
        } = self.config;
        let (mut unique, mut buckets) = (self.entries.len(), self.buckets.len());
        loop {
            if unique as f64 / buckets as f64 <= threshold {
                return true;
            }
            if buckets <= initial || buckets % factor != 0 || unique == 0 {
                return false;
            }
            unique -= 1;
            buckets /= factor;
        }
    }

    /// Consume the table, releasing every entry, key and the bucket array.
    pub fn destroy(self) {}
}

/// Iterator over entries in bucket order. See [`FrequencyTable::iter`].
pub struct Iter<'a> {
    table: &'a FrequencyTable,
    bucket: usize,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let e = self.table.entries.get(k)?;
                self.cur = e.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(e);
            }
            let chain = self.table.buckets.get(self.bucket)?;
            self.cur = chain.head;
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a FrequencyTable {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
