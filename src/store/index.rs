//! Fixed-capacity open-addressing table with double hashing.
//!
//! Slots are keyed by `(key, owner)` but the probe sequence is derived
//! from `key` alone, so the same application name stored by two owners
//! walks the same chain.
//!
//! Probe position `i` for a key is `(h1 + i * h2) mod N` for
//! `i = 0..N`, where `h1` is the byte sum mod `N` and `h2` is the
//! `byte * 31` sum forced into `[1, N-1]` and then bumped until it is
//! coprime with `N`.  Because the stride is coprime with the capacity,
//! every probe sequence is a permutation of all `N` slots: a lookup
//! visits each slot at most once, and `insert` reports
//! `CapacityExhausted` exactly when no slot is free.
//!
//! Removal leaves a tombstone so chains that ran through the removed
//! slot stay intact.  Tombstones are reused by `insert` and cleared by
//! `compact`, which runs automatically once they exceed a quarter of
//! the table.

use crate::errors::{CredVaultError, Result};

/// Capacity used when the configuration does not override it.
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest table `HashIndex::new` will allocate.
pub const MAX_CAPACITY: usize = 1 << 20;

/// Compaction kicks in once `tombstones * COMPACT_DIVISOR > capacity`.
const COMPACT_DIVISOR: usize = 4;

/// Multiplier for the secondary hash.
const STEP_MULTIPLIER: usize = 31;

/// One stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Application name or username.
    pub key: String,
    /// Stored secret or account password.
    pub value: String,
    /// Authenticated username for secrets, `""` for accounts.
    pub owner: String,
}

impl Record {
    pub fn new(key: &str, value: &str, owner: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            owner: owner.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Empty,
    Tombstone,
    Occupied(Record),
}

/// Open-addressing table of `Record`s.
#[derive(Debug, Clone)]
pub struct HashIndex {
    slots: Vec<Slot>,
    live: usize,
    tombstones: usize,
}

impl HashIndex {
    /// Create an empty table with `capacity` slots.
    ///
    /// The capacity is fixed for the life of the table and must lie in
    /// `2..=MAX_CAPACITY`; below 2 there is no non-zero stride.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(CredVaultError::ConfigError(format!(
                "table capacity must be at least 2, got {capacity}"
            )));
        }
        if capacity > MAX_CAPACITY {
            return Err(CredVaultError::ConfigError(format!(
                "table capacity must be at most {MAX_CAPACITY}, got {capacity}"
            )));
        }
        Ok(Self {
            slots: vec![Slot::Empty; capacity],
            live: 0,
            tombstones: 0,
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Store a record in the first free slot along its probe sequence.
    ///
    /// No check is made for an existing `(key, owner)` pair: inserting
    /// twice leaves two entries, and lookups return whichever sits
    /// earlier on the probe sequence (the older one, unless a removal
    /// in between freed an earlier slot).  Callers wanting upsert
    /// semantics remove first.
    ///
    /// Returns the slot index written.
    pub fn insert(&mut self, key: &str, value: &str, owner: &str) -> Result<usize> {
        if self.tombstones > 0 && self.tombstones * COMPACT_DIVISOR > self.capacity() {
            self.compact()?;
        }
        self.place(Record::new(key, value, owner))
    }

    /// Remove the first entry matching `(key, owner)` along the probe
    /// sequence, leaving a tombstone.  Returns the removed record.
    pub fn remove(&mut self, key: &str, owner: &str) -> Option<Record> {
        let pos = self.find(key, owner)?;
        self.take_slot(pos)
    }

    /// Remove every record matching `pred`, scanning the whole table.
    ///
    /// This is the only way to act on records by owner: since owner is
    /// not part of the hash, there is no chain to follow.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<Record>
    where
        F: FnMut(&Record) -> bool,
    {
        let matching: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| match slot {
                Slot::Occupied(record) if pred(record) => Some(pos),
                _ => None,
            })
            .collect();

        matching
            .into_iter()
            .filter_map(|pos| self.take_slot(pos))
            .collect()
    }

    /// Rebuild the slot array without tombstones.
    ///
    /// Records are re-placed in probe-rank order, which keeps the
    /// relative lookup order of duplicate `(key, owner)` entries.
    pub fn compact(&mut self) -> Result<()> {
        let ordered: Vec<Record> = self
            .records_in_probe_order()
            .into_iter()
            .cloned()
            .collect();

        self.slots.fill(Slot::Empty);
        self.live = 0;
        self.tombstones = 0;

        for record in ordered {
            self.place(record)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Return the value for `(key, owner)`, if present.
    pub fn get(&self, key: &str, owner: &str) -> Option<&str> {
        let pos = self.find(key, owner)?;
        match &self.slots[pos] {
            Slot::Occupied(record) => Some(record.value.as_str()),
            _ => None,
        }
    }

    /// Returns `true` if an entry for `(key, owner)` exists.
    pub fn contains(&self, key: &str, owner: &str) -> bool {
        self.find(key, owner).is_some()
    }

    /// Iterate over live records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            _ => None,
        })
    }

    /// Live records ordered by their position along their own probe
    /// sequence (ties broken by slot index).
    ///
    /// Re-inserting records in this order into an empty table
    /// reproduces the lookup order of duplicates, so both compaction
    /// and persistence use it.
    pub fn records_in_probe_order(&self) -> Vec<&Record> {
        let capacity = self.capacity();
        let mut ranked: Vec<(usize, usize, &Record)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| match slot {
                Slot::Occupied(record) => {
                    Some((probe_rank(&record.key, pos, capacity), pos, record))
                }
                _ => None,
            })
            .collect();

        ranked.sort_by_key(|&(rank, pos, _)| (rank, pos));
        ranked.into_iter().map(|(_, _, record)| record).collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of tombstoned slots awaiting compaction.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Fraction of slots that are not `Empty`.  Tombstones count as
    /// used until compaction clears them.
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        (self.live + self.tombstones) as f64 / self.capacity() as f64
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn find(&self, key: &str, owner: &str) -> Option<usize> {
        for pos in probe_sequence(key, self.capacity()) {
            match &self.slots[pos] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(record) if record.key == key && record.owner == owner => {
                    return Some(pos);
                }
                Slot::Occupied(_) => {}
            }
        }
        None
    }

    fn place(&mut self, record: Record) -> Result<usize> {
        let capacity = self.capacity();
        let free = probe_sequence(&record.key, capacity)
            .find(|&pos| !matches!(self.slots[pos], Slot::Occupied(_)));

        let Some(pos) = free else {
            return Err(CredVaultError::CapacityExhausted { capacity });
        };

        if self.slots[pos] == Slot::Tombstone {
            self.tombstones -= 1;
        }
        self.slots[pos] = Slot::Occupied(record);
        self.live += 1;
        Ok(pos)
    }

    fn take_slot(&mut self, pos: usize) -> Option<Record> {
        match std::mem::replace(&mut self.slots[pos], Slot::Tombstone) {
            Slot::Occupied(record) => {
                self.live -= 1;
                self.tombstones += 1;
                Some(record)
            }
            other => {
                self.slots[pos] = other;
                None
            }
        }
    }
}

/// Primary hash: sum of the key's bytes, mod `capacity`.
pub fn primary_hash(key: &str, capacity: usize) -> usize {
    key.bytes()
        .fold(0usize, |acc, b| acc.wrapping_add(usize::from(b)))
        % capacity
}

/// Secondary hash: the probe stride, always in `[1, capacity - 1]` and
/// coprime with `capacity`.
pub fn step_hash(key: &str, capacity: usize) -> usize {
    let sum = key.bytes().fold(0usize, |acc, b| {
        acc.wrapping_add(usize::from(b).wrapping_mul(STEP_MULTIPLIER))
    });
    let span = capacity - 1;
    let mut step = sum % span + 1;
    // 1 is coprime with everything, so this always terminates.
    while gcd(step, capacity) != 1 {
        step = step % span + 1;
    }
    step
}

/// The `capacity` slot indices visited for `key`, in order.
pub fn probe_sequence(key: &str, capacity: usize) -> impl Iterator<Item = usize> {
    let start = primary_hash(key, capacity);
    let step = step_hash(key, capacity);
    (0..capacity).map(move |i| (start + i * step) % capacity)
}

fn probe_rank(key: &str, pos: usize, capacity: usize) -> usize {
    probe_sequence(key, capacity)
        .position(|p| p == pos)
        .unwrap_or(capacity)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
