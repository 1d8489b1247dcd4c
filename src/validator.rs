// Copyright (c) 2026 Meridian Foundation

//! Validator statistics.
//!
//! Two views of the same per-turn outcomes: lifetime monotonic counters, and
//! bounded sorted sets of recent block numbers that support windowed queries
//! ("how many turns did this validator miss in the last N blocks").

use std::collections::BTreeSet;

use crate::codec::{DecodeError, Decoder, Encoder};
use crate::config::BLOCKS_PER_DAY;

/// How far back the recent-stats sets reach. Entries older than this relative
/// to the newest insertion are pruned eagerly.
pub const VALIDATOR_STATS_MAX_HISTORY_BLOCKS: u64 = BLOCKS_PER_DAY * 30;

/// Per-turn outcome being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKind {
    /// The validator produced a block.
    Forged,
    /// The expected primary validator produced its block.
    Hit,
    /// The expected primary validator failed to produce its block.
    Missed,
}

/// Lifetime counters, monotonically non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidatorStats {
    pub blocks_forged: u64,
    pub turns_hit: u64,
    pub turns_missed: u64,
}

impl ValidatorStats {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::with_capacity(24);
        enc.write_u64(self.blocks_forged);
        enc.write_u64(self.turns_hit);
        enc.write_u64(self.turns_missed);
        enc.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        Ok(Self {
            blocks_forged: dec.read_u64()?,
            turns_hit: dec.read_u64()?,
            turns_missed: dec.read_u64()?,
        })
    }
}

/// Sliding-window per-turn history: three sorted sets of block numbers,
/// pruned on every insert to the configured window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentValidatorStats {
    forged: BTreeSet<u64>,
    hit: BTreeSet<u64>,
    missed: BTreeSet<u64>,
}

fn prune(set: &mut BTreeSet<u64>, newest: u64) {
    // the set is sorted, so everything below the cutoff sits at the front
    let cutoff = newest.saturating_sub(VALIDATOR_STATS_MAX_HISTORY_BLOCKS);
    *set = set.split_off(&cutoff);
}

fn count_from(set: &BTreeSet<u64>, oldest: u64) -> u64 {
    set.range(oldest..).count() as u64
}

impl RecentValidatorStats {
    pub fn record(&mut self, kind: StatsKind, block_number: u64) {
        let set = match kind {
            StatsKind::Forged => &mut self.forged,
            StatsKind::Hit => &mut self.hit,
            StatsKind::Missed => &mut self.missed,
        };
        set.insert(block_number);
        prune(set, block_number);
    }

    /// Entries recorded at or after `current_block - period`, independent of
    /// the persisted pruning window.
    pub fn recent_blocks_forged(&self, current_block: u64, period: u64) -> u64 {
        count_from(&self.forged, current_block.saturating_sub(period))
    }

    pub fn recent_turns_hit(&self, current_block: u64, period: u64) -> u64 {
        count_from(&self.hit, current_block.saturating_sub(period))
    }

    pub fn recent_turns_missed(&self, current_block: u64, period: u64) -> u64 {
        count_from(&self.missed, current_block.saturating_sub(period))
    }

    /// The window size is embedded first so that a change of
    /// `VALIDATOR_STATS_MAX_HISTORY_BLOCKS` invalidates persisted records
    /// instead of misinterpreting them.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_u64(VALIDATOR_STATS_MAX_HISTORY_BLOCKS);
        enc.write_u64_set(&self.forged);
        enc.write_u64_set(&self.hit);
        enc.write_u64_set(&self.missed);
        enc.into_bytes()
    }

    /// A record written under a different window size decodes as empty,
    /// forcing recomputation from that point forward.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut dec = Decoder::new(bytes);
        let window = dec.read_u64()?;
        if window != VALIDATOR_STATS_MAX_HISTORY_BLOCKS {
            return Ok(Self::default());
        }
        Ok(Self {
            forged: dec.read_u64_set()?,
            hit: dec.read_u64_set()?,
            missed: dec.read_u64_set()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_stats_roundtrip() {
        let stats = ValidatorStats {
            blocks_forged: 10,
            turns_hit: 8,
            turns_missed: 2,
        };
        assert_eq!(ValidatorStats::from_bytes(&stats.to_bytes()).unwrap(), stats);
    }

    #[test]
    fn test_windowed_count() {
        let mut stats = RecentValidatorStats::default();
        for n in (0..100).step_by(10) {
            stats.record(StatsKind::Forged, n);
        }
        // entries 50, 60, 70, 80, 90
        assert_eq!(stats.recent_blocks_forged(100, 50), 5);
        // all ten entries
        assert_eq!(stats.recent_blocks_forged(100, 1000), 10);
        assert_eq!(stats.recent_turns_hit(100, 50), 0);
    }

    #[test]
    fn test_insert_prunes_entries_outside_window() {
        let mut stats = RecentValidatorStats::default();
        stats.record(StatsKind::Hit, 5);
        stats.record(StatsKind::Hit, VALIDATOR_STATS_MAX_HISTORY_BLOCKS + 100);

        // block 5 is more than the window below the newest insertion
        assert_eq!(stats.recent_turns_hit(u64::MAX, u64::MAX), 1);

        let decoded = RecentValidatorStats::from_bytes(&stats.to_bytes()).unwrap();
        assert_eq!(decoded, stats);
    }

    #[test]
    fn test_entry_at_window_boundary_is_kept() {
        let mut stats = RecentValidatorStats::default();
        stats.record(StatsKind::Missed, 100);
        stats.record(StatsKind::Missed, 100 + VALIDATOR_STATS_MAX_HISTORY_BLOCKS);
        assert_eq!(stats.recent_turns_missed(u64::MAX, u64::MAX), 2);
    }

    #[test]
    fn test_window_size_mismatch_decodes_as_empty() {
        let mut stats = RecentValidatorStats::default();
        stats.record(StatsKind::Forged, 42);
        let mut bytes = stats.to_bytes();

        // overwrite the embedded window tag
        bytes[..8].copy_from_slice(&999u64.to_be_bytes());
        let decoded = RecentValidatorStats::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, RecentValidatorStats::default());
    }

    #[test]
    fn test_recent_sets_roundtrip() {
        let mut stats = RecentValidatorStats::default();
        stats.record(StatsKind::Forged, 1);
        stats.record(StatsKind::Hit, 2);
        stats.record(StatsKind::Missed, 3);
        stats.record(StatsKind::Missed, 4);

        let decoded = RecentValidatorStats::from_bytes(&stats.to_bytes()).unwrap();
        assert_eq!(decoded, stats);
        assert_eq!(decoded.recent_turns_missed(10, 10), 2);
    }
}
