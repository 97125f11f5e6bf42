// tabellone/src/prize.rs
// Prize ranks, prize keys and the ledger that arbitrates claims.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub type PlayerId = String;

/// Prize tiers in ascending value. The first four are per-row prizes, the
/// tombola covers the whole card.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PrizeRank {
    Ambo,
    Terno,
    Quaterna,
    Cinquina,
    Tombola,
}

impl PrizeRank {
    /// Rank reached by `count` marked numbers on a single row. Below two
    /// marks there is nothing to claim.
    pub fn from_row_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(PrizeRank::Ambo),
            3 => Some(PrizeRank::Terno),
            4 => Some(PrizeRank::Quaterna),
            5 => Some(PrizeRank::Cinquina),
            _ => None,
        }
    }

    pub fn marks_required(self) -> usize {
        match self {
            PrizeRank::Ambo => 2,
            PrizeRank::Terno => 3,
            PrizeRank::Quaterna => 4,
            PrizeRank::Cinquina => 5,
            PrizeRank::Tombola => 15,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrizeRank::Ambo => "ambo",
            PrizeRank::Terno => "terno",
            PrizeRank::Quaterna => "quaterna",
            PrizeRank::Cinquina => "cinquina",
            PrizeRank::Tombola => "tombola",
        }
    }
}

impl fmt::Display for PrizeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identity of a single awardable prize. `row` is None only for the tombola,
/// which belongs to the card as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrizeKey {
    pub card_id: u64,
    pub row: Option<usize>,
    pub rank: PrizeRank,
}

/// A candidate prize assertion, not yet validated against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub card_index: usize,
    pub key: PrizeKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwardOutcome {
    Granted,
    AlreadyAwarded,
}

/// Flattened awarded-prize record for turn results and state dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedPrize {
    pub card_id: u64,
    pub row: Option<usize>,
    pub rank: PrizeRank,
    pub player_id: PlayerId,
}

/// The authoritative record of which prizes have been granted and to whom.
/// Grows monotonically during a match; each key is granted at most once.
#[derive(Debug, Clone, Default)]
pub struct PrizeLedger {
    awarded: HashMap<PrizeKey, PlayerId>,
}

impl PrizeLedger {
    pub fn new() -> Self {
        PrizeLedger {
            awarded: HashMap::new(),
        }
    }

    /// Grant `key` to `player` unless it was granted before. Single
    /// check-then-insert step, so a key can never be granted twice.
    pub fn award(&mut self, key: PrizeKey, player: &str) -> AwardOutcome {
        match self.awarded.entry(key) {
            Entry::Occupied(_) => AwardOutcome::AlreadyAwarded,
            Entry::Vacant(slot) => {
                slot.insert(player.to_string());
                AwardOutcome::Granted
            }
        }
    }

    pub fn is_awarded(&self, key: &PrizeKey) -> bool {
        self.awarded.contains_key(key)
    }

    /// Snapshot of the granted keys, passed to claim evaluation.
    pub fn awarded_keys(&self) -> HashSet<PrizeKey> {
        self.awarded.keys().cloned().collect()
    }

    pub fn winner_of(&self, key: &PrizeKey) -> Option<&PlayerId> {
        self.awarded.get(key)
    }

    /// Who took the tombola, if anyone has.
    pub fn tombola_winner(&self) -> Option<&PlayerId> {
        self.awarded
            .iter()
            .find(|(key, _)| key.rank == PrizeRank::Tombola)
            .map(|(_, player)| player)
    }

    pub fn len(&self) -> usize {
        self.awarded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.awarded.is_empty()
    }

    /// Flattened records in a stable order, for summaries and dumps.
    pub fn to_records(&self) -> Vec<AwardedPrize> {
        let mut records: Vec<AwardedPrize> = self
            .awarded
            .iter()
            .map(|(key, player)| AwardedPrize {
                card_id: key.card_id,
                row: key.row,
                rank: key.rank,
                player_id: player.clone(),
            })
            .collect();
        records.sort_by_key(|record| (record.card_id, record.row, record.rank));
        records
    }

    pub fn clear(&mut self) {
        self.awarded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(rank: PrizeRank, row: Option<usize>) -> PrizeKey {
        PrizeKey {
            card_id: 0xABCD,
            row,
            rank,
        }
    }

    #[test]
    fn test_rank_from_row_count() {
        assert_eq!(PrizeRank::from_row_count(0), None);
        assert_eq!(PrizeRank::from_row_count(1), None);
        assert_eq!(PrizeRank::from_row_count(2), Some(PrizeRank::Ambo));
        assert_eq!(PrizeRank::from_row_count(3), Some(PrizeRank::Terno));
        assert_eq!(PrizeRank::from_row_count(4), Some(PrizeRank::Quaterna));
        assert_eq!(PrizeRank::from_row_count(5), Some(PrizeRank::Cinquina));
        assert_eq!(PrizeRank::from_row_count(6), None);
    }

    #[test]
    fn test_rank_ordering() {
        assert!(PrizeRank::Ambo < PrizeRank::Terno);
        assert!(PrizeRank::Terno < PrizeRank::Quaterna);
        assert!(PrizeRank::Quaterna < PrizeRank::Cinquina);
        assert!(PrizeRank::Cinquina < PrizeRank::Tombola);
    }

    #[test]
    fn test_award_grants_each_key_exactly_once() {
        let mut ledger = PrizeLedger::new();
        let ambo = key(PrizeRank::Ambo, Some(0));

        assert_eq!(ledger.award(ambo.clone(), "player_1"), AwardOutcome::Granted);
        assert_eq!(
            ledger.award(ambo.clone(), "player_2"),
            AwardOutcome::AlreadyAwarded
        );
        assert_eq!(
            ledger.award(ambo.clone(), "player_1"),
            AwardOutcome::AlreadyAwarded
        );
        // The first claimant keeps the prize.
        assert_eq!(ledger.winner_of(&ambo).map(String::as_str), Some("player_1"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_same_row_different_ranks_are_distinct_keys() {
        let mut ledger = PrizeLedger::new();
        assert_eq!(
            ledger.award(key(PrizeRank::Ambo, Some(1)), "player_1"),
            AwardOutcome::Granted
        );
        assert_eq!(
            ledger.award(key(PrizeRank::Terno, Some(1)), "player_1"),
            AwardOutcome::Granted
        );
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_tombola_winner() {
        let mut ledger = PrizeLedger::new();
        assert_eq!(ledger.tombola_winner(), None);
        ledger.award(key(PrizeRank::Cinquina, Some(2)), "player_1");
        assert_eq!(ledger.tombola_winner(), None);
        ledger.award(key(PrizeRank::Tombola, None), "player_2");
        assert_eq!(
            ledger.tombola_winner().map(String::as_str),
            Some("player_2")
        );
    }

    #[test]
    fn test_clear_empties_the_ledger() {
        let mut ledger = PrizeLedger::new();
        ledger.award(key(PrizeRank::Ambo, Some(0)), "player_1");
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(!ledger.is_awarded(&key(PrizeRank::Ambo, Some(0))));
    }

    #[test]
    fn test_records_are_stably_ordered() {
        let mut ledger = PrizeLedger::new();
        ledger.award(key(PrizeRank::Terno, Some(2)), "player_1");
        ledger.award(key(PrizeRank::Ambo, Some(0)), "player_2");
        let records = ledger.to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, Some(0));
        assert_eq!(records[1].row, Some(2));
    }
}
