// tabellone/src/player.rs
// Roster entries: interactive participants and automated card holders. The
// kind tag is the capability discriminator, there is no runtime type
// inspection anywhere.

use crate::card::{Card, MarkOutcome};
use crate::defs::Number;
use crate::prize::{Claim, PrizeKey};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    Interactive,
    Automated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    id: String,
    name: String,
    kind: PlayerKind,
    cards: Vec<Card>,
    // Claim produced during the current turn; always None outside of one.
    #[serde(skip)]
    pending_claim: Option<Claim>,
}

impl Player {
    pub fn new(name: &str, kind: PlayerKind) -> Self {
        let mut rng = rand::rng();
        Player {
            id: format!("player_{:08x}", rng.random::<u32>()),
            name: name.to_string(),
            kind,
            cards: Vec::new(),
            pending_claim: None,
        }
    }

    pub fn new_interactive(name: &str) -> Self {
        Self::new(name, PlayerKind::Interactive)
    }

    pub fn new_bot(name: &str) -> Self {
        Self::new(name, PlayerKind::Automated)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PlayerKind {
        self.kind
    }

    pub fn is_automated(&self) -> bool {
        self.kind == PlayerKind::Automated
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards.get(index)
    }

    pub(crate) fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        self.cards.get_mut(index)
    }

    /// Mark a drawn number on every owned card (the per-turn broadcast for
    /// automated players). Cards without the number are untouched.
    pub(crate) fn mark_all(&mut self, number: Number) -> Vec<MarkOutcome> {
        self.cards.iter_mut().map(|card| card.mark(number)).collect()
    }

    /// Best claim across all owned cards: highest rank first, ties fall to
    /// the lowest card index, then the lowest row. Automated players only;
    /// the result is parked in the pending slot until the turn resolves.
    pub fn evaluate_claim(&mut self, awarded: &HashSet<PrizeKey>) -> Option<Claim> {
        if self.kind != PlayerKind::Automated {
            return None;
        }
        let mut best: Option<Claim> = None;
        for (card_index, card) in self.cards.iter().enumerate() {
            if let Some(key) = card.best_available_claim(awarded) {
                if best
                    .as_ref()
                    .is_none_or(|current| key.rank > current.key.rank)
                {
                    best = Some(Claim { card_index, key });
                }
            }
        }
        self.pending_claim = best.clone();
        best
    }

    pub fn pending_claim(&self) -> Option<&Claim> {
        self.pending_claim.as_ref()
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending_claim = None;
    }

    pub(crate) fn clear_marks(&mut self) {
        for card in &mut self.cards {
            card.clear_marks();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixture_card;
    use crate::prize::PrizeRank;

    fn bot_with_two_cards() -> Player {
        let mut player = Player::new_bot("bot1");
        player.add_card(fixture_card([
            [1, 12, 23, 34, 45],
            [56, 67, 78, 81, 9],
            [14, 25, 36, 47, 90],
        ]));
        player.add_card(fixture_card([
            [2, 15, 27, 38, 41],
            [51, 63, 74, 85, 6],
            [18, 29, 39, 42, 88],
        ]));
        player
    }

    #[test]
    fn test_kind_discriminator() {
        assert!(Player::new_bot("b").is_automated());
        assert!(!Player::new_interactive("i").is_automated());
    }

    #[test]
    fn test_unique_player_ids() {
        let first = Player::new_bot("a");
        let second = Player::new_bot("a");
        assert_ne!(first.id(), second.id());
        assert!(first.id().starts_with("player_"));
    }

    #[test]
    fn test_mark_all_touches_every_card() {
        let mut player = bot_with_two_cards();
        player.mark_all(9);
        assert!(player.cards()[0].is_marked(9));
        assert!(!player.cards()[1].is_marked(9));
        player.mark_all(6);
        assert!(player.cards()[1].is_marked(6));
    }

    #[test]
    fn test_evaluate_picks_highest_rank_across_cards() {
        let mut player = bot_with_two_cards();
        // Quaterna on card 0 row 0, cinquina on card 1 row 1.
        for number in [1, 12, 23, 34] {
            player.mark_all(number);
        }
        for number in [51, 63, 74, 85, 6] {
            player.mark_all(number);
        }
        let claim = player.evaluate_claim(&HashSet::new()).unwrap();
        assert_eq!(claim.card_index, 1);
        assert_eq!(claim.key.rank, PrizeRank::Cinquina);
        assert_eq!(claim.key.row, Some(1));
    }

    #[test]
    fn test_evaluate_tie_breaks_on_lowest_card_index() {
        let mut player = bot_with_two_cards();
        // An ambo on each card; the first card wins the tie.
        player.mark_all(1);
        player.mark_all(12);
        player.mark_all(2);
        player.mark_all(15);
        let claim = player.evaluate_claim(&HashSet::new()).unwrap();
        assert_eq!(claim.card_index, 0);
        assert_eq!(claim.key.rank, PrizeRank::Ambo);
    }

    #[test]
    fn test_pending_slot_lifecycle() {
        let mut player = bot_with_two_cards();
        assert!(player.pending_claim().is_none());
        player.mark_all(1);
        player.mark_all(12);
        let claim = player.evaluate_claim(&HashSet::new());
        assert!(claim.is_some());
        assert_eq!(player.pending_claim(), claim.as_ref());
        player.clear_pending();
        assert!(player.pending_claim().is_none());
    }

    #[test]
    fn test_interactive_players_never_claim() {
        let mut player = Player::new_interactive("human");
        player.add_card(fixture_card([
            [1, 12, 23, 34, 45],
            [56, 67, 78, 81, 9],
            [14, 25, 36, 47, 90],
        ]));
        player.card_mut(0).unwrap().mark(1);
        player.card_mut(0).unwrap().mark(12);
        assert_eq!(player.evaluate_claim(&HashSet::new()), None);
        assert!(player.pending_claim().is_none());
    }
}
