// tabellone/src/game.rs
// The match orchestrator: owns the pouch, the roster and the prize ledger,
// drives turn execution and claim arbitration, and reports terminal
// conditions as plain data.

use crate::card::{Card, MarkOutcome};
use crate::defs::Number;
use crate::player::Player;
use crate::pouch::{Pouch, PouchError, PouchSnapshot};
use crate::prize::{AwardOutcome, AwardedPrize, Claim, PrizeLedger, PrizeRank};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("match already started")]
    AlreadyStarted,
    #[error("at least 2 players are required")]
    InsufficientPlayers,
    #[error("match is not in progress")]
    NotInProgress,
    #[error("no numbers left in the pouch")]
    NumbersExhausted,
    #[error("number {0} is not available for drawing")]
    NumberNotAvailable(Number),
    #[error("number {0} has not been drawn")]
    NumberNotDrawn(Number),
    #[error("unknown player {0}")]
    UnknownPlayer(String),
    #[error("player {player} has no card {card_index}")]
    UnknownCard { player: String, card_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// One arbitrated claim attempt. Losing an arbitration is not an error,
/// it is reported here with `success = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub player_id: String,
    pub player_name: String,
    pub claim: Claim,
    pub success: bool,
}

/// Structured outcome of a single turn, consumed by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub number_drawn: Number,
    pub claims: Vec<ClaimRecord>,
    pub new_prizes: Vec<AwardedPrize>,
    pub tombola_detected: bool,
    pub match_finished: bool,
}

/// End-of-match digest synthesized from pouch, ledger and roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner: Option<String>,
    pub total_draws: usize,
    pub prizes_awarded: usize,
    pub finished: bool,
}

/// Serializable match state: the draw history, each card's grid and marks,
/// and the awarded prizes are enough to rebuild the match by replaying the
/// history against the same cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub created_at: String,
    pub status: GameStatus,
    pub draw_history: Vec<Number>,
    pub players: Vec<PlayerState>,
    pub prizes: Vec<AwardedPrize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub automated: bool,
    pub cards: Vec<CardState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardState {
    pub card_id: u64,
    pub grid: Vec<Vec<Option<Number>>>,
    pub marked: Vec<Number>,
}

pub struct Game {
    id: String,
    created_at: DateTime<Utc>,
    pouch: Pouch,
    players: Vec<Player>,
    ledger: PrizeLedger,
    status: GameStatus,
    rng: StdRng,
}

impl Game {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// A reproducible match: same seed, same draws, same cards.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let id = format!("match_{:08x}", rng.random::<u32>());
        Game {
            id,
            created_at: Utc::now(),
            pouch: Pouch::new(),
            players: Vec::new(),
            ledger: PrizeLedger::new(),
            status: GameStatus::NotStarted,
            rng,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_at_string(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn pouch(&self) -> &Pouch {
        &self.pouch
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    pub fn ledger(&self) -> &PrizeLedger {
        &self.ledger
    }

    pub fn snapshot(&self) -> PouchSnapshot {
        self.pouch.snapshot()
    }

    /// Add a prepared player to the roster. Only possible before the start.
    pub fn add_player(&mut self, player: Player) -> Result<(), GameError> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        self.players.push(player);
        Ok(())
    }

    /// Register an automated player holding `cards` freshly generated cards.
    /// Returns the player id.
    pub fn add_bot(&mut self, name: &str, cards: usize) -> Result<String, GameError> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        let mut player = Player::new_bot(name);
        for _ in 0..cards {
            player.add_card(Card::generate(&mut self.rng));
        }
        let id = player.id().to_string();
        self.players.push(player);
        Ok(id)
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(GameError::InsufficientPlayers);
        }
        self.status = GameStatus::InProgress;
        Ok(())
    }

    /// Execute one turn: draw, broadcast, collect and arbitrate claims,
    /// settle terminal conditions.
    pub fn run_turn(&mut self) -> Result<TurnResult, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::NotInProgress);
        }
        match self.pouch.draw_with(&mut self.rng) {
            Ok(number) => Ok(self.resolve_turn(number)),
            Err(_) => Err(GameError::NumbersExhausted),
        }
    }

    /// Re-run a recorded extraction, resolving the turn exactly as
    /// `run_turn` would have. Replaying a dumped draw history against the
    /// same cards reconstructs the match deterministically.
    pub fn replay_turn(&mut self, number: Number) -> Result<TurnResult, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::NotInProgress);
        }
        match self.pouch.draw_exact(number) {
            Ok(drawn) => Ok(self.resolve_turn(drawn)),
            Err(PouchError::Exhausted) => Err(GameError::NumbersExhausted),
            Err(_) => Err(GameError::NumberNotAvailable(number)),
        }
    }

    // The draw already happened and is the only irreversible step; nothing
    // below can fail.
    fn resolve_turn(&mut self, number: Number) -> TurnResult {
        // Broadcast: automated players mark the number on their own cards.
        for player in self.players.iter_mut().filter(|p| p.is_automated()) {
            player.mark_all(number);
        }

        // Claims are evaluated against the awarded set as of the start of
        // the turn; awards go against the live ledger, so a same-turn
        // duplicate surfaces as a failed claim. Roster order decides ties.
        let awarded = self.ledger.awarded_keys();
        let mut claims = Vec::new();
        let mut new_prizes = Vec::new();
        let mut tombola_detected = false;

        for player in self.players.iter_mut().filter(|p| p.is_automated()) {
            let Some(claim) = player.evaluate_claim(&awarded) else {
                continue;
            };
            let outcome = self.ledger.award(claim.key.clone(), player.id());
            let success = outcome == AwardOutcome::Granted;
            if success {
                if claim.key.rank == PrizeRank::Tombola {
                    tombola_detected = true;
                }
                new_prizes.push(AwardedPrize {
                    card_id: claim.key.card_id,
                    row: claim.key.row,
                    rank: claim.key.rank,
                    player_id: player.id().to_string(),
                });
            }
            claims.push(ClaimRecord {
                player_id: player.id().to_string(),
                player_name: player.name().to_string(),
                claim,
                success,
            });
        }

        if tombola_detected || self.pouch.is_empty() {
            self.status = GameStatus::Finished;
        }

        for player in &mut self.players {
            player.clear_pending();
        }

        TurnResult {
            number_drawn: number,
            claims,
            new_prizes,
            tombola_detected,
            match_finished: self.status == GameStatus::Finished,
        }
    }

    /// Manual marking for interactive players. The number must already have
    /// come out of the pouch.
    pub fn mark_number(
        &mut self,
        player_id: &str,
        card_index: usize,
        number: Number,
    ) -> Result<MarkOutcome, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::NotInProgress);
        }
        if !self.pouch.is_drawn(number) {
            return Err(GameError::NumberNotDrawn(number));
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id() == player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        match player.card_mut(card_index) {
            Some(card) => Ok(card.mark(number)),
            None => Err(GameError::UnknownCard {
                player: player_id.to_string(),
                card_index,
            }),
        }
    }

    pub fn summary(&self) -> MatchSummary {
        let winner = self
            .ledger
            .tombola_winner()
            .and_then(|id| self.player(id))
            .map(|player| player.name().to_string());
        MatchSummary {
            winner,
            total_draws: self.pouch.drawn_count(),
            prizes_awarded: self.ledger.len(),
            finished: self.status == GameStatus::Finished,
        }
    }

    /// Full serializable match state for dumps and replays.
    pub fn dump_state(&self) -> GameState {
        GameState {
            id: self.id.clone(),
            created_at: self.created_at_string(),
            status: self.status,
            draw_history: self.pouch.history().to_vec(),
            players: self
                .players
                .iter()
                .map(|player| PlayerState {
                    id: player.id().to_string(),
                    name: player.name().to_string(),
                    automated: player.is_automated(),
                    cards: player
                        .cards()
                        .iter()
                        .map(|card| CardState {
                            card_id: card.id(),
                            grid: card.grid().to_vec(),
                            marked: card.marked_numbers(),
                        })
                        .collect(),
                })
                .collect(),
            prizes: self.ledger.to_records(),
        }
    }

    /// Start over: fresh pouch and ledger, cleared marks and pending claims,
    /// new match id. The roster and its cards stay.
    pub fn reset(&mut self) {
        self.id = format!("match_{:08x}", self.rng.random::<u32>());
        self.created_at = Utc::now();
        self.pouch.reset();
        self.ledger.clear();
        for player in &mut self.players {
            player.clear_marks();
            player.clear_pending();
        }
        self.status = GameStatus::NotStarted;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
