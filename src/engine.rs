//! Turn engine - the turn-resolution state machine.
//!
//! Each turn passes through `AwaitingRoll -> Moving -> ResolvingSpace ->
//! TurnComplete`, looping back to `AwaitingRoll` for the next eligible
//! player, or ending the game when a player reaches the Finish space.
//!
//! The engine owns the roster and the turn state, and is the only code
//! that mutates player position or the skip flag. It never generates
//! randomness: die values come from the caller, which keeps every
//! transition deterministic and unit-testable.

use crate::board::{Board, SpaceKind};
use crate::effects::EffectDelta;
use crate::locale::{Language, MessageKey};
use crate::oracle::ChallengeOracle;
use crate::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

/// Smallest accepted die value.
pub const DIE_MIN: u8 = 1;

/// Largest accepted die value.
pub const DIE_MAX: u8 = 6;

/// Phase of the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for the caller to supply a die value.
    AwaitingRoll,
    /// Roll received, movement not yet applied.
    Moving,
    /// Movement applied, landed space not yet resolved.
    ResolvingSpace,
    /// Space resolved; ready to advance to the next player.
    TurnComplete,
}

/// Process-unique session identities for stale-response detection.
static NEXT_SESSION: AtomicU64 = AtomicU64::new(0);

/// Identity of one in-flight challenge request.
///
/// Minted by [`TurnEngine::begin_challenge`] and redeemed by
/// [`TurnEngine::complete_challenge`]. A ticket minted before a session
/// reset (or an earlier turn) no longer matches and is rejected, so a
/// late oracle response is discarded instead of applied to fresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeTicket {
    session: u64,
    serial: u64,
}

/// Prompt data handed to the presentation layer when a challenge opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengePrompt {
    /// Ticket to redeem once the challenge text has been shown.
    pub ticket: ChallengeTicket,
    /// Age of the player facing the challenge.
    pub age: u8,
    /// Language for the challenge text.
    pub language: Language,
}

/// What resolving the landed-on space produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceOutcome {
    /// The active player reached Finish and wins. Checked before any
    /// space-category effect.
    Finished {
        /// The winning player.
        winner: Player,
    },
    /// A challenge was generated (or substituted by the fallback).
    Challenge {
        /// Challenge text to present.
        text: String,
    },
    /// A reward or penalty effect was applied.
    Effect {
        /// Category of the landed space.
        kind: SpaceKind,
        /// Message key of the triggered effect.
        message: MessageKey,
        /// The delta that was merged into the player.
        delta: EffectDelta,
    },
    /// Start or any unrecognized space: nothing happens.
    Quiet,
}

/// Everything that happened in one driven turn, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Who acted.
    pub player: PlayerId,
    /// The die value supplied.
    pub roll: u8,
    /// Position after movement and any effect.
    pub position: usize,
    /// What the landed space did.
    pub outcome: SpaceOutcome,
    /// The same player rolls again; the turn did not pass.
    pub roll_again: bool,
    /// Next player to act, when the turn passed.
    pub next_player: Option<PlayerId>,
}

/// The turn-resolution state machine.
#[derive(Debug, Clone)]
pub struct TurnEngine {
    board: Board,
    players: Vec<Player>,
    language: Language,
    current: usize,
    phase: TurnPhase,
    roll: Option<u8>,
    session: u64,
    turn_serial: u64,
    challenge_open: bool,
    winner: Option<PlayerId>,
}

impl TurnEngine {
    /// Creates an engine for an already-validated roster.
    ///
    /// The first player in the roster acts first.
    #[instrument(skip(players, board), fields(player_count = players.len()))]
    pub fn new(players: Vec<Player>, board: Board, language: Language) -> Self {
        debug_assert!(!players.is_empty());
        info!(player_count = players.len(), "Creating turn engine");
        Self {
            board,
            players,
            language,
            current: 0,
            phase: TurnPhase::AwaitingRoll,
            roll: None,
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            turn_serial: 0,
            challenge_open: false,
            winner: None,
        }
    }

    /// The roster.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The player whose turn it is.
    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    /// Current turn phase.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// The last die value, if a roll is in flight.
    pub fn last_roll(&self) -> Option<u8> {
        self.roll
    }

    /// The board in play.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The winner, once a player has reached Finish.
    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|id| &self.players[id])
    }

    /// Accepts a caller-supplied die value.
    ///
    /// # Errors
    ///
    /// Rejects values outside 1..=6 outright (never clamps), calls in any
    /// phase other than `AwaitingRoll`, and calls after the game is over.
    #[instrument(skip(self), fields(player = self.current))]
    pub fn roll(&mut self, value: u8) -> Result<(), EngineError> {
        self.ensure_live()?;
        self.ensure_phase(TurnPhase::AwaitingRoll)?;
        if !(DIE_MIN..=DIE_MAX).contains(&value) {
            warn!(value, "Rejected out-of-range die value");
            return Err(EngineError::RollOutOfRange(value));
        }
        debug!(value, "Roll accepted");
        self.roll = Some(value);
        self.phase = TurnPhase::Moving;
        Ok(())
    }

    /// Applies the stored roll to the active player's position.
    ///
    /// Movement clamps to the last index rather than wrapping: overshoot
    /// lands exactly on Finish, so the game always terminates.
    ///
    /// # Errors
    ///
    /// Fails outside the `Moving` phase.
    #[instrument(skip(self), fields(player = self.current))]
    pub fn apply_move(&mut self) -> Result<usize, EngineError> {
        self.ensure_phase(TurnPhase::Moving)?;
        let roll = self.roll.expect("Moving phase implies a stored roll");
        let player = &mut self.players[self.current];
        let destination = (player.position + roll as usize).min(self.board.last_index());
        debug!(
            from = player.position,
            to = destination,
            roll,
            "Moving player"
        );
        player.position = destination;
        self.phase = TurnPhase::ResolvingSpace;
        Ok(destination)
    }

    /// Resolves the space the active player landed on, consulting the
    /// oracle inline for Challenge spaces.
    ///
    /// The oracle await is the turn's only suspension point. An oracle
    /// failure degrades to the locale fallback; it never blocks or fails
    /// the turn.
    ///
    /// # Errors
    ///
    /// Fails outside the `ResolvingSpace` phase.
    #[instrument(skip(self, oracle), fields(player = self.current))]
    pub async fn resolve_space(
        &mut self,
        oracle: &dyn ChallengeOracle,
    ) -> Result<SpaceOutcome, EngineError> {
        self.ensure_phase(TurnPhase::ResolvingSpace)?;

        let position = self.players[self.current].position;
        // Finish takes priority over whatever category sits at the last
        // index.
        if position == self.board.last_index() {
            return Ok(self.crown_winner());
        }

        let space = *self.board.space_at(position)?;
        match space.kind {
            SpaceKind::Challenge => {
                let prompt = self.begin_challenge()?;
                let text = match oracle.generate(prompt.age, prompt.language).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Oracle unavailable; substituting fallback challenge");
                        prompt.language.fallback_request_failed().to_string()
                    }
                };
                self.complete_challenge(prompt.ticket)?;
                Ok(SpaceOutcome::Challenge { text })
            }
            SpaceKind::Reward | SpaceKind::Penalty => {
                let card = space.card.expect("Reward/Penalty spaces carry a card");
                let delta = self.apply_effect(card.effect);
                info!(kind = ?space.kind, effect = ?card.effect, "Applied space effect");
                Ok(SpaceOutcome::Effect {
                    kind: space.kind,
                    message: card.message,
                    delta,
                })
            }
            SpaceKind::Start | SpaceKind::Finish => {
                self.phase = TurnPhase::TurnComplete;
                Ok(SpaceOutcome::Quiet)
            }
        }
    }

    /// Opens the challenge for the landed-on Challenge space without
    /// awaiting the oracle, for callers that drive presentation
    /// themselves. The turn stays suspended in `ResolvingSpace` until the
    /// ticket is redeemed.
    ///
    /// # Errors
    ///
    /// Fails outside `ResolvingSpace`, on non-Challenge spaces, or when a
    /// challenge is already open.
    #[instrument(skip(self), fields(player = self.current))]
    pub fn begin_challenge(&mut self) -> Result<ChallengePrompt, EngineError> {
        self.ensure_phase(TurnPhase::ResolvingSpace)?;
        if self.challenge_open {
            return Err(EngineError::ChallengeAlreadyOpen);
        }
        let (position, age) = {
            let player = &self.players[self.current];
            (player.position, player.age)
        };
        let kind = self.board.space_at(position)?.kind;
        if kind != SpaceKind::Challenge {
            return Err(EngineError::NotAChallengeSpace { kind });
        }
        self.challenge_open = true;
        debug!(serial = self.turn_serial, "Challenge opened");
        Ok(ChallengePrompt {
            ticket: ChallengeTicket {
                session: self.session,
                serial: self.turn_serial,
            },
            age,
            language: self.language,
        })
    }

    /// Redeems a challenge ticket, completing the suspended turn.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::StaleChallenge`] when the ticket predates
    /// the current session or turn; the caller discards the response.
    #[instrument(skip(self))]
    pub fn complete_challenge(&mut self, ticket: ChallengeTicket) -> Result<(), EngineError> {
        if ticket.session != self.session || ticket.serial != self.turn_serial {
            warn!(
                ticket_session = ticket.session,
                ticket_serial = ticket.serial,
                "Discarding stale challenge response"
            );
            return Err(EngineError::StaleChallenge);
        }
        if !self.challenge_open {
            return Err(EngineError::Phase {
                expected: TurnPhase::ResolvingSpace,
                actual: self.phase,
            });
        }
        self.challenge_open = false;
        self.phase = TurnPhase::TurnComplete;
        debug!("Challenge completed");
        Ok(())
    }

    /// Advances to the next eligible player, consuming skip flags.
    ///
    /// Flagged players have their flag cleared and are passed over. If
    /// every player is flagged, the walk stops once it cycles back to the
    /// first candidate, whose flag has already been consumed, so play
    /// resumes instead of looping forever.
    ///
    /// # Errors
    ///
    /// Fails outside `TurnComplete` or after the game is over.
    #[instrument(skip(self), fields(player = self.current))]
    pub fn finish_turn(&mut self) -> Result<PlayerId, EngineError> {
        self.ensure_live()?;
        self.ensure_phase(TurnPhase::TurnComplete)?;

        let count = self.players.len();
        let mut next = (self.current + 1) % count;
        let first_candidate = next;
        while self.players[next].skip_next_turn {
            debug!(skipped = next, "Consuming skip flag");
            self.players[next].skip_next_turn = false;
            next = (next + 1) % count;
            if next == first_candidate {
                break;
            }
        }

        info!(from = self.current, to = next, "Turn passed");
        self.current = next;
        self.reset_turn();
        Ok(next)
    }

    /// Drives one complete turn: roll, move, resolve, advance.
    ///
    /// When the outcome grants another roll the turn does not pass; the
    /// caller supplies a fresh die value in the next call. Convenience
    /// wrapper over the stepwise API; same contract.
    #[instrument(skip(self, oracle))]
    pub async fn take_turn(
        &mut self,
        roll: u8,
        oracle: &dyn ChallengeOracle,
    ) -> Result<TurnReport, EngineError> {
        let player = self.current_player().id;
        self.roll(roll)?;
        self.apply_move()?;
        let outcome = self.resolve_space(oracle).await?;

        let roll_again = self.phase == TurnPhase::AwaitingRoll;
        let next_player = if self.phase == TurnPhase::TurnComplete && self.winner.is_none() {
            Some(self.finish_turn()?)
        } else {
            None
        };

        Ok(TurnReport {
            player,
            roll,
            position: self.players[player].position,
            outcome,
            roll_again,
            next_player,
        })
    }

    /// Records the win and freezes the engine.
    fn crown_winner(&mut self) -> SpaceOutcome {
        let winner = self.players[self.current].clone();
        info!(winner = winner.id, name = %winner.name, "Player reached Finish");
        self.winner = Some(winner.id);
        self.phase = TurnPhase::TurnComplete;
        SpaceOutcome::Finished { winner }
    }

    /// Merges an effect delta into the active player and sets the next
    /// phase. Positions coming out of [`crate::effects::Effect::apply`]
    /// are already clamped; the debug assertion holds the invariant.
    fn apply_effect(&mut self, effect: crate::effects::Effect) -> EffectDelta {
        let last = self.board.last_index();
        let player = &mut self.players[self.current];
        let delta = effect.apply(player.position, last);

        if let Some(position) = delta.position {
            debug_assert!(position <= last);
            player.position = position;
        }
        if delta.skip_next_turn {
            player.skip_next_turn = true;
        }

        if delta.roll_again {
            // Same player keeps the turn; turn state resets.
            self.reset_turn();
        } else {
            self.phase = TurnPhase::TurnComplete;
        }
        delta
    }

    /// Resets per-turn state back to `AwaitingRoll`.
    fn reset_turn(&mut self) {
        self.phase = TurnPhase::AwaitingRoll;
        self.roll = None;
        self.challenge_open = false;
        self.turn_serial += 1;
    }

    fn ensure_live(&self) -> Result<(), EngineError> {
        match self.winner {
            Some(_) => Err(EngineError::GameOver),
            None => Ok(()),
        }
    }

    fn ensure_phase(&self, expected: TurnPhase) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::Phase {
                expected,
                actual: self.phase,
            })
        }
    }
}

/// Errors from misusing the engine contract.
///
/// All of these are caller bugs, not gameplay conditions; they fail loudly
/// rather than being silently repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Die value outside 1..=6.
    RollOutOfRange(u8),
    /// Operation called in the wrong turn phase.
    Phase {
        /// Phase the operation requires.
        expected: TurnPhase,
        /// Phase the engine was in.
        actual: TurnPhase,
    },
    /// Challenge ticket predates the current session or turn.
    StaleChallenge,
    /// A challenge is already open for this turn.
    ChallengeAlreadyOpen,
    /// `begin_challenge` called on a non-Challenge space.
    NotAChallengeSpace {
        /// The actual space category.
        kind: SpaceKind,
    },
    /// The game already has a winner.
    GameOver,
    /// Board index out of range.
    Board(crate::board::BoardError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::RollOutOfRange(value) => {
                write!(f, "die value {} outside 1..=6", value)
            }
            EngineError::Phase { expected, actual } => {
                write!(
                    f,
                    "operation requires phase {:?}, engine is in {:?}",
                    expected, actual
                )
            }
            EngineError::StaleChallenge => write!(f, "stale challenge ticket"),
            EngineError::ChallengeAlreadyOpen => write!(f, "challenge already open"),
            EngineError::NotAChallengeSpace { kind } => {
                write!(f, "not a challenge space (found {:?})", kind)
            }
            EngineError::GameOver => write!(f, "game is already over"),
            EngineError::Board(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<crate::board::BoardError> for EngineError {
    fn from(e: crate::board::BoardError) -> Self {
        EngineError::Board(e)
    }
}
