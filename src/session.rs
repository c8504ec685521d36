//! Game session controller: Setup -> Playing -> GameOver.
//!
//! The controller validates setup data, constructs the roster, owns the
//! turn engine while a game runs, freezes the winner when Finish is
//! reached, and resets back to Setup. It is the only boundary that
//! surfaces [`ValidationError`] to the caller; everything else is either
//! a fail-fast contract error or degraded internally (the oracle).

use crate::board::Board;
use crate::engine::{EngineError, SpaceOutcome, TurnEngine, TurnReport};
use crate::locale::Language;
use crate::oracle::ChallengeOracle;
use crate::player::{MAX_PLAYERS, MIN_PLAYERS, Player, PlayerSetup, SetupFault};
use tracing::{info, instrument, warn};

/// Whole-game phase, for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Collecting and validating player setup data.
    Setup,
    /// A game is in progress.
    Playing,
    /// A player has won; winner frozen until reset.
    GameOver,
}

/// Internal session state. Playing owns the engine; GameOver owns the
/// frozen winner.
#[derive(Debug)]
enum SessionState {
    Setup,
    Playing(TurnEngine),
    GameOver { winner: Player },
}

/// Orchestrates a single game session.
#[derive(Debug)]
pub struct GameController {
    language: Language,
    state: SessionState,
}

impl GameController {
    /// Creates a controller in the Setup phase.
    #[instrument]
    pub fn new(language: Language) -> Self {
        info!(?language, "Creating game controller");
        Self {
            language,
            state: SessionState::Setup,
        }
    }

    /// The session language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Current whole-game phase.
    pub fn phase(&self) -> GamePhase {
        match self.state {
            SessionState::Setup => GamePhase::Setup,
            SessionState::Playing(_) => GamePhase::Playing,
            SessionState::GameOver { .. } => GamePhase::GameOver,
        }
    }

    /// Validates the setup entries and starts a game.
    ///
    /// Every offending entry is reported, not just the first; on any
    /// failure the session stays in Setup and no roster is built. Ids are
    /// assigned sequentially from 0 in setup order, everyone at position
    /// 0 with a clear skip flag.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] when entries fail the name/age/count
    /// constraints; [`SessionError::Phase`] when a game is already
    /// running.
    #[instrument(skip(self, setups), fields(count = setups.len()))]
    pub fn start_game(&mut self, setups: Vec<PlayerSetup>) -> Result<(), SessionError> {
        if self.phase() != GamePhase::Setup {
            return Err(SessionError::Phase {
                expected: GamePhase::Setup,
                actual: self.phase(),
            });
        }

        let mut issues = Vec::new();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&setups.len()) {
            issues.push(SetupIssue::RosterSize {
                count: setups.len(),
            });
        }
        for (index, setup) in setups.iter().enumerate() {
            let faults = setup.check();
            if !faults.is_empty() {
                issues.push(SetupIssue::Entry { index, faults });
            }
        }
        if !issues.is_empty() {
            warn!(issue_count = issues.len(), "Rejecting game start");
            return Err(SessionError::Validation(ValidationError { issues }));
        }

        let players: Vec<Player> = setups
            .into_iter()
            .enumerate()
            .map(|(id, setup)| Player::from_setup(id, setup))
            .collect();

        info!(player_count = players.len(), "Starting game");
        self.state =
            SessionState::Playing(TurnEngine::new(players, Board::standard(), self.language));
        Ok(())
    }

    /// The running engine, for callers driving turns stepwise.
    pub fn engine(&self) -> Option<&TurnEngine> {
        match &self.state {
            SessionState::Playing(engine) => Some(engine),
            _ => None,
        }
    }

    /// Mutable access to the running engine.
    pub fn engine_mut(&mut self) -> Option<&mut TurnEngine> {
        match &mut self.state {
            SessionState::Playing(engine) => Some(engine),
            _ => None,
        }
    }

    /// Drives one complete turn and handles the win transition.
    ///
    /// When the turn ends on Finish the session moves to GameOver and the
    /// winner is frozen; this happens exactly once per game.
    ///
    /// # Errors
    ///
    /// [`SessionError::Phase`] outside Playing; engine contract errors
    /// pass through as [`SessionError::Engine`].
    #[instrument(skip(self, oracle))]
    pub async fn play_turn(
        &mut self,
        roll: u8,
        oracle: &dyn ChallengeOracle,
    ) -> Result<TurnReport, SessionError> {
        let actual = self.phase();
        let engine = match &mut self.state {
            SessionState::Playing(engine) => engine,
            _ => {
                return Err(SessionError::Phase {
                    expected: GamePhase::Playing,
                    actual,
                });
            }
        };

        let report = engine.take_turn(roll, oracle).await?;

        if let SpaceOutcome::Finished { winner } = &report.outcome {
            info!(winner = winner.id, name = %winner.name, "Game over");
            self.state = SessionState::GameOver {
                winner: winner.clone(),
            };
        }
        Ok(report)
    }

    /// The winner, once the game is over.
    pub fn winner(&self) -> Option<&Player> {
        match &self.state {
            SessionState::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    /// Discards the roster and winner and returns to Setup.
    ///
    /// Dropping the engine retires its session identity, so any challenge
    /// ticket still in flight goes stale and its response is discarded.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting session to Setup");
        self.state = SessionState::Setup;
    }
}

/// One reason a game start was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupIssue {
    /// Player count outside 2..=6.
    RosterSize {
        /// Number of entries supplied.
        count: usize,
    },
    /// A setup entry failed one or more constraints.
    Entry {
        /// Index of the entry in the submitted list.
        index: usize,
        /// Every fault found in the entry.
        faults: Vec<SetupFault>,
    },
}

impl std::fmt::Display for SetupIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupIssue::RosterSize { count } => {
                write!(
                    f,
                    "player count {} outside {}..={}",
                    count, MIN_PLAYERS, MAX_PLAYERS
                )
            }
            SetupIssue::Entry { index, faults } => {
                write!(f, "entry {}: ", index)?;
                for (i, fault) in faults.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", fault)?;
                }
                Ok(())
            }
        }
    }
}

/// Setup validation failed; the game did not start.
///
/// Carries every offending entry so the setup form can mark them all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// All issues found, in entry order.
    pub issues: Vec<SetupIssue>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid player setup: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors crossing the session controller boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Setup data failed validation; session stays in Setup.
    Validation(ValidationError),
    /// Operation called in the wrong whole-game phase.
    Phase {
        /// Phase the operation requires.
        expected: GamePhase,
        /// Phase the session was in.
        actual: GamePhase,
    },
    /// Engine contract violation while driving a turn.
    Engine(EngineError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Validation(e) => write!(f, "{}", e),
            SessionError::Phase { expected, actual } => {
                write!(
                    f,
                    "operation requires phase {:?}, session is in {:?}",
                    expected, actual
                )
            }
            SessionError::Engine(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Validation(e) => Some(e),
            SessionError::Engine(e) => Some(e),
            SessionError::Phase { .. } => None,
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        SessionError::Engine(e)
    }
}

impl From<ValidationError> for SessionError {
    fn from(e: ValidationError) -> Self {
        SessionError::Validation(e)
    }
}
