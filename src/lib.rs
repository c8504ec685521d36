//! Mischief - a turn-based board-path party game core.
//!
//! Players advance along a fixed linear path of 43 spaces by rolling a
//! die. Challenge spaces consult an external text oracle (with a
//! per-locale fallback when it fails), reward and penalty spaces apply
//! deterministic state deltas, and the first player to reach the Finish
//! space wins.
//!
//! # Architecture
//!
//! - **Board**: static space layout with effects bound at construction
//! - **Engine**: the turn-resolution state machine (roll, move, resolve,
//!   advance), including skip-turn propagation
//! - **Oracle**: async challenge-text gateway (OpenAI or Anthropic)
//! - **Session**: Setup -> Playing -> GameOver orchestration
//!
//! # Example
//!
//! ```no_run
//! use mischief::{AvatarId, GameController, Language, PlayerSetup, ScriptedOracle};
//!
//! # async fn example() -> Result<(), mischief::SessionError> {
//! let mut session = GameController::new(Language::En);
//! session.start_game(vec![
//!     PlayerSetup::new("Ana", 9, AvatarId::Unicorn),
//!     PlayerSetup::new("Leo", 41, AvatarId::Robot),
//! ])?;
//!
//! let oracle = ScriptedOracle::Fixed("Hop on one foot!".to_string());
//! let report = session.play_turn(4, &oracle).await?;
//! println!("moved to space {}", report.position);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod effects;
mod engine;
mod locale;
mod oracle;
mod player;
mod session;

// Crate-level exports - Board layout
pub use board::{BOARD_SIZE, Board, BoardError, Space, SpaceKind};

// Crate-level exports - Effect catalog
pub use effects::{Effect, EffectCard, EffectDelta, PENALTIES, REWARDS};

// Crate-level exports - Turn engine
pub use engine::{
    ChallengePrompt, ChallengeTicket, DIE_MAX, DIE_MIN, EngineError, SpaceOutcome, TurnEngine,
    TurnPhase, TurnReport,
};

// Crate-level exports - Locale
pub use locale::{Language, MessageKey};

// Crate-level exports - Challenge oracle
pub use oracle::{ChallengeOracle, LlmOracle, OracleConfig, OracleError, OracleProvider, ScriptedOracle};

// Crate-level exports - Players
pub use player::{AvatarId, MAX_PLAYERS, MIN_PLAYERS, Player, PlayerId, PlayerSetup, SetupFault};

// Crate-level exports - Session controller
pub use session::{GameController, GamePhase, SessionError, SetupIssue, ValidationError};
