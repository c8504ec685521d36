//! Player records and setup validation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::instrument;

/// Stable player identifier, assigned as the index in the initial roster.
pub type PlayerId = usize;

/// Minimum number of players in a game.
pub const MIN_PLAYERS: usize = 2;

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 6;

/// Closed set of avatar identifiers.
///
/// Rendering of the avatar belongs to the presentation layer; the core
/// only carries the identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AvatarId {
    /// Green alien.
    Alien,
    /// Red dinosaur.
    Dino,
    /// Gray robot.
    Robot,
    /// Pink unicorn.
    Unicorn,
    /// Indigo ghost.
    Ghost,
    /// Blue rocket.
    Rocket,
}

/// Raw setup entry produced by the external setup form.
///
/// Re-validated by the session controller before a game starts; the core
/// does not trust UI-side validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name (must be non-empty after trimming).
    pub name: String,
    /// Age in years (must be in 1..=119).
    pub age: u8,
    /// Chosen avatar.
    pub avatar: AvatarId,
}

impl PlayerSetup {
    /// Creates a setup entry.
    pub fn new(name: impl Into<String>, age: u8, avatar: AvatarId) -> Self {
        Self {
            name: name.into(),
            age,
            avatar,
        }
    }

    /// Checks this entry against the setup constraints.
    ///
    /// Returns every fault found, not just the first.
    #[instrument(skip(self), fields(name = %self.name, age = self.age))]
    pub fn check(&self) -> Vec<SetupFault> {
        let mut faults = Vec::new();
        if self.name.trim().is_empty() {
            faults.push(SetupFault::EmptyName);
        }
        if self.age == 0 || self.age >= 120 {
            faults.push(SetupFault::AgeOutOfRange(self.age));
        }
        faults
    }
}

/// A single constraint violation in a setup entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupFault {
    /// Name is empty after trimming whitespace.
    EmptyName,
    /// Age is outside 1..=119.
    AgeOutOfRange(u8),
}

impl std::fmt::Display for SetupFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupFault::EmptyName => write!(f, "name is empty"),
            SetupFault::AgeOutOfRange(age) => write!(f, "age {} is outside 1..=119", age),
        }
    }
}

/// A player in an active game.
///
/// Created once by the session controller at game start; `position` and
/// `skip_next_turn` are mutated only by the turn engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Roster index, immutable for the life of the game.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Age in years, used to tailor challenge prompts.
    pub age: u8,
    /// Avatar identifier.
    pub avatar: AvatarId,
    /// Current board position.
    pub position: usize,
    /// When set, this player's next turn is silently forfeited once.
    pub skip_next_turn: bool,
}

impl Player {
    /// Creates a player at the start position from a validated setup entry.
    pub fn from_setup(id: PlayerId, setup: PlayerSetup) -> Self {
        Self {
            id,
            name: setup.name,
            age: setup.age,
            avatar: setup.avatar,
            position: 0,
            skip_next_turn: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn every_avatar_round_trips_through_its_name() {
        for avatar in AvatarId::iter() {
            let name = avatar.to_string();
            assert_eq!(AvatarId::from_str(&name).unwrap(), avatar);
        }
    }

    #[test]
    fn valid_setup_has_no_faults() {
        let setup = PlayerSetup::new("Ana", 9, AvatarId::Unicorn);
        assert!(setup.check().is_empty());
    }

    #[test]
    fn empty_name_is_a_fault() {
        let setup = PlayerSetup::new("   ", 9, AvatarId::Ghost);
        assert_eq!(setup.check(), vec![SetupFault::EmptyName]);
    }

    #[test]
    fn age_bounds_are_exclusive_of_zero_and_120() {
        assert_eq!(
            PlayerSetup::new("Leo", 0, AvatarId::Robot).check(),
            vec![SetupFault::AgeOutOfRange(0)]
        );
        assert_eq!(
            PlayerSetup::new("Leo", 120, AvatarId::Robot).check(),
            vec![SetupFault::AgeOutOfRange(120)]
        );
        assert!(PlayerSetup::new("Leo", 119, AvatarId::Robot).check().is_empty());
        assert!(PlayerSetup::new("Leo", 1, AvatarId::Robot).check().is_empty());
    }

    #[test]
    fn bad_entry_reports_every_fault() {
        let faults = PlayerSetup::new("", 0, AvatarId::Alien).check();
        assert_eq!(
            faults,
            vec![SetupFault::EmptyName, SetupFault::AgeOutOfRange(0)]
        );
    }

    #[test]
    fn from_setup_starts_at_origin() {
        let player = Player::from_setup(3, PlayerSetup::new("Mia", 34, AvatarId::Rocket));
        assert_eq!(player.id, 3);
        assert_eq!(player.position, 0);
        assert!(!player.skip_next_turn);
    }
}
