//! Reward and penalty effect catalogs.
//!
//! Effects are tagged data interpreted by the turn engine, not callables
//! embedded in the board. Applying an effect is pure: current state in,
//! state delta out, no randomness.

use crate::locale::MessageKey;
use serde::{Deserialize, Serialize};

/// A single effect rule bound to a Reward or Penalty space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Move the acting player by a signed number of spaces.
    /// Positive for rewards, negative for penalties.
    Move(i8),
    /// The acting player rolls again instead of passing the turn.
    RollAgain,
    /// The acting player forfeits their next turn.
    SkipNextTurn,
    /// Message-only effect with no state change.
    NoOp,
}

/// Partial player-state delta produced by applying an effect.
///
/// Covers only position, the skip flag, and the roll-again marker;
/// effects never touch any player other than the acting one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectDelta {
    /// New position, already clamped to the board, if the effect moves.
    pub position: Option<usize>,
    /// Set the skip-next-turn flag.
    pub skip_next_turn: bool,
    /// The same player keeps the turn and rolls again.
    pub roll_again: bool,
}

impl Effect {
    /// Applies this effect to a player at `position` on a board whose
    /// final space is `last_index`, producing a delta.
    ///
    /// Movement clamps to `[0, last_index]`: penalties floor at the start
    /// space, rewards cannot overshoot the finish.
    pub fn apply(self, position: usize, last_index: usize) -> EffectDelta {
        match self {
            Effect::Move(delta) => {
                let moved = position.saturating_add_signed(delta as isize).min(last_index);
                EffectDelta {
                    position: Some(moved),
                    ..EffectDelta::default()
                }
            }
            Effect::RollAgain => EffectDelta {
                roll_again: true,
                ..EffectDelta::default()
            },
            Effect::SkipNextTurn => EffectDelta {
                skip_next_turn: true,
                ..EffectDelta::default()
            },
            Effect::NoOp => EffectDelta::default(),
        }
    }
}

/// An effect together with its localized message key, as bound to a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCard {
    /// The effect rule.
    pub effect: Effect,
    /// Key of the message shown when the effect triggers.
    pub message: MessageKey,
}

/// Ordered reward catalog, cycled across Reward spaces at board build time.
///
/// Slot 4 ("team up") describes moving a chosen second player in its
/// message, but its bound behavior is a no-op; there is no multi-target
/// effect.
pub const REWARDS: [Effect; 5] = [
    Effect::Move(3),
    Effect::Move(2),
    Effect::RollAgain,
    Effect::Move(1),
    Effect::NoOp,
];

/// Ordered penalty catalog, cycled across Penalty spaces at board build
/// time. Slot 3 ("pirate speak") is flavor text only.
pub const PENALTIES: [Effect; 5] = [
    Effect::Move(-2),
    Effect::SkipNextTurn,
    Effect::Move(-3),
    Effect::NoOp,
    Effect::Move(-1),
];

impl EffectCard {
    /// Returns the reward card for the given occurrence count.
    pub fn reward(occurrence: usize) -> Self {
        let slot = occurrence % REWARDS.len();
        Self {
            effect: REWARDS[slot],
            message: MessageKey::Reward(slot),
        }
    }

    /// Returns the penalty card for the given occurrence count.
    pub fn penalty(occurrence: usize) -> Self {
        let slot = occurrence % PENALTIES.len();
        Self {
            effect: PENALTIES[slot],
            message: MessageKey::Penalty(slot),
        }
    }
}
