//! The fixed linear board: 43 spaces from Start to Finish.
//!
//! The board is built once from a static layout template and never
//! mutates. Reward and penalty spaces bind their effect card at
//! construction time by cycling the catalogs in left-to-right occurrence
//! order, so `space_at` is idempotent: no per-visit randomness.

use crate::effects::EffectCard;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of spaces on the standard board (start + 41 path spaces + finish).
pub const BOARD_SIZE: usize = 43;

/// Category of a board space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpaceKind {
    /// Index 0, where every player begins.
    Start,
    /// Consults the challenge oracle when landed on.
    Challenge,
    /// Applies the bound reward effect when landed on.
    Reward,
    /// Applies the bound penalty effect when landed on.
    Penalty,
    /// Last index; reaching it wins the game.
    Finish,
}

/// One space on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    /// Position of this space on the path.
    pub index: usize,
    /// Category of the space.
    pub kind: SpaceKind,
    /// Effect bound at construction; present exactly on Reward/Penalty.
    pub card: Option<EffectCard>,
}

/// Layout template for the standard board.
const LAYOUT: [SpaceKind; BOARD_SIZE] = {
    use SpaceKind::{Challenge as C, Penalty as P, Reward as R};
    [
        SpaceKind::Start,
        C, C, R, C, P, C, C, R, C, C, // 1-10
        P, C, C, R, C, C, C, P, C, R, // 11-20
        C, C, P, C, R, C, C, C, P, C, // 21-30
        C, R, C, C, P, C, C, R, C, C, // 31-40
        P, // 41
        SpaceKind::Finish,
    ]
};

/// The immutable game board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    spaces: Vec<Space>,
}

impl Board {
    /// Builds the standard 43-space board from the layout template.
    #[instrument]
    pub fn standard() -> Self {
        let mut rewards_seen = 0;
        let mut penalties_seen = 0;
        let spaces = LAYOUT
            .iter()
            .enumerate()
            .map(|(index, &kind)| {
                let card = match kind {
                    SpaceKind::Reward => {
                        let card = EffectCard::reward(rewards_seen);
                        rewards_seen += 1;
                        Some(card)
                    }
                    SpaceKind::Penalty => {
                        let card = EffectCard::penalty(penalties_seen);
                        penalties_seen += 1;
                        Some(card)
                    }
                    _ => None,
                };
                Space { index, kind, card }
            })
            .collect();
        Self { spaces }
    }

    /// Returns the space at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::OutOfRange`] when `index` is not on the
    /// board. Passing such an index is a caller contract violation.
    pub fn space_at(&self, index: usize) -> Result<&Space, BoardError> {
        self.spaces.get(index).ok_or(BoardError::OutOfRange {
            index,
            len: self.spaces.len(),
        })
    }

    /// Number of spaces on the board.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    /// Returns true if the board has no spaces. Never true for
    /// [`Board::standard`].
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Index of the Finish space.
    pub fn last_index(&self) -> usize {
        self.spaces.len() - 1
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

/// Board access error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Index is outside the board.
    #[display("space index {} out of range (board has {} spaces)", index, len)]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// Number of spaces on the board.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::locale::MessageKey;

    #[test]
    fn standard_board_has_one_start_and_one_finish() {
        let board = Board::standard();
        assert_eq!(board.len(), BOARD_SIZE);
        assert_eq!(board.space_at(0).unwrap().kind, SpaceKind::Start);
        assert_eq!(
            board.space_at(board.last_index()).unwrap().kind,
            SpaceKind::Finish
        );
        let starts = (0..board.len())
            .filter(|&i| board.space_at(i).unwrap().kind == SpaceKind::Start)
            .count();
        let finishes = (0..board.len())
            .filter(|&i| board.space_at(i).unwrap().kind == SpaceKind::Finish)
            .count();
        assert_eq!((starts, finishes), (1, 1));
    }

    #[test]
    fn cards_bound_exactly_on_reward_and_penalty() {
        let board = Board::standard();
        for i in 0..board.len() {
            let space = board.space_at(i).unwrap();
            match space.kind {
                SpaceKind::Reward | SpaceKind::Penalty => assert!(space.card.is_some()),
                _ => assert!(space.card.is_none()),
            }
        }
    }

    #[test]
    fn effect_cycling_follows_occurrence_order() {
        let board = Board::standard();
        // First three reward spaces are 3, 8, 14 in the template.
        assert_eq!(
            board.space_at(3).unwrap().card.unwrap().effect,
            Effect::Move(3)
        );
        assert_eq!(
            board.space_at(8).unwrap().card.unwrap().effect,
            Effect::Move(2)
        );
        assert_eq!(
            board.space_at(14).unwrap().card.unwrap().effect,
            Effect::RollAgain
        );
        // First two penalty spaces are 5 and 11.
        assert_eq!(
            board.space_at(5).unwrap().card.unwrap().effect,
            Effect::Move(-2)
        );
        assert_eq!(
            board.space_at(11).unwrap().card.unwrap().effect,
            Effect::SkipNextTurn
        );
        // Sixth reward space wraps back to the first catalog slot.
        let reward_indices: Vec<usize> = (0..board.len())
            .filter(|&i| board.space_at(i).unwrap().kind == SpaceKind::Reward)
            .collect();
        assert_eq!(
            board.space_at(reward_indices[5]).unwrap().card.unwrap().message,
            MessageKey::Reward(0)
        );
    }

    #[test]
    fn lookup_is_idempotent() {
        let board = Board::standard();
        for i in 0..board.len() {
            assert_eq!(board.space_at(i).unwrap(), board.space_at(i).unwrap());
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let board = Board::standard();
        assert_eq!(
            board.space_at(BOARD_SIZE),
            Err(BoardError::OutOfRange {
                index: BOARD_SIZE,
                len: BOARD_SIZE
            })
        );
    }
}
