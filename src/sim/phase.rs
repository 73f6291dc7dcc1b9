//! Game phase state machine
//!
//! `Menu` -> `Playing` on start, `Playing` -> `GameOver` | `Victory` by the
//! rules, and a terminal phase back to `Playing` only on an explicit start.

use serde::{Deserialize, Serialize};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, before the first session
    #[default]
    Menu,
    /// Active session
    Playing,
    /// Health ran out
    GameOver,
    /// Score reached the win threshold
    Victory,
}

impl GamePhase {
    /// Run ended (either way)
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }

    /// Whether the start verb is accepted from this phase
    pub fn can_start(self) -> bool {
        self != GamePhase::Playing
    }

    /// Whether the host should keep scheduling frames
    pub fn wants_frames(self) -> bool {
        self == GamePhase::Playing
    }

    /// Transition driven by the game rules; only a live session can end
    pub fn finish(self, outcome: GamePhase) -> GamePhase {
        debug_assert!(outcome.is_terminal());
        if self == GamePhase::Playing {
            outcome
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "gameover",
            GamePhase::Victory => "victory",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_accepted_outside_sessions() {
        assert!(GamePhase::Menu.can_start());
        assert!(GamePhase::GameOver.can_start());
        assert!(GamePhase::Victory.can_start());
        assert!(!GamePhase::Playing.can_start());
    }

    #[test]
    fn test_first_terminal_outcome_wins() {
        let phase = GamePhase::Playing.finish(GamePhase::Victory);
        assert_eq!(phase, GamePhase::Victory);
        assert_eq!(phase.finish(GamePhase::GameOver), GamePhase::Victory);
    }

    #[test]
    fn test_menu_never_finishes() {
        assert_eq!(GamePhase::Menu.finish(GamePhase::GameOver), GamePhase::Menu);
    }

    #[test]
    fn test_only_playing_wants_frames() {
        assert!(GamePhase::Playing.wants_frames());
        assert!(!GamePhase::Menu.wants_frames());
        assert!(!GamePhase::Victory.wants_frames());
    }
}
