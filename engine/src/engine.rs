use serde::{Deserialize, Serialize};

use super::players::{Outcome, Side};

pub trait GameEngine {
    type Action;
    type State;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State;
    fn player_to_move(&self, game_state: &Self::State) -> Side;
    fn move_number(&self, game_state: &Self::State) -> usize;
    fn terminal_state(&self, game_state: &Self::State) -> Option<Outcome>;
}

pub trait ValidActions {
    type Action;
    type State;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action>;
}

/// Move features used to judge how sharp a line is.
pub trait TacticalFeatures {
    type Action;
    type State;

    /// Whether the side to move in `game_state` is in check.
    fn is_check(&self, game_state: &Self::State) -> bool;

    /// Whether `action`, played from `game_state`, captures a piece.
    fn is_capture(&self, game_state: &Self::State, action: &Self::Action) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// Descriptive features reported next to the risk of a position.
pub trait PositionFeatures {
    type Action;
    type State;

    fn phase(&self, game_state: &Self::State) -> GamePhase;

    /// How much there is to calculate in `game_state`, in `[0, 100]`.
    fn complexity(&self, game_state: &Self::State) -> f32;

    /// `action` written the way players of the game record it.
    fn notation(&self, game_state: &Self::State, action: &Self::Action) -> String;
}
