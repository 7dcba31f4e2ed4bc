use engine::{
    GameEngine, GamePhase, Outcome, PositionFeatures, Side, TacticalFeatures, ValidActions,
};

use super::{features, Action, GameState};

#[derive(Default)]
pub struct Engine {}

impl Engine {
    pub fn new() -> Self {
        Self {}
    }
}

impl GameEngine for Engine {
    type Action = Action;
    type State = GameState;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        game_state.play(action)
    }

    fn player_to_move(&self, game_state: &Self::State) -> Side {
        game_state.turn()
    }

    fn move_number(&self, game_state: &Self::State) -> usize {
        game_state.fullmoves()
    }

    fn terminal_state(&self, game_state: &Self::State) -> Option<Outcome> {
        game_state.outcome()
    }
}

impl ValidActions for Engine {
    type Action = Action;
    type State = GameState;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        game_state.legal_actions()
    }
}

impl TacticalFeatures for Engine {
    type Action = Action;
    type State = GameState;

    fn is_check(&self, game_state: &Self::State) -> bool {
        game_state.is_check()
    }

    fn is_capture(&self, _game_state: &Self::State, action: &Self::Action) -> bool {
        action.is_capture()
    }
}

impl PositionFeatures for Engine {
    type Action = Action;
    type State = GameState;

    fn phase(&self, game_state: &Self::State) -> GamePhase {
        features::phase(game_state)
    }

    fn complexity(&self, game_state: &Self::State) -> f32 {
        features::complexity(game_state)
    }

    fn notation(&self, game_state: &Self::State, action: &Self::Action) -> String {
        action.to_san(game_state)
    }
}
