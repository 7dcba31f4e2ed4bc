pub mod action;
pub mod engine;
pub mod features;
pub mod game_state;
pub mod pgn;

pub use action::*;
pub use engine::*;
pub use game_state::*;
pub use pgn::*;
