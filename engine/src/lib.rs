pub mod engine;
pub mod evaluation;
pub mod game_record;
pub mod game_state;
pub mod oracle;
pub mod players;

pub use crate::engine::*;
pub use crate::evaluation::*;
pub use crate::game_record::*;
pub use crate::game_state::*;
pub use crate::oracle::*;
pub use crate::players::*;
