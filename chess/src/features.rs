use engine::GamePhase;
use shakmaty::{Board, CastlingMode, Chess, EnPassantMode, FromSetup, Position, Role};

use super::GameState;

const PIECE_VALUES: [(Role, usize); 5] = [
    (Role::Pawn, 100),
    (Role::Knight, 320),
    (Role::Bishop, 330),
    (Role::Rook, 500),
    (Role::Queen, 900),
];

/// Positions before this move number count as the opening.
const OPENING_MOVES: usize = 10;
/// Combined material above which a position is still a middlegame.
const MIDDLEGAME_MATERIAL: usize = 2500;

/// Material of both sides together, in centipawns.
pub fn total_material(board: &Board) -> usize {
    PIECE_VALUES
        .iter()
        .map(|&(role, value)| board.by_role(role).count() * value)
        .sum()
}

/// Legal move counts for the side to move and for its opponent. The
/// opponent's count is zero while the side to move is in check, since the
/// turn cannot be passed.
pub fn mobility(position: &Chess) -> (usize, usize) {
    let own = position.legal_moves().len();

    let mut setup = position.clone().into_setup(EnPassantMode::Legal);
    setup.turn = !setup.turn;
    setup.ep_square = None;

    let opponent = Chess::from_setup(setup, CastlingMode::Standard)
        .map(|passed| passed.legal_moves().len())
        .unwrap_or(0);

    (own, opponent)
}

/// Blend of pieces on the board, moves available to both sides and material.
pub fn complexity(game_state: &GameState) -> f32 {
    let position = game_state.position();
    let board = position.board();
    let (own, opponent) = mobility(position);

    let pieces = board.occupied().count() as f32;
    let mobility = (own + opponent) as f32;
    let material = total_material(board) as f32;

    ((pieces * 2.0 + mobility / 10.0 + material / 100.0) / 3.0).min(100.0)
}

pub fn phase(game_state: &GameState) -> GamePhase {
    if game_state.fullmoves() < OPENING_MOVES {
        GamePhase::Opening
    } else if total_material(game_state.position().board()) > MIDDLEGAME_MATERIAL {
        GamePhase::Middlegame
    } else {
        GamePhase::Endgame
    }
}
