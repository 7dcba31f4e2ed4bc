use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use engine::{
    Evaluation, GameEngine, GamePhase, GameRecord, GameState, OracleError, Outcome,
    PositionFeatures, PositionOracle, ScoredAction, Side, TacticalFeatures, ValidActions,
};

/// Centipawns that one point of count is worth to the side ahead.
pub const COUNT_SCALE: i32 = 150;
/// The count at which a side has won.
pub const WINNING_COUNT: i32 = 10;
/// A count this far from zero puts the side to move "in check".
pub const CHECK_COUNT: i32 = 5;
const MAX_PLIES: usize = 200;

/// A two player race: White pushes the count up, Black pushes it down.
#[derive(Hash, PartialEq, Eq, Clone, Debug)]
pub struct CountingGameState {
    pub count: i32,
    pub white_to_move: bool,
    pub ply: usize,
}

impl CountingGameState {
    pub fn new(count: i32, white_to_move: bool) -> Self {
        Self {
            count,
            white_to_move,
            ply: 0,
        }
    }

    fn side_to_move(&self) -> Side {
        if self.white_to_move {
            Side::White
        } else {
            Side::Black
        }
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.count >= WINNING_COUNT {
            Some(Outcome::Decisive {
                winner: Side::White,
            })
        } else if self.count <= -WINNING_COUNT {
            Some(Outcome::Decisive {
                winner: Side::Black,
            })
        } else if self.ply >= MAX_PLIES {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Value for the side to move under best play. White is one count ahead
    /// of its due while Black has yet to answer, so both sides advancing
    /// keeps the value level.
    fn evaluation(&self) -> Evaluation {
        if let Some(outcome) = self.outcome() {
            return Evaluation::from_outcome(outcome, self.side_to_move());
        }

        let tempo = if self.white_to_move { 0 } else { COUNT_SCALE };

        Evaluation::Centipawns(self.count * COUNT_SCALE - tempo)
            .relative_to(Side::White, self.side_to_move())
    }
}

impl GameState for CountingGameState {
    fn initial() -> Self {
        Self::new(0, true)
    }
}

impl Display for CountingGameState {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.count, self.ply)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum CountingAction {
    Advance,
    Hold,
    Retreat,
    Blunder,
    /// Never legal; only a misbehaving oracle proposes it.
    Leap,
}

impl CountingAction {
    const LEGAL: [CountingAction; 4] = [
        CountingAction::Advance,
        CountingAction::Hold,
        CountingAction::Retreat,
        CountingAction::Blunder,
    ];

    fn delta(&self) -> i32 {
        match self {
            CountingAction::Advance => 1,
            CountingAction::Hold => 0,
            CountingAction::Retreat => -1,
            CountingAction::Blunder => -3,
            CountingAction::Leap => 5,
        }
    }
}

impl Display for CountingAction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            CountingAction::Advance => "advance",
            CountingAction::Hold => "hold",
            CountingAction::Retreat => "retreat",
            CountingAction::Blunder => "blunder",
            CountingAction::Leap => "leap",
        };

        write!(f, "{}", name)
    }
}

pub struct CountingGameEngine {}

impl CountingGameEngine {
    pub fn new() -> Self {
        Self {}
    }
}

impl GameEngine for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn take_action(&self, game_state: &Self::State, action: &Self::Action) -> Self::State {
        let direction = if game_state.white_to_move { 1 } else { -1 };

        Self::State {
            count: game_state.count + direction * action.delta(),
            white_to_move: !game_state.white_to_move,
            ply: game_state.ply + 1,
        }
    }

    fn player_to_move(&self, game_state: &Self::State) -> Side {
        game_state.side_to_move()
    }

    fn move_number(&self, game_state: &Self::State) -> usize {
        game_state.ply / 2 + 1
    }

    fn terminal_state(&self, game_state: &Self::State) -> Option<Outcome> {
        game_state.outcome()
    }
}

impl ValidActions for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn valid_actions(&self, game_state: &Self::State) -> Vec<Self::Action> {
        if game_state.outcome().is_some() {
            return Vec::new();
        }

        CountingAction::LEGAL.to_vec()
    }
}

impl TacticalFeatures for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn is_check(&self, game_state: &Self::State) -> bool {
        game_state.count.abs() >= CHECK_COUNT
    }

    fn is_capture(&self, _game_state: &Self::State, action: &Self::Action) -> bool {
        *action == CountingAction::Blunder
    }
}

impl PositionFeatures for CountingGameEngine {
    type Action = CountingAction;
    type State = CountingGameState;

    fn phase(&self, game_state: &Self::State) -> GamePhase {
        if game_state.ply < 20 {
            GamePhase::Opening
        } else if game_state.count.abs() <= CHECK_COUNT {
            GamePhase::Middlegame
        } else {
            GamePhase::Endgame
        }
    }

    fn complexity(&self, game_state: &Self::State) -> f32 {
        ((WINNING_COUNT - game_state.count.abs()).max(0) * 10) as f32
    }

    fn notation(&self, _game_state: &Self::State, action: &Self::Action) -> String {
        action.to_string()
    }
}

/// A deterministic oracle for the counting game. Candidate moves are scored
/// by the value of the position they lead to, so the best candidate always
/// carries the value of the position itself.
pub struct CountingOracle {
    unavailable: bool,
    sampling_unavailable: bool,
    propose_illegal: bool,
    delay: Option<Duration>,
    slow_ply: Option<(usize, Duration)>,
    failing_ply: Option<usize>,
    capacity: Option<usize>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl CountingOracle {
    pub fn new() -> Self {
        Self {
            unavailable: false,
            sampling_unavailable: false,
            propose_illegal: false,
            delay: None,
            slow_ply: None,
            failing_ply: None,
            capacity: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Every call fails as if the engine process could not be started.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new()
        }
    }

    /// `evaluate` and multi-candidate requests fail while single best-move
    /// requests succeed, so positions can be scored but not sampled.
    pub fn with_sampling_unavailable(self) -> Self {
        Self {
            sampling_unavailable: true,
            ..self
        }
    }

    pub fn proposing_illegal_moves(self) -> Self {
        Self {
            propose_illegal: true,
            ..self
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    /// Calls about positions at `ply` take `delay` longer.
    pub fn slow_at(self, ply: usize, delay: Duration) -> Self {
        Self {
            slow_ply: Some((ply, delay)),
            ..self
        }
    }

    /// Calls about positions at `ply` fail as if the engine process died.
    pub fn failing_at(self, ply: usize) -> Self {
        Self {
            failing_ply: Some(ply),
            ..self
        }
    }

    /// Advertises that at most `capacity` calls can be served at once.
    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..self
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The largest number of calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn call(&self, game_state: &CountingGameState, sampling: bool) -> Result<(), OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        self.respond(game_state, sampling).await
    }

    async fn respond(
        &self,
        game_state: &CountingGameState,
        sampling: bool,
    ) -> Result<(), OracleError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((ply, delay)) = self.slow_ply {
            if game_state.ply == ply {
                tokio::time::sleep(delay).await;
            }
        }

        if self.unavailable
            || (sampling && self.sampling_unavailable)
            || self.failing_ply == Some(game_state.ply)
        {
            return Err(OracleError::Unavailable("counting oracle offline".to_string()));
        }

        Ok(())
    }
}

impl PositionOracle for CountingOracle {
    type State = CountingGameState;
    type Action = CountingAction;

    async fn evaluate(
        &self,
        game_state: &Self::State,
        _depth: usize,
    ) -> Result<Evaluation, OracleError> {
        self.call(game_state, true).await?;

        Ok(game_state.evaluation())
    }

    async fn top_moves(
        &self,
        game_state: &Self::State,
        _depth: usize,
        k: usize,
    ) -> Result<Vec<ScoredAction<Self::Action>>, OracleError> {
        self.call(game_state, k > 1).await?;

        let engine = CountingGameEngine::new();
        let mover = game_state.side_to_move();
        let mut actions = engine.valid_actions(game_state);
        if self.propose_illegal && !actions.is_empty() {
            actions.insert(0, CountingAction::Leap);
        }

        let mut scored = actions
            .into_iter()
            .map(|action| {
                let child = engine.take_action(game_state, &action);
                let evaluation = child.evaluation().relative_to(child.side_to_move(), mover);
                ScoredAction::new(action, evaluation)
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| b.evaluation.score().total_cmp(&a.evaluation.score()));
        scored.truncate(k);

        Ok(scored)
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

/// Releases an in-flight slot even when the call is dropped at a deadline.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Plays `actions` from the initial position into a game record.
pub fn play_game(actions: &[CountingAction]) -> GameRecord<CountingGameState, CountingAction> {
    let engine = CountingGameEngine::new();
    let mut game = GameRecord::new(CountingGameState::initial());

    for action in actions {
        game.push(*action, |state, action| engine.take_action(state, action));
    }

    game
}
