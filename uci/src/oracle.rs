use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use chess::{Action, GameState};
use engine::{Evaluation, OracleError, PositionOracle, ScoredAction};
use futures::future::try_join_all;
use log::{info, warn};
use tokio::sync::{Mutex, MutexGuard};

use super::{locate_engine, EngineProcess, SearchInfo, UciOptions};

/// A position oracle backed by a pool of UCI engine processes.
///
/// Each call takes the first idle process, looking from a round robin start,
/// and only waits when every process is busy. A process that fails, or whose
/// search was abandoned partway, is dropped, which kills it, and a fresh one
/// is started on the next call to its slot.
pub struct UciOracle {
    path: PathBuf,
    options: UciOptions,
    pool: Vec<Mutex<Option<EngineProcess>>>,
    next: AtomicUsize,
}

impl UciOracle {
    /// Locates the engine and starts every process of the pool.
    pub async fn start(options: UciOptions) -> Result<Self> {
        options.validate()?;
        let path = locate_engine(options.engine_path.as_deref())?;

        let processes = try_join_all(
            (0..options.pool_size).map(|_| EngineProcess::spawn(&path, &options)),
        )
        .await?;

        info!("Engine pool of {} ready", processes.len());

        Ok(Self {
            pool: processes.into_iter().map(|p| Mutex::new(Some(p))).collect(),
            path,
            options,
            next: AtomicUsize::new(0),
        })
    }

    async fn search(
        &self,
        game_state: &GameState,
        depth: usize,
        multipv: usize,
    ) -> Result<Vec<SearchInfo>, OracleError> {
        let start = self.next.fetch_add(1, Ordering::Relaxed) % self.pool.len();
        let (slot, mut process) = acquire(&self.pool, start).await;

        if process.as_ref().is_some_and(|p| p.is_interrupted()) {
            warn!("Engine process {} was interrupted mid-search, replacing it", slot);
            *process = None;
        }

        if process.is_none() {
            warn!("Restarting engine process {}", slot);
            let restarted = EngineProcess::spawn(&self.path, &self.options)
                .await
                .map_err(|err| OracleError::Unavailable(format!("{:#}", err)))?;
            *process = Some(restarted);
        }

        let Some(running) = process.as_mut() else {
            return Err(OracleError::Unavailable("engine process missing".to_string()));
        };

        match running.search(&game_state.fen(), depth, multipv).await {
            Ok(lines) => Ok(lines),
            Err(err) => {
                warn!("Engine process {} failed: {:#}", slot, err);
                *process = None;
                Err(OracleError::Unavailable(format!("{:#}", err)))
            }
        }
    }
}

/// Locks the first free slot at or after `start`, wrapping around, or waits
/// for `start` when all of them are taken.
async fn acquire<T>(pool: &[Mutex<T>], start: usize) -> (usize, MutexGuard<'_, T>) {
    for offset in 0..pool.len() {
        let slot = (start + offset) % pool.len();
        if let Ok(guard) = pool[slot].try_lock() {
            return (slot, guard);
        }
    }

    (start, pool[start].lock().await)
}

impl PositionOracle for UciOracle {
    type State = GameState;
    type Action = Action;

    async fn evaluate(&self, game_state: &GameState, depth: usize) -> Result<Evaluation, OracleError> {
        self.search(game_state, depth, 1)
            .await?
            .into_iter()
            .find_map(|line| line.score)
            .map(|score| score.to_evaluation())
            .ok_or_else(|| OracleError::Unavailable("engine reported no score".to_string()))
    }

    async fn top_moves(
        &self,
        game_state: &GameState,
        depth: usize,
        k: usize,
    ) -> Result<Vec<ScoredAction<Action>>, OracleError> {
        let lines = self.search(game_state, depth, k).await?;

        Ok(scored_actions(lines, game_state, k))
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.pool.len())
    }
}

/// Pairs each line's first move with its score. Lines without a move or
/// whose move cannot be read in `game_state` are skipped.
fn scored_actions(lines: Vec<SearchInfo>, game_state: &GameState, k: usize) -> Vec<ScoredAction<Action>> {
    lines
        .into_iter()
        .filter_map(|line| {
            let score = line.score?;
            let uci = line.pv.first()?;
            match Action::from_uci(uci, game_state) {
                Ok(action) => Some(ScoredAction::new(action, score.to_evaluation())),
                Err(err) => {
                    warn!("Skipping engine line: {:#}", err);
                    None
                }
            }
        })
        .take(k)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_engine_line, EngineOutput};
    use engine::GameState as GameStateTrait;
    use std::time::Duration;

    fn info(line: &str) -> SearchInfo {
        match parse_engine_line(line) {
            EngineOutput::Info(info) => info,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_scored_actions_keep_engine_order() {
        let lines = vec![
            info("info depth 10 multipv 1 score cp 30 pv e2e4 e7e5"),
            info("info depth 10 multipv 2 score cp 22 pv d2d4"),
            info("info depth 10 multipv 3 score cp 15 pv g1f3"),
        ];

        let scored = scored_actions(lines, &GameState::initial(), 2);

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].action.to_string(), "e2e4");
        assert_eq!(scored[0].evaluation, Evaluation::Centipawns(30));
        assert_eq!(scored[1].action.to_string(), "d2d4");
    }

    #[tokio::test]
    async fn test_acquire_skips_busy_slots() {
        let pool = vec![Mutex::new(10), Mutex::new(11), Mutex::new(12)];

        let (first, first_guard) = acquire(&pool, 0).await;
        let (second, second_guard) = acquire(&pool, 0).await;
        let (third, third_guard) = acquire(&pool, 2).await;

        assert_eq!((first, *first_guard), (0, 10));
        assert_eq!((second, *second_guard), (1, 11));
        assert_eq!((third, *third_guard), (2, 12));
    }

    #[tokio::test]
    async fn test_acquire_waits_when_every_slot_is_busy() {
        let pool = vec![Mutex::new(0), Mutex::new(1)];
        let held = pool[1].lock().await;
        let other = pool[0].lock().await;

        let waiting = tokio::time::timeout(Duration::from_millis(20), acquire(&pool, 1)).await;
        assert!(waiting.is_err());

        drop(held);
        let (slot, guard) = acquire(&pool, 1).await;
        assert_eq!((slot, *guard), (1, 1));
        drop(other);
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let lines = vec![
            info("info depth 10 multipv 1 score cp 30 pv e2e5"),
            info("info depth 10 multipv 2 score mate 3"),
            info("info depth 10 multipv 3 score cp 5 pv b1c3"),
        ];

        let scored = scored_actions(lines, &GameState::initial(), 3);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].action.to_string(), "b1c3");
    }
}
