use engine::{GamePhase, Side};
use serde::{Deserialize, Serialize};

use super::{Classification, ClassificationCounts, MoveAssessment, MoveClassifier, RiskProfile};

/// Everything learned about one played move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlyReport {
    pub ply_index: usize,
    pub move_number: usize,
    pub side: Side,
    pub action: String,
    /// `action` in the game's customary notation (SAN for chess).
    pub notation: String,
    /// Canonical state strings (FEN for chess) around the move.
    pub fen_before: String,
    pub fen_after: String,
    pub phase: GamePhase,
    /// Complexity of the position the move was played from.
    pub complexity: f32,
    /// The oracle's preferred move in the position before, when known.
    pub best_action: Option<String>,
    /// Absent when either surrounding position could not be evaluated.
    pub assessment: Option<MoveAssessment>,
    /// Risk of the position the move was played from.
    pub risk: RiskProfile,
}

impl PlyReport {
    pub fn matched_best(&self) -> bool {
        self.best_action.as_deref() == Some(self.action.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub moves: usize,
    pub assessed_moves: usize,
    pub accuracy: Option<f32>,
    pub average_centipawn_loss: Option<f32>,
    pub classifications: ClassificationCounts,
    pub best_move_matches: usize,
    pub average_risk_score: Option<f32>,
    pub max_risk_score: Option<f32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub total_moves: usize,
    pub total_blunders: usize,
    pub total_mistakes: usize,
    pub total_inaccuracies: usize,
    pub highest_risk_ply: Option<usize>,
    pub average_risk_score: Option<f32>,
    pub unknown_risk_positions: usize,
    /// One entry per phase the game reached, in game order.
    pub phases: Vec<PhaseSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: GamePhase,
    pub moves: usize,
    pub average_risk_score: Option<f32>,
    pub average_complexity: Option<f32>,
    pub blunders: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub plies: Vec<PlyReport>,
    pub white: PlayerSummary,
    pub black: PlayerSummary,
    pub summary: GameSummary,
    /// False when the analysis was cancelled before the last ply.
    pub complete: bool,
}

impl GameReport {
    pub fn assessments(&self) -> impl Iterator<Item = &MoveAssessment> {
        self.plies.iter().filter_map(|p| p.assessment.as_ref())
    }
}

/// Accumulates ply reports while a game is walked.
#[derive(Default)]
pub struct GameReportBuilder {
    plies: Vec<PlyReport>,
}

impl GameReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ply: PlyReport) {
        self.plies.push(ply);
    }

    pub fn finish(self, classifier: &MoveClassifier, complete: bool) -> GameReport {
        let white = summarize_player(&self.plies, Side::White, classifier);
        let black = summarize_player(&self.plies, Side::Black, classifier);
        let summary = summarize_game(&self.plies);

        GameReport {
            plies: self.plies,
            white,
            black,
            summary,
            complete,
        }
    }
}

fn summarize_player(plies: &[PlyReport], side: Side, classifier: &MoveClassifier) -> PlayerSummary {
    let plies = plies.iter().filter(|p| p.side == side).collect::<Vec<_>>();
    let assessments = plies
        .iter()
        .filter_map(|p| p.assessment.as_ref())
        .collect::<Vec<_>>();
    let losses = assessments.iter().map(|a| a.centipawn_loss).collect::<Vec<_>>();
    let risk_scores = plies
        .iter()
        .filter_map(|p| p.risk.risk_score())
        .collect::<Vec<_>>();

    PlayerSummary {
        moves: plies.len(),
        assessed_moves: assessments.len(),
        accuracy: classifier.accuracy(losses.iter().copied()),
        average_centipawn_loss: common::mean(&losses),
        classifications: assessments.iter().map(|a| a.classification).collect(),
        best_move_matches: plies.iter().filter(|p| p.matched_best()).count(),
        average_risk_score: common::mean(&risk_scores),
        max_risk_score: risk_scores.iter().cloned().reduce(f32::max),
    }
}

fn summarize_game(plies: &[PlyReport]) -> GameSummary {
    let counts = plies
        .iter()
        .filter_map(|p| p.assessment.as_ref())
        .map(|a| a.classification)
        .collect::<ClassificationCounts>();
    let risk_scores = plies
        .iter()
        .filter_map(|p| p.risk.risk_score())
        .collect::<Vec<_>>();

    let highest_risk_ply = plies
        .iter()
        .filter_map(|p| p.risk.risk_score().map(|score| (p.ply_index, score)))
        .fold(None, |best: Option<(usize, f32)>, (ply, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((ply, score)),
        })
        .map(|(ply, _)| ply);

    GameSummary {
        total_moves: plies.len(),
        total_blunders: counts.blunder,
        total_mistakes: counts.mistake,
        total_inaccuracies: counts.inaccuracy,
        highest_risk_ply,
        average_risk_score: common::mean(&risk_scores),
        unknown_risk_positions: plies.iter().filter(|p| p.risk.is_unknown()).count(),
        phases: summarize_phases(plies),
    }
}

fn summarize_phases(plies: &[PlyReport]) -> Vec<PhaseSummary> {
    let mut phases: Vec<GamePhase> = Vec::new();
    for ply in plies {
        if !phases.contains(&ply.phase) {
            phases.push(ply.phase);
        }
    }

    phases
        .into_iter()
        .map(|phase| {
            let plies = plies.iter().filter(|p| p.phase == phase).collect::<Vec<_>>();
            let risk_scores = plies
                .iter()
                .filter_map(|p| p.risk.risk_score())
                .collect::<Vec<_>>();
            let complexities = plies.iter().map(|p| p.complexity).collect::<Vec<_>>();

            PhaseSummary {
                phase,
                moves: plies.len(),
                average_risk_score: common::mean(&risk_scores),
                average_complexity: common::mean(&complexities),
                blunders: plies
                    .iter()
                    .filter_map(|p| p.assessment.as_ref())
                    .filter(|a| a.classification == Classification::Blunder)
                    .count(),
            }
        })
        .collect()
}
