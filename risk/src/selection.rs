use common::softmax;
use engine::ScoredAction;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Picks one of `candidates`, weighting each by `softmax(-loss / temperature)`
/// where `loss` is how far the candidate scores below the best one. Lower
/// temperatures concentrate on the strongest moves.
///
/// Returns `None` only when there are no candidates.
pub fn select_candidate<A, R: Rng + ?Sized>(
    candidates: &[ScoredAction<A>],
    temperature: f32,
    rng: &mut R,
) -> Option<usize> {
    match candidates.len() {
        0 => return None,
        1 => return Some(0),
        _ => {}
    }

    let scores = candidates
        .iter()
        .map(|c| c.evaluation.score())
        .collect::<Vec<_>>();
    let best = scores.iter().cloned().fold(f32::MIN, f32::max);
    let negative_losses = scores.iter().map(|s| s - best).collect::<Vec<_>>();
    let weights = softmax(&negative_losses, temperature);

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(dist.sample(rng)),
        Err(_) => Some(argmax(&scores)),
    }
}

/// How far the best candidate scores above the second best, from the
/// perspective of the side choosing. `None` with fewer than two candidates.
pub fn candidate_edge<A>(candidates: &[ScoredAction<A>]) -> Option<f32> {
    let mut scores = candidates
        .iter()
        .map(|c| c.evaluation.score())
        .collect::<Vec<_>>();
    if scores.len() < 2 {
        return None;
    }

    scores.sort_by(|a, b| b.total_cmp(a));

    Some(scores[0] - scores[1])
}

fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |(best_i, best), (i, &s)| {
            if s > best {
                (i, s)
            } else {
                (best_i, best)
            }
        })
        .0
}
