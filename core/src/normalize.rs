/// Min-max rescaling of a score list into [0, 1], same length and order
/// as the input.
///
/// Degenerate inputs return an empty vector: an all-equal list (including
/// the single-element case) carries no ranking information to rescale,
/// and the empty result signals that distinctly from "no normalization
/// needed". Callers must check the length before indexing; the empty
/// result is deliberately not reinterpreted as "everything maps to 1.0".
pub fn min_max_normalize(scores: &[f64]) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return Vec::new();
    }
    scores
        .iter()
        .map(|score| (score - min) / (max - min))
        .collect()
}
