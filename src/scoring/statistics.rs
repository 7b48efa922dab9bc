use crate::error::ScoringError;
use crate::model::result::ScoreResult;

/// Per-cycle aggregate of species results, logged by the binary after each run.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSummary {
    pub species_count: u32,
    pub scored: u32,
    pub failed: u32,
    pub closed: u32,
    /// Mean over open, successfully scored species.
    pub mean_score: f32,
    /// Highest-scoring open species; the earlier one in the list wins ties.
    pub best: Option<(String, u8)>,
}

/// Compute summary statistics for one evaluation cycle.
pub fn summarize(results: &[Result<ScoreResult, ScoringError>]) -> CycleSummary {
    let mut scored = 0_u32;
    let mut failed = 0_u32;
    let mut closed = 0_u32;
    let mut total = 0.0_f64;
    let mut open = 0_u32;
    let mut best: Option<&ScoreResult> = None;

    for result in results {
        let Ok(r) = result else {
            failed += 1;
            continue;
        };
        scored += 1;
        if r.closed_season {
            closed += 1;
            continue;
        }
        open += 1;
        total += r.composite_score as f64;
        if best.is_none_or(|b| r.composite_score > b.composite_score) {
            best = Some(r);
        }
    }

    CycleSummary {
        species_count: results.len() as u32,
        scored,
        failed,
        closed,
        mean_score: if open == 0 {
            0.0
        } else {
            (total / open as f64) as f32
        },
        best: best.map(|r| (r.species_id.clone(), r.composite_score)),
    }
}
