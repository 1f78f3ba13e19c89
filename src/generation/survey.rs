//! Monte-Carlo survey of the generator over many seeds.
//!
//! Every seed gets its own RNG, so the sweep runs in parallel and still
//! reports the same numbers for the same seed range.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::graph::{generate_layout, max_target};
use super::DungeonSeed;
use crate::config::GenerationTuning;
use crate::constants::MAX_GRID_DIMENSION;
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    pub dim: i32,
    pub samples: usize,
    pub failures: usize,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub mean_rooms: f64,
    pub mean_attempts: f64,
    /// Upper bound of the room count for this dimension
    pub max_target: usize,
}

/// Generate one layout per seed in `seeds` on a `dim` grid, floor `floor`
pub fn survey(
    dim: i32,
    floor: u32,
    seeds: std::ops::Range<u64>,
    tuning: &GenerationTuning,
) -> CoreResult<SurveyReport> {
    if !(1..=MAX_GRID_DIMENSION).contains(&dim) {
        return Err(CoreError::InvalidArgument(format!(
            "grid dimension must be within 1..={MAX_GRID_DIMENSION}, got {dim}"
        )));
    }

    let outcomes: Vec<Option<(usize, u32)>> = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = DungeonSeed::new(seed).floor_rng(floor);
            generate_layout(dim, tuning, &mut rng)
                .ok()
                .map(|layout| (layout.room_count(), layout.attempts))
        })
        .collect();

    let samples = outcomes.len();
    let done: Vec<(usize, u32)> = outcomes.into_iter().flatten().collect();
    let failures = samples - done.len();
    let count = done.len().max(1) as f64;

    Ok(SurveyReport {
        dim,
        samples,
        failures,
        min_rooms: done.iter().map(|d| d.0).min().unwrap_or(0),
        max_rooms: done.iter().map(|d| d.0).max().unwrap_or(0),
        mean_rooms: done.iter().map(|d| d.0 as f64).sum::<f64>() / count,
        mean_attempts: done.iter().map(|d| d.1 as f64).sum::<f64>() / count,
        max_target: max_target(dim),
    })
}
