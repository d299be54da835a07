//! Closed-tour route optimizer.
//!
//! Solves the single-vehicle, fixed-depot, asymmetric TSP in two phases: a
//! greedy construction followed by first-improvement local search (2-opt and
//! relocate). Candidates are scanned in ascending index order and only a
//! strictly better candidate replaces the incumbent, so identical input
//! always produces an identical tour.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::SolveError;
use crate::matrix::DistanceMatrix;

/// Index of the depot in every matrix and tour.
pub const DEPOT: usize = 0;

/// Improvements smaller than this are treated as noise.
const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// How the initial tour is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FirstSolutionStrategy {
    /// Extend the path from its current end along the cheapest arc.
    #[default]
    PathCheapestArc,
    /// Insert the node/position pair with the smallest added distance.
    CheapestInsertion,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub first_solution: FirstSolutionStrategy,
    /// Run the local search phase after construction.
    pub improve: bool,
    /// Maximum number of local search passes.
    pub local_search_iterations: usize,
    /// Wall-clock budget for local search, checked between passes.
    pub time_limit: Option<Duration>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            first_solution: FirstSolutionStrategy::default(),
            improve: true,
            local_search_iterations: 1000,
            time_limit: None,
        }
    }
}

/// Why local search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Skipped,
    LocalOptimum,
    IterationLimit,
    TimeLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveStats {
    pub construction_distance: f64,
    pub improving_moves: usize,
    pub passes: usize,
    pub stop_reason: StopReason,
}

/// A closed tour over matrix indices: starts and ends at the depot and
/// visits every other index exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Wraps `stops` if it is a valid closed tour over `size` locations.
    pub fn new(stops: Vec<usize>, size: usize) -> Option<Self> {
        if size == 0 || stops.len() != size + 1 {
            return None;
        }
        if stops.first() != Some(&DEPOT) || stops.last() != Some(&DEPOT) {
            return None;
        }

        let mut seen = vec![false; size];
        for &stop in &stops[..size] {
            if stop >= size || seen[stop] {
                return None;
            }
            seen[stop] = true;
        }

        Some(Self(stops))
    }

    pub fn stops(&self) -> &[usize] {
        &self.0
    }

    /// Delivery stops in visiting order, without the depot at either end.
    pub fn deliveries(&self) -> &[usize] {
        &self.0[1..self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of matrix entries along consecutive tour edges.
    pub fn distance(&self, matrix: &DistanceMatrix) -> f64 {
        tour_distance(&self.0, matrix)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub tour: Tour,
    pub total_distance: f64,
    pub stats: SolveStats,
}

/// Validates raw rows and optimizes them.
pub fn optimize_rows(rows: Vec<Vec<f64>>, options: &SolveOptions) -> Result<Solution, SolveError> {
    let matrix = DistanceMatrix::from_rows(rows)?;
    optimize(&matrix, options)
}

/// Finds a short closed tour from the depot through every location.
pub fn optimize(matrix: &DistanceMatrix, options: &SolveOptions) -> Result<Solution, SolveError> {
    let size = matrix.size();
    debug!(size, strategy = ?options.first_solution, "unsolved");

    let mut stops = match options.first_solution {
        FirstSolutionStrategy::PathCheapestArc => path_cheapest_arc(matrix),
        FirstSolutionStrategy::CheapestInsertion => cheapest_insertion(matrix),
    }
    .ok_or(SolveError::NotFound)?;

    let construction_distance = tour_distance(&stops, matrix);
    debug!(distance = construction_distance, "constructed");

    let mut stats = SolveStats {
        construction_distance,
        improving_moves: 0,
        passes: 0,
        stop_reason: StopReason::Skipped,
    };

    if options.improve {
        local_search(&mut stops, matrix, options, &mut stats);
        debug!(
            moves = stats.improving_moves,
            passes = stats.passes,
            reason = ?stats.stop_reason,
            "improved"
        );
    }

    let tour = Tour::new(stops, size).ok_or(SolveError::NotFound)?;
    let total_distance = tour.distance(matrix);
    info!(stops = size, total_distance, "route optimized");

    Ok(Solution {
        tour,
        total_distance,
        stats,
    })
}

fn tour_distance(stops: &[usize], matrix: &DistanceMatrix) -> f64 {
    stops
        .windows(2)
        .fold(0.0, |total, edge| total + matrix.get(edge[0], edge[1]))
}

// ============================================================================
// Construction
// ============================================================================

fn path_cheapest_arc(matrix: &DistanceMatrix) -> Option<Vec<usize>> {
    let size = matrix.size();
    if size == 0 {
        return None;
    }

    let mut visited = vec![false; size];
    visited[DEPOT] = true;
    let mut stops = Vec::with_capacity(size + 1);
    stops.push(DEPOT);
    let mut current = DEPOT;

    for _ in 1..size {
        let mut best: Option<(usize, f64)> = None;
        for next in 0..size {
            if visited[next] {
                continue;
            }
            let cost = matrix.get(current, next);
            if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                best = Some((next, cost));
            }
        }

        let (next, _) = best?;
        visited[next] = true;
        stops.push(next);
        current = next;
    }

    stops.push(DEPOT);
    Some(stops)
}

fn cheapest_insertion(matrix: &DistanceMatrix) -> Option<Vec<usize>> {
    let size = matrix.size();
    if size == 0 {
        return None;
    }

    let mut inserted = vec![false; size];
    inserted[DEPOT] = true;
    let mut stops = Vec::with_capacity(size + 1);
    stops.extend([DEPOT, DEPOT]);

    for _ in 1..size {
        // (node, position, added distance)
        let mut best: Option<(usize, usize, f64)> = None;
        for node in 0..size {
            if inserted[node] {
                continue;
            }
            for position in 1..stops.len() {
                let prev = stops[position - 1];
                let next = stops[position];
                let delta =
                    matrix.get(prev, node) + matrix.get(node, next) - matrix.get(prev, next);
                if best.is_none_or(|(_, _, best_delta)| delta < best_delta) {
                    best = Some((node, position, delta));
                }
            }
        }

        let (node, position, _) = best?;
        inserted[node] = true;
        stops.insert(position, node);
    }

    Some(stops)
}

// ============================================================================
// Local Search Operators
// ============================================================================

/// 2-opt: reverse the segment `stops[i + 1..=j]`.
/// Returns true if an improvement was made.
///
/// Reversal flips the direction of every edge inside the segment, so the
/// delta includes the interior edges as well as the two exchanged ones.
fn two_opt_improve(stops: &mut Vec<usize>, matrix: &DistanceMatrix, current: &mut f64) -> bool {
    let last = stops.len() - 1;
    if last < 3 {
        return false;
    }

    for i in 0..last - 2 {
        for j in i + 2..last {
            let delta = reversal_delta(stops, matrix, i, j);
            if delta >= -IMPROVEMENT_EPSILON {
                continue;
            }

            let mut candidate = stops.clone();
            candidate[i + 1..=j].reverse();
            let cost = tour_distance(&candidate, matrix);
            if cost < *current {
                *stops = candidate;
                *current = cost;
                return true;
            }
        }
    }

    false
}

fn reversal_delta(stops: &[usize], matrix: &DistanceMatrix, i: usize, j: usize) -> f64 {
    let (a, b) = (stops[i], stops[j + 1]);
    let mut before = matrix.get(a, stops[i + 1]) + matrix.get(stops[j], b);
    let mut after = matrix.get(a, stops[j]) + matrix.get(stops[i + 1], b);
    for k in i + 1..j {
        before += matrix.get(stops[k], stops[k + 1]);
        after += matrix.get(stops[k + 1], stops[k]);
    }
    after - before
}

/// Relocate: move a single stop to another position in the tour.
/// Returns true if an improvement was made.
fn relocate_improve(stops: &mut Vec<usize>, matrix: &DistanceMatrix, current: &mut f64) -> bool {
    let last = stops.len() - 1;
    if last < 3 {
        return false;
    }

    for from in 1..last {
        let node = stops[from];
        let (prev, next) = (stops[from - 1], stops[from + 1]);
        let removal_gain = matrix.get(prev, node) + matrix.get(node, next) - matrix.get(prev, next);

        let mut reduced = stops.clone();
        reduced.remove(from);

        // Insert before reduced[to]; `to == from` recreates the original tour.
        for to in 1..reduced.len() {
            if to == from {
                continue;
            }
            let (u, v) = (reduced[to - 1], reduced[to]);
            let insertion_cost = matrix.get(u, node) + matrix.get(node, v) - matrix.get(u, v);
            if insertion_cost - removal_gain >= -IMPROVEMENT_EPSILON {
                continue;
            }

            let mut candidate = reduced.clone();
            candidate.insert(to, node);
            let cost = tour_distance(&candidate, matrix);
            if cost < *current {
                *stops = candidate;
                *current = cost;
                return true;
            }
        }
    }

    false
}

/// Run local search improvement until no more improvements, the pass limit
/// or the time limit is reached.
fn local_search(
    stops: &mut Vec<usize>,
    matrix: &DistanceMatrix,
    options: &SolveOptions,
    stats: &mut SolveStats,
) {
    let deadline = options.time_limit.map(|limit| Instant::now() + limit);
    let mut current = tour_distance(stops, matrix);
    stats.stop_reason = StopReason::IterationLimit;

    for _ in 0..options.local_search_iterations {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            stats.stop_reason = StopReason::TimeLimit;
            return;
        }

        stats.passes += 1;
        let mut improved = false;

        if two_opt_improve(stops, matrix, &mut current) {
            stats.improving_moves += 1;
            improved = true;
        }

        if relocate_improve(stops, matrix, &mut current) {
            stats.improving_moves += 1;
            improved = true;
        }

        if !improved {
            stats.stop_reason = StopReason::LocalOptimum;
            return;
        }
    }
}
