//! Monte Carlo sweep over the occupation probability.
//!
//! For every swept p, T independent trials each generate a lattice, run the
//! spanning test and label clusters. Per-trial outcomes are folded into a
//! [`Tally`] of integer counters, so the finalized [`SweepPoint`] does not
//! depend on the order or the thread on which trials ran.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::burning::percolates;
use crate::clusters::{Labeling, label_clusters};
use crate::error::{PercolationError, Result};
use crate::lattice::{Lattice, cell_count};
use crate::params::SweepParams;

pub const DEFAULT_SEED: u64 = 123;

/// How the trials of one swept p are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Execution {
    Sequential,
    /// Trials run on the rayon pool. Falls back to sequential without the `parallel` feature.
    Parallel,
}

impl Default for Execution {
    fn default() -> Self {
        if cfg!(feature = "parallel") {
            Execution::Parallel
        } else {
            Execution::Sequential
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    pub seed: u64,
    pub execution: Execution,
    pub labeling: Labeling,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            execution: Execution::default(),
            labeling: Labeling::default(),
        }
    }
}

/// Outcome of a single trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    pub percolates: bool,
    /// 0 when the lattice has no occupied cell.
    pub max_cluster_size: usize,
    pub cluster_sizes: Vec<usize>,
}

/// Finalized statistics for one swept p.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub p: f64,
    pub percolation_probability: f64,
    /// Mean of the per-trial largest cluster over trials with at least one cluster.
    pub mean_max_cluster_size: f64,
    /// `size_histogram[s]` counts clusters of size `s` across all trials. Empty if none were seen.
    pub size_histogram: Vec<u64>,
    pub trials: u64,
    pub successes: u64,
    /// Trials that produced at least one cluster.
    pub clustered_trials: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub params: SweepParams,
    pub seed: u64,
    pub labeling: Labeling,
    /// Ascending by p; `points[i]` belongs to sweep index `i`.
    pub points: Vec<SweepPoint>,
    /// False when a stop signal cut the sweep short. `points` is then a finalized prefix.
    pub completed: bool,
}

/// Commutative accumulator for the trials of one swept p.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tally {
    trials: u64,
    successes: u64,
    max_sum: u64,
    clustered: u64,
    histogram: Vec<u64>,
}

impl Tally {
    fn record(&mut self, trial: TrialResult) {
        self.trials += 1;
        if trial.percolates {
            self.successes += 1;
        }
        if !trial.cluster_sizes.is_empty() {
            self.clustered += 1;
            self.max_sum += trial.max_cluster_size as u64;
        }
        for size in trial.cluster_sizes {
            if self.histogram.len() <= size {
                self.histogram.resize(size + 1, 0);
            }
            self.histogram[size] += 1;
        }
    }

    fn merge(mut self, other: Tally) -> Tally {
        self.trials += other.trials;
        self.successes += other.successes;
        self.max_sum += other.max_sum;
        self.clustered += other.clustered;
        if self.histogram.len() < other.histogram.len() {
            self.histogram.resize(other.histogram.len(), 0);
        }
        for (acc, count) in self.histogram.iter_mut().zip(other.histogram) {
            *acc += count;
        }
        self
    }

    fn finish(self, p: f64) -> SweepPoint {
        let mean_max_cluster_size = if self.clustered > 0 {
            self.max_sum as f64 / self.clustered as f64
        } else {
            0.0
        };
        SweepPoint {
            p,
            percolation_probability: self.successes as f64 / self.trials as f64,
            mean_max_cluster_size,
            size_histogram: self.histogram,
            trials: self.trials,
            successes: self.successes,
            clustered_trials: self.clustered,
        }
    }
}

/// Independent random stream for trial `trial` of sweep index `point`.
///
/// The sweep index is mixed into the seed and the trial index picks the
/// ChaCha stream, so no two trials of a sweep share a generator.
pub fn trial_rng(seed: u64, point: usize, trial: usize) -> ChaCha8Rng {
    let point_seed = seed ^ (point as u64).wrapping_mul(0x9E3779B97F4A7C15);
    let mut rng = ChaCha8Rng::seed_from_u64(point_seed);
    rng.set_stream(trial as u64);
    rng
}

/// Generate one lattice and analyse it.
pub fn run_trial<R: rand::Rng>(
    n: usize,
    p: f64,
    labeling: Labeling,
    rng: &mut R,
) -> Result<TrialResult> {
    let lattice = Lattice::generate(n, p, rng)?;
    analyse(&lattice, labeling)
}

/// Spanning test plus cluster labelling of an existing lattice.
pub fn analyse(lattice: &Lattice, labeling: Labeling) -> Result<TrialResult> {
    let clusters = label_clusters(lattice, labeling);

    let occupied = lattice.occupied_count();
    if clusters.total_cells() != occupied {
        return Err(PercolationError::InvariantViolation(format!(
            "cluster sizes sum to {} but {} cells are occupied",
            clusters.total_cells(),
            occupied
        )));
    }

    Ok(TrialResult {
        percolates: percolates(lattice),
        max_cluster_size: clusters.max_size(),
        cluster_sizes: clusters.sizes().to_vec(),
    })
}

/// Run all T trials of sweep index `index` and finalize the point.
pub fn run_point(params: &SweepParams, index: usize, options: &SweepOptions) -> Result<SweepPoint> {
    let p = params.p_at(index);
    let trial = |t: usize| {
        let mut rng = trial_rng(options.seed, index, t);
        run_trial(params.l, p, options.labeling, &mut rng)
    };

    let tally = match options.execution {
        #[cfg(feature = "parallel")]
        Execution::Parallel => {
            use rayon::prelude::*;
            (0..params.trials)
                .into_par_iter()
                .map(trial)
                .try_fold(Tally::default, |mut acc, r| {
                    acc.record(r?);
                    Ok::<_, PercolationError>(acc)
                })
                .try_reduce(Tally::default, |a, b| Ok(a.merge(b)))?
        }
        _ => {
            let mut acc = Tally::default();
            for t in 0..params.trials {
                acc.record(trial(t)?);
            }
            acc
        }
    };

    Ok(tally.finish(p))
}

/// Sweep with default options: fixed seed, default labelling and scheduling.
pub fn run_sweep(params: &SweepParams) -> Result<SweepResult> {
    run_sweep_with(params, &SweepOptions::default(), None)
}

/// Full sweep. `stop` is polled before each swept p; once set, the points
/// finalized so far are returned with `completed == false`.
pub fn run_sweep_with(
    params: &SweepParams,
    options: &SweepOptions,
    stop: Option<&AtomicBool>,
) -> Result<SweepResult> {
    run_sweep_until(params, options, |_| stop.is_some_and(|s| s.load(Ordering::Relaxed)))
}

/// Full sweep with an index-keyed stop check.
///
/// `should_stop(i)` is asked before sweep index `i` starts. Returning true
/// ends the sweep with points `0..i`, all finalized, and `completed == false`.
pub fn run_sweep_until<F>(
    params: &SweepParams,
    options: &SweepOptions,
    mut should_stop: F,
) -> Result<SweepResult>
where
    F: FnMut(usize) -> bool,
{
    params.validate()?;
    cell_count(params.l)?;

    let count = params.point_count();
    info!(
        l = params.l,
        trials = params.trials,
        p_min = params.p_min,
        p_max = params.p_max,
        dp = params.dp,
        points = count,
        seed = options.seed,
        labeling = options.labeling.as_str(),
        "starting percolation sweep"
    );

    let mut points = Vec::new();
    let mut completed = true;
    for index in 0..count {
        if should_stop(index) {
            warn!(done = index, total = count, "sweep stopped early");
            completed = false;
            break;
        }
        let point = run_point(params, index, options)?;
        debug!(
            p = point.p,
            percolation_probability = point.percolation_probability,
            mean_max_cluster_size = point.mean_max_cluster_size,
            "sweep point finalized"
        );
        points.push(point);
    }

    info!(points = points.len(), completed, "sweep finished");
    Ok(SweepResult {
        params: params.clone(),
        seed: options.seed,
        labeling: options.labeling,
        points,
        completed,
    })
}
