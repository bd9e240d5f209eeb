//! # perc-core
//!
//! Site percolation on an L×L square lattice.
//!
//! Each cell is occupied independently with probability p. A lattice
//! *percolates* when an occupied 4-connected path joins the top row to the
//! bottom row. The sweep estimates, for every p in `p0..=pk` step `dp`, the
//! spanning probability, the mean size of the largest cluster and the
//! cluster-size distribution from T independent trials.
//!
//! Every trial draws from its own seeded ChaCha stream, so a sweep is
//! reproducible and gives identical results sequentially or on the rayon pool.

pub mod burning;
pub mod clusters;
pub mod error;
pub mod lattice;
pub mod montecarlo;
pub mod params;
pub mod results;

pub use burning::percolates;
pub use clusters::{ClusterLabels, Labeling, flood_fill, hoshen_kopelman, label_clusters};
pub use error::{PercolationError, Result};
pub use lattice::{Lattice, MAX_LATTICE_CELLS};
pub use montecarlo::{
    Execution, SweepOptions, SweepPoint, SweepResult, TrialResult, run_sweep, run_sweep_until,
    run_sweep_with, trial_rng,
};
pub use params::{MAX_SWEEP_POINTS, SweepParams};
pub use results::{DistributionRow, DistributionTable, SummaryRow, distribution_tables, summary_table};
