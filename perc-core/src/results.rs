//! Tabular views of a finalized sweep, ready for export.

use std::fmt;

use serde::Serialize;

use crate::montecarlo::{SweepPoint, SweepResult};

/// One row of the averaged table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryRow {
    pub p: f64,
    pub percolation_probability: f64,
    pub mean_max_cluster_size: f64,
}

/// One row of a cluster-size distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributionRow {
    pub cluster_size: usize,
    pub occurrence_count: u64,
}

/// Size distribution observed at one swept p.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionTable {
    /// Sweep index this table belongs to.
    pub index: usize,
    pub p: f64,
    pub rows: Vec<DistributionRow>,
}

impl From<&SweepPoint> for SummaryRow {
    fn from(pt: &SweepPoint) -> Self {
        SummaryRow {
            p: pt.p,
            percolation_probability: pt.percolation_probability,
            mean_max_cluster_size: pt.mean_max_cluster_size,
        }
    }
}

// Two-decimal, double-space separated, as the averaged output file expects.
impl fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}  {:.2}  {:.2}",
            self.p, self.percolation_probability, self.mean_max_cluster_size
        )
    }
}

impl fmt::Display for DistributionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.cluster_size, self.occurrence_count)
    }
}

/// `(p, P_flow, <s_max>)` per swept p, ascending.
pub fn summary_table(result: &SweepResult) -> Vec<SummaryRow> {
    result.points.iter().map(SummaryRow::from).collect()
}

/// One distribution per swept p. Rows run from size 0 to the largest observed size.
pub fn distribution_tables(result: &SweepResult) -> Vec<DistributionTable> {
    result
        .points
        .iter()
        .enumerate()
        .map(|(index, pt)| DistributionTable {
            index,
            p: pt.p,
            rows: pt
                .size_histogram
                .iter()
                .enumerate()
                .map(|(cluster_size, &occurrence_count)| DistributionRow {
                    cluster_size,
                    occurrence_count,
                })
                .collect(),
        })
        .collect()
}
