//! Connected-component labelling of occupied sites.
//!
//! Two interchangeable strategies are provided:
//! - [`flood_fill`]: one iterative traversal per unlabelled occupied cell.
//! - [`hoshen_kopelman`]: a single raster scan with union-find over provisional
//!   labels, followed by a compaction pass.
//!
//! Both number clusters 1.. in the row-major order of each cluster's first
//! cell, and both produce the same partition and size table for a lattice.

use serde::{Deserialize, Serialize};

use crate::lattice::Lattice;

/// Labelling algorithm used by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Labeling {
    #[default]
    FloodFill,
    UnionFind,
}

impl Labeling {
    pub fn as_str(&self) -> &'static str {
        match self {
            Labeling::FloodFill => "flood-fill",
            Labeling::UnionFind => "union-find",
        }
    }
}

/// Label grid plus per-cluster sizes for one lattice.
///
/// `labels[i] == 0` marks an unoccupied cell; cluster `id` has `sizes[id - 1]` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLabels {
    n: usize,
    labels: Vec<u32>,
    sizes: Vec<usize>,
}

impl ClusterLabels {
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn label(&self, row: usize, col: usize) -> u32 {
        self.labels[row * self.n + col]
    }

    /// Cluster sizes indexed by `id - 1`. Background is not included.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn size_of(&self, id: u32) -> Option<usize> {
        (id as usize).checked_sub(1).and_then(|i| self.sizes.get(i)).copied()
    }

    pub fn cluster_count(&self) -> usize {
        self.sizes.len()
    }

    /// Largest cluster, 0 when nothing is occupied.
    pub fn max_size(&self) -> usize {
        self.sizes.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all cluster sizes. Equals the lattice's occupied count.
    pub fn total_cells(&self) -> usize {
        self.sizes.iter().sum()
    }
}

pub fn label_clusters(lattice: &Lattice, labeling: Labeling) -> ClusterLabels {
    match labeling {
        Labeling::FloodFill => flood_fill(lattice),
        Labeling::UnionFind => hoshen_kopelman(lattice),
    }
}

/// Reference labelling: explicit-stack traversal from every unlabelled occupied cell.
pub fn flood_fill(lattice: &Lattice) -> ClusterLabels {
    let cells = lattice.cells();
    let mut labels = vec![0u32; cells.len()];
    let mut sizes = Vec::new();
    let mut stack = Vec::new();

    for start in 0..cells.len() {
        if !cells[start] || labels[start] != 0 {
            continue;
        }
        sizes.push(0);
        let id = sizes.len() as u32;
        labels[start] = id;
        stack.push(start);

        let mut size = 0;
        while let Some(idx) = stack.pop() {
            size += 1;
            for next in lattice.occupied_neighbours(idx) {
                if labels[next] == 0 {
                    labels[next] = id;
                    stack.push(next);
                }
            }
        }
        sizes[id as usize - 1] = size;
    }

    ClusterLabels { n: lattice.n(), labels, sizes }
}

/// Hoshen-Kopelman: raster scan against the up/left neighbours, merging
/// provisional labels in a union-find forest, then compacting roots to 1..k.
pub fn hoshen_kopelman(lattice: &Lattice) -> ClusterLabels {
    let n = lattice.n();
    let cells = lattice.cells();

    // parent[0] is the background sentinel
    let mut parent: Vec<usize> = vec![0];
    let mut provisional = vec![0usize; cells.len()];

    for idx in 0..cells.len() {
        if !cells[idx] {
            continue;
        }
        let up = if idx >= n { provisional[idx - n] } else { 0 };
        let left = if idx % n > 0 { provisional[idx - 1] } else { 0 };

        provisional[idx] = match (up, left) {
            (0, 0) => {
                let fresh = parent.len();
                parent.push(fresh);
                fresh
            }
            (a, 0) | (0, a) => find(&mut parent, a),
            (a, b) => {
                let ra = find(&mut parent, a);
                let rb = find(&mut parent, b);
                let root = ra.min(rb);
                parent[ra.max(rb)] = root;
                root
            }
        };
    }

    let mut compact = vec![0u32; parent.len()];
    let mut labels = vec![0u32; cells.len()];
    let mut sizes: Vec<usize> = Vec::new();
    for idx in 0..cells.len() {
        if provisional[idx] == 0 {
            continue;
        }
        let root = find(&mut parent, provisional[idx]);
        if compact[root] == 0 {
            sizes.push(0);
            compact[root] = sizes.len() as u32;
        }
        let id = compact[root];
        labels[idx] = id;
        sizes[id as usize - 1] += 1;
    }

    ClusterLabels { n, labels, sizes }
}

/// Root lookup with path halving.
fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}
