use perc_core::{
    Execution, Labeling, Lattice, PercolationError, SweepOptions, SweepParams, SweepResult,
    label_clusters, percolates, run_sweep_with, trial_rng,
};
use wasm_bindgen::prelude::*;

/// One lattice at a time, for interactive inspection from the browser.
#[wasm_bindgen]
pub struct Percolation {
    n: usize,
    seed: u64,
    draws: usize,
    lattice: Lattice,
    labeling: Labeling,
}

#[wasm_bindgen]
impl Percolation {
    #[wasm_bindgen(constructor)]
    pub fn new(n: usize, seed: u64) -> Result<Percolation, JsValue> {
        let lattice = Lattice::from_occupied(n, &[]).map_err(to_js)?;
        Ok(Percolation { n, seed, draws: 0, lattice, labeling: Labeling::FloodFill })
    }

    pub fn set_union_find(&mut self, on: bool) {
        self.labeling = if on { Labeling::UnionFind } else { Labeling::FloodFill };
    }

    /// Draw a fresh lattice at occupation probability `p`.
    pub fn generate(&mut self, p: f64) -> Result<(), JsValue> {
        let mut rng = trial_rng(self.seed, 0, self.draws);
        self.lattice = Lattice::generate(self.n, p, &mut rng).map_err(to_js)?;
        self.draws += 1;
        Ok(())
    }

    pub fn n(&self) -> usize { self.n }

    pub fn percolates(&self) -> bool { percolates(&self.lattice) }

    // Copy-based JS access (reliable)
    pub fn get_cells(&self) -> Vec<u8> {
        self.lattice.cells().iter().map(|&c| c as u8).collect()
    }

    pub fn get_labels(&self) -> Vec<u32> {
        label_clusters(&self.lattice, self.labeling).labels().to_vec()
    }

    pub fn get_cluster_sizes(&self) -> Vec<u32> {
        label_clusters(&self.lattice, self.labeling)
            .sizes()
            .iter()
            .map(|&s| s as u32)
            .collect()
    }

    /// Full sweep on the calling thread, with timing.
    pub fn sweep(&self, trials: usize, p0: f64, pk: f64, dp: f64) -> Result<SweepInfo, JsValue> {
        let params = SweepParams { l: self.n, trials, p_min: p0, p_max: pk, dp };
        let options = SweepOptions {
            seed: self.seed,
            execution: Execution::Sequential,
            labeling: self.labeling,
        };
        let t0 = now_ms();
        let result = run_sweep_with(&params, &options, None).map_err(to_js)?;
        let t1 = now_ms();
        Ok(SweepInfo { result, compute_ms: t1 - t0 })
    }
}

#[wasm_bindgen]
pub struct SweepInfo {
    result: SweepResult,
    compute_ms: f64,
}

#[wasm_bindgen]
impl SweepInfo {
    pub fn compute_ms(&self) -> f64 { self.compute_ms }
    pub fn p(&self) -> Vec<f64> { self.result.points.iter().map(|pt| pt.p).collect() }
    pub fn percolation_probability(&self) -> Vec<f64> {
        self.result.points.iter().map(|pt| pt.percolation_probability).collect()
    }
    pub fn mean_max_cluster_size(&self) -> Vec<f64> {
        self.result.points.iter().map(|pt| pt.mean_max_cluster_size).collect()
    }
    /// Histogram of sweep index `index`, or empty when out of range.
    pub fn size_histogram(&self, index: usize) -> Vec<f64> {
        self.result
            .points
            .get(index)
            .map(|pt| pt.size_histogram.iter().map(|&c| c as f64).collect())
            .unwrap_or_default()
    }
}

fn to_js(e: PercolationError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
