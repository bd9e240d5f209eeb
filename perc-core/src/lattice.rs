//! Square site lattice with independent random occupation.

use rand::Rng;

use crate::error::{PercolationError, Result};

/// Upper bound on L² for a single lattice.
///
/// Hoshen-Kopelman labelling peaks at roughly 25 bytes per cell (occupation,
/// `usize` provisional labels and parents, `u32` compaction map and label
/// grid), about 1.6 GiB at this cap. That peak applies to every trial running
/// concurrently, so a parallel sweep needs it once per worker thread.
pub const MAX_LATTICE_CELLS: usize = 1 << 26;

/// L×L grid of occupation states, row-major, 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    n: usize,
    cells: Vec<bool>,
}

impl Lattice {
    /// Occupy each of the L² cells independently with probability `p`.
    ///
    /// The draw order is row-major, one Bernoulli sample per cell, so a given
    /// generator state always yields the same lattice.
    pub fn generate<R: Rng>(n: usize, p: f64, rng: &mut R) -> Result<Lattice> {
        let size = cell_count(n)?;
        check_probability("p", p)?;

        let cells = (0..size).map(|_| rng.gen_bool(p)).collect();
        Ok(Lattice { n, cells })
    }

    /// Wrap an existing row-major buffer. The buffer must hold exactly L² cells.
    pub fn from_cells(n: usize, cells: Vec<bool>) -> Result<Lattice> {
        let size = cell_count(n)?;
        if cells.len() != size {
            return Err(PercolationError::InvariantViolation(format!(
                "lattice buffer has {} cells, expected {}x{}={}",
                cells.len(),
                n,
                n,
                size
            )));
        }
        Ok(Lattice { n, cells })
    }

    /// Lattice with exactly the listed `(row, col)` sites occupied.
    pub fn from_occupied(n: usize, sites: &[(usize, usize)]) -> Result<Lattice> {
        let mut cells = vec![false; cell_count(n)?];
        for &(row, col) in sites {
            if row >= n || col >= n {
                return Err(PercolationError::invalid("site", (row.max(col)) as f64));
            }
            cells[row * n + col] = true;
        }
        Ok(Lattice { n, cells })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied 4-neighbours (up, down, left, right) of the cell at linear index `idx`.
    pub(crate) fn occupied_neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let n = self.n;
        let (row, col) = (idx / n, idx % n);
        let up = (row > 0).then(|| idx - n);
        let down = (row + 1 < n).then(|| idx + n);
        let left = (col > 0).then(|| idx - 1);
        let right = (col + 1 < n).then(|| idx + 1);
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |&j| self.cells[j])
    }
}

/// L² with the zero and budget checks applied.
pub(crate) fn cell_count(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(PercolationError::invalid("L", 0.0));
    }
    match n.checked_mul(n) {
        Some(cells) if cells <= MAX_LATTICE_CELLS => Ok(cells),
        Some(cells) => Err(PercolationError::ResourceExhaustion { size: n, cells: Some(cells) }),
        None => Err(PercolationError::ResourceExhaustion { size: n, cells: None }),
    }
}

pub(crate) fn check_probability(field: &'static str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(PercolationError::invalid(field, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generate_has_requested_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let lat = Lattice::generate(13, 0.5, &mut rng).unwrap();
        assert_eq!(lat.n(), 13);
        assert_eq!(lat.cells().len(), 169);
    }

    #[test]
    fn test_extreme_probabilities() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty = Lattice::generate(8, 0.0, &mut rng).unwrap();
        assert_eq!(empty.occupied_count(), 0);
        let full = Lattice::generate(8, 1.0, &mut rng).unwrap();
        assert_eq!(full.occupied_count(), 64);
    }

    #[test]
    fn test_same_seed_same_lattice() {
        let a = Lattice::generate(20, 0.59, &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        let b = Lattice::generate(20, 0.59, &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_occupation_fraction_tracks_p() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let lat = Lattice::generate(200, 0.3, &mut rng).unwrap();
        let frac = lat.occupied_count() as f64 / 40_000.0;
        assert!((frac - 0.3).abs() < 0.02, "occupied fraction {} too far from 0.3", frac);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            Lattice::generate(0, 0.5, &mut rng),
            Err(PercolationError::InvalidParameter { field: "L", value: 0.0 })
        );
        assert!(matches!(
            Lattice::generate(4, 1.5, &mut rng),
            Err(PercolationError::InvalidParameter { field: "p", .. })
        ));
        assert!(matches!(
            Lattice::generate(4, f64::NAN, &mut rng),
            Err(PercolationError::InvalidParameter { field: "p", .. })
        ));
    }

    #[test]
    fn test_oversized_lattice_is_resource_exhaustion() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            Lattice::generate(1 << 14, 0.5, &mut rng),
            Err(PercolationError::ResourceExhaustion { size: 16384, .. })
        ));
        assert!(matches!(
            Lattice::generate(usize::MAX, 0.5, &mut rng),
            Err(PercolationError::ResourceExhaustion { cells: None, .. })
        ));
    }

    #[test]
    fn test_from_cells_checks_length() {
        assert!(matches!(
            Lattice::from_cells(3, vec![true; 8]),
            Err(PercolationError::InvariantViolation(_))
        ));
        assert!(Lattice::from_cells(3, vec![true; 9]).is_ok());
    }

    #[test]
    fn test_neighbours_respect_edges() {
        let lat = Lattice::from_cells(3, vec![true; 9]).unwrap();
        let mut corner: Vec<_> = lat.occupied_neighbours(0).collect();
        corner.sort();
        assert_eq!(corner, vec![1, 3]);
        assert_eq!(lat.occupied_neighbours(4).count(), 4);
        // no wrap from the end of row 0 to the start of row 1
        assert!(!lat.occupied_neighbours(2).any(|j| j == 3));
    }
}
