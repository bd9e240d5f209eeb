//! Spanning test by "burning" from the top row.

use crate::lattice::Lattice;

/// True iff an occupied 4-connected path joins row 0 to row L-1.
///
/// Every occupied cell of row 0 seeds an explicit stack; the fire spreads to
/// occupied, unburnt neighbours and stops as soon as it reaches the last row.
/// Each cell is pushed at most once, so the work is O(L²).
pub fn percolates(lattice: &Lattice) -> bool {
    let n = lattice.n();
    let cells = lattice.cells();
    let last_row = (n - 1) * n;

    let mut burnt = vec![false; cells.len()];
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    for col in 0..n {
        if cells[col] {
            burnt[col] = true;
            stack.push(col);
        }
    }

    while let Some(idx) = stack.pop() {
        if idx >= last_row {
            return true;
        }
        for next in lattice.occupied_neighbours(idx) {
            if !burnt[next] {
                burnt[next] = true;
                stack.push(next);
            }
        }
    }

    false
}
