use std::fmt;

/// Errors surfaced by lattice generation, analysis and the sweep driver.
#[derive(Debug, Clone, PartialEq)]
pub enum PercolationError {
    /// A sweep or lattice parameter is out of range. Fatal, the sweep never starts.
    InvalidParameter { field: &'static str, value: f64 },
    /// The requested lattice does not fit the cell budget.
    ResourceExhaustion { size: usize, cells: Option<usize> },
    /// A structural check on a trial failed. Indicates a defect, not bad input.
    InvariantViolation(String),
}

impl PercolationError {
    pub(crate) fn invalid(field: &'static str, value: f64) -> Self {
        PercolationError::InvalidParameter { field, value }
    }
}

impl fmt::Display for PercolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercolationError::InvalidParameter { field, value } => {
                write!(f, "invalid parameter {}: {}", field, value)
            }
            PercolationError::ResourceExhaustion { size, cells } => match cells {
                Some(cells) => write!(
                    f,
                    "lattice L={} needs {} cells, budget is {}",
                    size,
                    cells,
                    crate::lattice::MAX_LATTICE_CELLS
                ),
                None => write!(f, "lattice L={} overflows the addressable cell count", size),
            },
            PercolationError::InvariantViolation(msg) => {
                write!(f, "internal invariant violated: {}", msg)
            }
        }
    }
}

impl std::error::Error for PercolationError {}

pub type Result<T> = std::result::Result<T, PercolationError>;
