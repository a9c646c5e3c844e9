use super::connectivity::ConnectivityTable;
use super::info::{CONNECTIVITY_KEY, InfoMap};
use nalgebra::{Matrix3, Point3};

/// An in-memory atomic configuration: one molecule, crystal, or trajectory frame.
///
/// Symbols and positions are index-aligned; atom `i` is `symbols[i]` at
/// `positions[i]`. Connectivity indices refer to this same 0-based ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    /// Element symbols, one per atom (e.g. "C", "Cl").
    pub symbols: Vec<String>,
    /// Cartesian coordinates in Angstroms.
    pub positions: Vec<Point3<f64>>,
    /// Lattice vectors stored as rows, if the source defined a unit cell.
    pub cell: Option<Matrix3<f64>>,
    /// Whether the structure is periodic along all three lattice vectors.
    pub pbc: bool,
    /// Bonded partners per atom, as read from the source file.
    pub connectivity: ConnectivityTable,
    /// Free-form metadata carried into the output frame.
    pub info: InfoMap,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a periodic structure with the given lattice.
    pub fn with_cell(cell: Matrix3<f64>) -> Self {
        Self {
            cell: Some(cell),
            pbc: true,
            ..Default::default()
        }
    }

    pub fn push_atom(&mut self, symbol: impl Into<String>, position: Point3<f64>) -> usize {
        self.symbols.push(symbol.into());
        self.positions.push(position);
        self.symbols.len() - 1
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Stores the offset-zero connectivity block under the `connectivity` info key.
    ///
    /// Existing info entries are left untouched; a previous `connectivity`
    /// value is replaced.
    pub fn attach_connectivity(&mut self) {
        let block = self.connectivity.to_block(0);
        self.info.insert(CONNECTIVITY_KEY, block);
    }

    /// Returns the connectivity block stored in `info`, if any.
    pub fn connectivity_block(&self) -> Option<&str> {
        self.info.get(CONNECTIVITY_KEY).and_then(|v| v.as_str())
    }
}
