//! Edge-matched tile grids generated with Wave Function Collapse.
//!
//! Build a [`wfc::TileCatalog`] from the edge signatures of your tiles, derive
//! its [`wfc::Adjacency`] once, and hand it to as many [`wfc::WfcSolver`]s as
//! you like.

pub mod grid;
pub mod wfc;

pub mod third_party {
    pub use bitvec;
    pub use rand;
    pub use serde;
    pub use vek;
}
