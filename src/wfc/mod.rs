pub mod catalog;
pub mod cell;

pub use catalog::{Adjacency, TileCatalog, TileVariant, VariantId};
pub use cell::Cell;

use crate::grid::{Grid, GridDirection};
use log::{debug, info, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vek::Vec2;

#[derive(Debug, Error)]
pub enum WfcError {
    #[error("Tile catalog has no variants")]
    EmptyCatalog,
    #[error(
        "Edge signature length mismatch: variant {variant} facing {direction}, expected {expected}, provided {provided}"
    )]
    SignatureLengthMismatch {
        variant: VariantId,
        direction: GridDirection,
        expected: usize,
        provided: usize,
    },
}

/// A single permanent assignment made by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WfcDecision {
    pub location: Vec2<usize>,
    pub variant: VariantId,
    /// The cell had no candidates left and took [`VariantId::FALLBACK`].
    pub forced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WfcCollapseResult {
    Incomplete { decision: WfcDecision },
    Complete,
}

/// Result of a finished run.
///
/// `forced` lists cells resolved by the empty-candidate fallback. Those cells
/// may break edge matching with their neighbors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WfcOutcome {
    pub grid: Grid<VariantId>,
    pub forced: Vec<Vec2<usize>>,
}

impl WfcOutcome {
    pub fn is_consistent(&self) -> bool {
        self.forced.is_empty()
    }
}

/// Generates one grid of edge-matched tiles.
///
/// Each step collapses the most constrained undecided cell and prunes its
/// direct neighbors. Pruning does not cascade past those neighbors within a
/// step, and nothing is ever backtracked.
pub struct WfcSolver<'a> {
    adjacency: &'a Adjacency,
    grid: Grid<Cell>,
    iterations: usize,
    history: Vec<WfcDecision>,
}

impl<'a> WfcSolver<'a> {
    /// `size` is `(columns, rows)`.
    pub fn new(size: impl Into<Vec2<usize>>, adjacency: &'a Adjacency) -> Self {
        let size = size.into();
        Self {
            adjacency,
            grid: Self::fresh_grid(size, adjacency),
            iterations: 0,
            history: Vec::with_capacity(size.x * size.y),
        }
    }

    fn fresh_grid(size: Vec2<usize>, adjacency: &Adjacency) -> Grid<Cell> {
        Grid::from_fn(size, |location| {
            Cell::new(location, adjacency.variant_count())
        })
    }

    pub fn adjacency(&self) -> &'a Adjacency {
        self.adjacency
    }

    pub fn size(&self) -> Vec2<usize> {
        self.grid.size()
    }

    pub fn grid(&self) -> &Grid<Cell> {
        &self.grid
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Every decision so far, in the order it was made.
    pub fn history(&self) -> &[WfcDecision] {
        &self.history
    }

    pub fn forced(&self) -> impl Iterator<Item = Vec2<usize>> + '_ {
        self.history
            .iter()
            .filter(|decision| decision.forced)
            .map(|decision| decision.location)
    }

    pub fn is_complete(&self) -> bool {
        self.grid.buffer().iter().all(Cell::is_decided)
    }

    /// Chosen variant per cell, `None` while undecided.
    pub fn decisions(&self) -> Grid<Option<VariantId>> {
        self.grid.map(|_, cell| cell.chosen())
    }

    /// Returns the current and total number of possible variants across all cells.
    pub fn uncertainty(&self) -> (usize, usize) {
        let current = self
            .grid
            .buffer()
            .iter()
            .map(|cell| cell.candidate_count().saturating_sub(1))
            .sum();
        let total = self.grid.len() * self.adjacency.variant_count().saturating_sub(1);
        (current, total)
    }

    /// Discards all progress and starts a new run on the same grid size.
    pub fn reset(&mut self) {
        self.grid = Self::fresh_grid(self.grid.size(), self.adjacency);
        self.iterations = 0;
        self.history.clear();
        info!("WFC reset | size: {}", self.grid.size());
    }

    pub fn collapse_step(&mut self, rng: &mut impl Rng) -> WfcCollapseResult {
        let Some(index) = self.select(rng) else {
            return WfcCollapseResult::Complete;
        };
        self.iterations += 1;

        let location = self.grid.location(index);
        let cell = &mut self.grid.buffer_mut()[index];
        let variant = cell.collapse(rng);
        let forced = cell.is_forced();
        if forced {
            warn!(
                "WFC cell {} had no candidates left, using fallback variant {}",
                location, variant
            );
        } else {
            debug!("WFC collapse | cell: {} | variant: {}", location, variant);
        }

        self.propagate(location, variant);

        let decision = WfcDecision {
            location,
            variant,
            forced,
        };
        self.history.push(decision);
        WfcCollapseResult::Incomplete { decision }
    }

    /// Steps until every cell is decided.
    pub fn collapse(&mut self, rng: &mut impl Rng) -> WfcOutcome {
        loop {
            match self.collapse_step(rng) {
                WfcCollapseResult::Incomplete { .. } => continue,
                WfcCollapseResult::Complete => return self.outcome(),
            }
        }
    }

    /// Same as [`WfcSolver::collapse`], yielding to the executor after every step.
    pub async fn collapse_async(&mut self, rng: &mut impl Rng) -> WfcOutcome {
        std::future::poll_fn(|cx| match self.collapse_step(rng) {
            WfcCollapseResult::Incomplete { .. } => {
                cx.waker().wake_by_ref();
                std::task::Poll::Pending
            }
            WfcCollapseResult::Complete => std::task::Poll::Ready(self.outcome()),
        })
        .await
    }

    fn outcome(&self) -> WfcOutcome {
        let forced = self.forced().collect::<Vec<_>>();
        info!(
            "WFC collapsed | iterations: {} | forced cells: {}",
            self.iterations,
            forced.len()
        );
        WfcOutcome {
            grid: self
                .grid
                .map(|_, cell| cell.chosen().unwrap_or(VariantId::FALLBACK)),
            forced,
        }
    }

    /// Index of the next cell to collapse, or `None` once every cell is decided.
    fn select(&self, rng: &mut impl Rng) -> Option<usize> {
        let mut least_entropy = usize::MAX;
        let mut collapsable = Vec::new();
        let mut undecided = Vec::new();

        for (index, cell) in self.grid.buffer().iter().enumerate() {
            if cell.is_decided() {
                continue;
            }
            undecided.push(index);
            let entropy = cell.entropy();
            if entropy == 0 {
                continue;
            }
            if entropy < least_entropy {
                least_entropy = entropy;
                collapsable.clear();
                collapsable.push(index);
            } else if entropy == least_entropy {
                collapsable.push(index);
            }
        }

        if undecided.is_empty() {
            return None;
        }
        // When nothing is constrained yet, `collapsable` already holds every
        // undecided cell, so generation starts anywhere. Empty cells are only
        // drawn once no undecided cell has candidates left.
        let pool = if collapsable.is_empty() {
            warn!(
                "WFC stuck | {} undecided cells have no candidates",
                undecided.len()
            );
            &undecided
        } else {
            &collapsable
        };
        Some(pool[rng.random_range(0..pool.len())])
    }

    /// Prunes the direct, undecided neighbors of a freshly decided cell.
    fn propagate(&mut self, location: Vec2<usize>, variant: VariantId) {
        for direction in GridDirection::ALL {
            let Some(neighbor) = self.grid.location_offset(location, direction) else {
                continue;
            };
            if let Some(cell) = self.grid.get_mut(neighbor)
                && !cell.is_decided()
            {
                let removed = cell.prune(direction, variant, self.adjacency);
                trace!(
                    "WFC prune | cell: {} | removed: {} | remaining: {}",
                    neighbor,
                    removed,
                    cell.entropy()
                );
            }
        }
    }
}
