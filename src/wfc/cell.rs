use crate::{
    grid::GridDirection,
    wfc::catalog::{Adjacency, VariantId},
};
use bitvec::vec::BitVec;
use rand::Rng;
use vek::Vec2;

/// Entropy reported by decided cells; larger than any candidate count.
pub const DECIDED_ENTROPY: usize = usize::MAX;

/// Remaining possibilities for one grid position.
///
/// Candidates only ever shrink while the cell is undecided. Once decided the
/// candidate set is the singleton `{chosen}` and stays that way until the
/// owning solver is reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    location: Vec2<usize>,
    candidates: BitVec,
    chosen: Option<VariantId>,
    forced: bool,
}

impl Cell {
    pub fn new(location: impl Into<Vec2<usize>>, variant_count: usize) -> Self {
        Self {
            location: location.into(),
            candidates: BitVec::repeat(true, variant_count),
            chosen: None,
            forced: false,
        }
    }

    pub fn location(&self) -> Vec2<usize> {
        self.location
    }

    pub fn row(&self) -> usize {
        self.location.y
    }

    pub fn col(&self) -> usize {
        self.location.x
    }

    pub fn candidates(&self) -> impl Iterator<Item = VariantId> + '_ {
        self.candidates.iter_ones().map(VariantId)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.count_ones()
    }

    pub fn contains(&self, variant: VariantId) -> bool {
        self.candidates.get(variant.0).is_some_and(|bit| *bit)
    }

    pub fn is_decided(&self) -> bool {
        self.chosen.is_some()
    }

    pub fn chosen(&self) -> Option<VariantId> {
        self.chosen
    }

    /// Whether the cell ran out of candidates and took [`VariantId::FALLBACK`].
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn entropy(&self) -> usize {
        if self.is_decided() {
            DECIDED_ENTROPY
        } else {
            self.candidates.count_ones()
        }
    }

    /// Drops every candidate that cannot sit on the `direction` side of
    /// `decided`, where `direction` points from the decided neighbor toward
    /// this cell. Returns how many candidates were removed.
    ///
    /// The candidate set may end up empty; that is resolved when this cell
    /// collapses.
    pub fn prune(
        &mut self,
        direction: GridDirection,
        decided: VariantId,
        adjacency: &Adjacency,
    ) -> usize {
        if self.is_decided() {
            return 0;
        }
        let before = self.candidates.count_ones();
        self.candidates &= adjacency.allowed(decided, direction).as_bitslice();
        before - self.candidates.count_ones()
    }

    /// Picks one remaining candidate uniformly at random.
    ///
    /// An empty candidate set yields [`VariantId::FALLBACK`] and marks the cell
    /// as forced; the result may then disagree with its neighbors.
    ///
    /// # Panics
    /// When the cell is already decided.
    pub fn collapse(&mut self, rng: &mut impl Rng) -> VariantId {
        assert!(
            !self.is_decided(),
            "Cell at {} collapsed twice",
            self.location
        );
        let count = self.candidates.count_ones();
        let picked = if count == 0 {
            None
        } else {
            self.candidates.iter_ones().nth(rng.random_range(0..count))
        };
        let chosen = match picked {
            Some(index) => VariantId(index),
            None => {
                self.forced = true;
                VariantId::FALLBACK
            }
        };
        self.candidates.fill(false);
        self.candidates.set(chosen.0, true);
        self.chosen = Some(chosen);
        chosen
    }
}
