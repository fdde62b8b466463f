use crate::{grid::GridDirection, wfc::WfcError};
use bitvec::vec::BitVec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantId(pub usize);

impl VariantId {
    /// Variant assigned to a cell whose candidates ran out before it collapsed.
    pub const FALLBACK: Self = Self(0);
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One placeable tile: its edge tokens in up, left, down, right order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileVariant<E> {
    pub edges: [Vec<E>; 4],
}

impl<E> TileVariant<E> {
    pub fn new(north: Vec<E>, west: Vec<E>, south: Vec<E>, east: Vec<E>) -> Self {
        Self {
            edges: [north, west, south, east],
        }
    }

    pub fn edge(&self, direction: GridDirection) -> &[E] {
        &self.edges[direction.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCatalog<E> {
    variants: Vec<TileVariant<E>>,
}

impl<E: Eq> TileCatalog<E> {
    pub fn new(variants: impl IntoIterator<Item = TileVariant<E>>) -> Result<Self, WfcError> {
        let variants = variants.into_iter().collect::<Vec<_>>();
        let Some(first) = variants.first() else {
            return Err(WfcError::EmptyCatalog);
        };
        let expected = first.edge(GridDirection::North).len();
        for (index, variant) in variants.iter().enumerate() {
            for direction in GridDirection::ALL {
                let provided = variant.edge(direction).len();
                if provided != expected {
                    return Err(WfcError::SignatureLengthMismatch {
                        variant: VariantId(index),
                        direction,
                        expected,
                        provided,
                    });
                }
            }
        }
        Ok(Self { variants })
    }

    pub fn variants(&self) -> &[TileVariant<E>] {
        &self.variants
    }

    /// Panics when `id` is outside the catalog.
    pub fn variant(&self, id: VariantId) -> &TileVariant<E> {
        &self.variants[id.0]
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = VariantId> {
        (0..self.variants.len()).map(VariantId)
    }

    /// `from`'s edge facing `direction` matches `to`'s edge facing back.
    pub fn edges_match(&self, from: VariantId, to: VariantId, direction: GridDirection) -> bool {
        self.variant(from).edge(direction) == self.variant(to).edge(direction.opposite())
    }

    pub fn adjacency(&self) -> Adjacency {
        Adjacency::new(self)
    }
}

/// Precomputed edge compatibility between every pair of catalog variants.
///
/// Read-only after construction, so a single instance can back any number of
/// solvers, including solvers running on other threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    variant_count: usize,
    compatibility: BTreeMap<(VariantId, GridDirection), BitVec>,
}

impl Adjacency {
    pub fn new<E: Eq>(catalog: &TileCatalog<E>) -> Self {
        let variant_count = catalog.len();
        let mut compatibility = BTreeMap::new();
        for from in catalog.ids() {
            for direction in GridDirection::ALL {
                let allowed = catalog
                    .ids()
                    .map(|to| catalog.edges_match(from, to, direction))
                    .collect::<BitVec>();
                compatibility.insert((from, direction), allowed);
            }
        }
        Self {
            variant_count,
            compatibility,
        }
    }

    pub fn variant_count(&self) -> usize {
        self.variant_count
    }

    /// Variants that may sit on the `direction` side of `from`.
    ///
    /// Panics when `from` is outside the catalog.
    pub fn allowed(&self, from: VariantId, direction: GridDirection) -> &BitVec {
        &self.compatibility[&(from, direction)]
    }

    /// Panics when either variant is outside the catalog.
    pub fn compatible(&self, from: VariantId, to: VariantId, direction: GridDirection) -> bool {
        self.allowed(from, direction)[to.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(north: u8, west: u8, south: u8, east: u8) -> TileVariant<u8> {
        TileVariant::new(vec![north], vec![west], vec![south], vec![east])
    }

    // Variant 0's east edge is the only one that matches anything: variant 1's west edge.
    fn chain_catalog() -> TileCatalog<u8> {
        TileCatalog::new([variant(0, 1, 2, 3), variant(4, 3, 5, 6)]).unwrap()
    }

    #[test]
    fn test_compatible_pair() {
        let adjacency = chain_catalog().adjacency();
        assert_eq!(adjacency.variant_count(), 2);
        assert!(adjacency.compatible(VariantId(0), VariantId(1), GridDirection::East));
        assert!(adjacency.compatible(VariantId(1), VariantId(0), GridDirection::West));

        let matching = GridDirection::ALL
            .into_iter()
            .flat_map(|direction| {
                (0..2).flat_map(move |a| (0..2).map(move |b| (a, b, direction)))
            })
            .filter(|&(a, b, direction)| {
                adjacency.compatible(VariantId(a), VariantId(b), direction)
            })
            .count();
        assert_eq!(matching, 2);
    }

    #[test]
    fn test_symmetry() {
        let tokens = [
            [0, 1, 0, 1],
            [1, 1, 0, 0],
            [0, 0, 1, 1],
            [1, 0, 1, 0],
            [2, 2, 2, 2],
        ];
        let catalog = TileCatalog::new(tokens.iter().map(|edges| {
            TileVariant::new(
                vec![edges[0], 9],
                vec![edges[1], 9],
                vec![edges[2], 9],
                vec![edges[3], 9],
            )
        }))
        .unwrap();
        let adjacency = catalog.adjacency();
        for a in catalog.ids() {
            for b in catalog.ids() {
                for direction in GridDirection::ALL {
                    assert_eq!(
                        adjacency.compatible(a, b, direction),
                        adjacency.compatible(b, a, direction.opposite()),
                        "{} -> {} facing {}",
                        a,
                        b,
                        direction
                    );
                }
            }
        }
        assert!(adjacency.compatible(VariantId(4), VariantId(4), GridDirection::South));
        assert!(adjacency.compatible(VariantId(0), VariantId(1), GridDirection::East));
    }

    #[test]
    fn test_signatures_compare_elementwise() {
        let catalog = TileCatalog::new([
            TileVariant::new(
                vec!['a', 'b', 'c'],
                vec!['x', 'x', 'x'],
                vec!['x', 'x', 'x'],
                vec!['x', 'x', 'x'],
            ),
            TileVariant::new(
                vec!['x', 'x', 'x'],
                vec!['x', 'x', 'x'],
                vec!['a', 'b', 'c'],
                vec!['x', 'x', 'x'],
            ),
            TileVariant::new(
                vec!['x', 'x', 'x'],
                vec!['x', 'x', 'x'],
                vec!['c', 'b', 'a'],
                vec!['x', 'x', 'x'],
            ),
        ])
        .unwrap();
        let adjacency = catalog.adjacency();
        assert!(adjacency.compatible(VariantId(0), VariantId(1), GridDirection::North));
        assert!(!adjacency.compatible(VariantId(0), VariantId(2), GridDirection::North));
    }

    #[test]
    fn test_empty_catalog() {
        let result = TileCatalog::<u8>::new([]);
        assert!(matches!(result, Err(WfcError::EmptyCatalog)));
    }

    #[test]
    fn test_signature_length_mismatch() {
        let result = TileCatalog::new([
            variant(0, 0, 0, 0),
            TileVariant::new(vec![0], vec![0], vec![0, 0], vec![0]),
        ]);
        match result {
            Err(WfcError::SignatureLengthMismatch {
                variant,
                direction,
                expected,
                provided,
            }) => {
                assert_eq!(variant, VariantId(1));
                assert_eq!(direction, GridDirection::South);
                assert_eq!(expected, 1);
                assert_eq!(provided, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_variant() {
        let adjacency = chain_catalog().adjacency();
        adjacency.compatible(VariantId(0), VariantId(7), GridDirection::East);
    }

    #[test]
    fn test_serde() {
        let catalog = chain_catalog();
        let serialized = serde_json::to_string(catalog.variants()).unwrap();
        let variants: Vec<TileVariant<u8>> = serde_json::from_str(&serialized).unwrap();
        assert_eq!(TileCatalog::new(variants).unwrap(), catalog);
    }
}
