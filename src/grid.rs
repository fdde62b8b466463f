use serde::{Deserialize, Serialize};
use std::fmt::Display;
use vek::Vec2;

/// Cardinal direction on a grid, where North points to the previous row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GridDirection {
    North,
    West,
    South,
    East,
}

impl GridDirection {
    /// Neighbor iteration order: up, left, down, right.
    pub const ALL: [Self; 4] = [Self::North, Self::West, Self::South, Self::East];

    pub fn opposite(&self) -> Self {
        match self {
            GridDirection::North => GridDirection::South,
            GridDirection::West => GridDirection::East,
            GridDirection::South => GridDirection::North,
            GridDirection::East => GridDirection::West,
        }
    }

    /// Position of this direction in [`GridDirection::ALL`].
    pub fn index(&self) -> usize {
        match self {
            GridDirection::North => 0,
            GridDirection::West => 1,
            GridDirection::South => 2,
            GridDirection::East => 3,
        }
    }
}

impl std::fmt::Display for GridDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GridDirection::North => "N",
            GridDirection::West => "W",
            GridDirection::South => "S",
            GridDirection::East => "E",
        };
        write!(f, "{}", name)
    }
}

/// Row-major 2-D storage. Locations are `Vec2 { x: column, y: row }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    size: Vec2<usize>,
    buffer: Vec<T>,
}

impl<T> Grid<T> {
    pub fn new(size: impl Into<Vec2<usize>>, fill_value: T) -> Self
    where
        T: Clone,
    {
        let size = size.into();
        Self {
            size,
            buffer: vec![fill_value; size.x * size.y],
        }
    }

    pub fn from_fn(size: impl Into<Vec2<usize>>, mut f: impl FnMut(Vec2<usize>) -> T) -> Self {
        let size = size.into();
        let buffer = (0..size.y)
            .flat_map(|y| (0..size.x).map(move |x| Vec2::new(x, y)))
            .map(&mut f)
            .collect();
        Self { size, buffer }
    }

    pub fn with_buffer(size: impl Into<Vec2<usize>>, buffer: Vec<T>) -> Option<Self> {
        let size = size.into();
        if buffer.len() == size.x * size.y {
            Some(Self { size, buffer })
        } else {
            None
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Vec2<usize>, &T) -> U) -> Grid<U> {
        Grid {
            size: self.size,
            buffer: self
                .buffer
                .iter()
                .enumerate()
                .map(|(index, value)| f(self.location(index), value))
                .collect(),
        }
    }

    pub fn into_inner(self) -> (Vec2<usize>, Vec<T>) {
        (self.size, self.buffer)
    }

    pub fn size(&self) -> Vec2<usize> {
        self.size
    }

    pub fn rows(&self) -> usize {
        self.size.y
    }

    pub fn cols(&self) -> usize {
        self.size.x
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &[T] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut [T] {
        &mut self.buffer
    }

    /// Iterates row by row, yielding `(location, index, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2<usize>, usize, &T)> + '_ {
        self.buffer
            .iter()
            .enumerate()
            .map(|(index, value)| (self.location(index), index, value))
    }

    pub fn contains(&self, location: impl Into<Vec2<usize>>) -> bool {
        let location = location.into();
        location.x < self.size.x && location.y < self.size.y
    }

    pub fn index(&self, location: impl Into<Vec2<usize>>) -> Option<usize> {
        let location = location.into();
        if self.contains(location) {
            Some(location.y * self.size.x + location.x)
        } else {
            None
        }
    }

    /// Panics when the grid has no columns.
    pub fn location(&self, index: usize) -> Vec2<usize> {
        Vec2 {
            x: index % self.size.x,
            y: index / self.size.x,
        }
    }

    /// Location one step away in `direction`, or `None` when it leaves the grid.
    pub fn location_offset(
        &self,
        location: impl Into<Vec2<usize>>,
        direction: GridDirection,
    ) -> Option<Vec2<usize>> {
        let mut location = location.into();
        match direction {
            GridDirection::North => {
                location.y = location.y.checked_sub(1)?;
            }
            GridDirection::West => {
                location.x = location.x.checked_sub(1)?;
            }
            GridDirection::South => {
                location.y += 1;
            }
            GridDirection::East => {
                location.x += 1;
            }
        }
        if self.contains(location) {
            Some(location)
        } else {
            None
        }
    }

    /// Up to four in-bounds neighbors, in [`GridDirection::ALL`] order.
    pub fn neighbors(
        &self,
        location: impl Into<Vec2<usize>>,
    ) -> impl Iterator<Item = (GridDirection, Vec2<usize>, &T)> + '_ {
        let location = location.into();
        GridDirection::ALL.into_iter().filter_map(move |direction| {
            let location = self.location_offset(location, direction)?;
            Some((direction, location, self.get(location)?))
        })
    }

    pub fn get(&self, location: impl Into<Vec2<usize>>) -> Option<&T> {
        let index = self.index(location)?;
        self.buffer.get(index)
    }

    pub fn get_mut(&mut self, location: impl Into<Vec2<usize>>) -> Option<&mut T> {
        let index = self.index(location)?;
        self.buffer.get_mut(index)
    }

    pub fn set(&mut self, location: impl Into<Vec2<usize>>, value: T) {
        if let Some(item) = self.get_mut(location) {
            *item = value;
        }
    }
}

impl<T: Display> std::fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.buffer.chunks(self.size.x.max(1)) {
            for value in row {
                write!(f, "{} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
