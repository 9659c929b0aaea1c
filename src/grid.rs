use core::str::FromStr;

use enum_map::Enum;

use crate::error::MazeError;

pub type Position = (usize, usize);

/// Cardinal directions, in the order used for wall storage and neighbor scans.
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Enum)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn invert(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    pub fn clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Unit offset of this direction; `y` grows downwards.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Direction pointing from `from` to the adjacent cell `to`.
    ///
    /// Panics if the two positions are not orthogonally adjacent.
    pub fn between(from: Position, to: Position) -> Self {
        let delta = (
            to.0 as isize - from.0 as isize,
            to.1 as isize - from.1 as isize,
        );

        Direction::ALL
            .into_iter()
            .find(|direction| direction.offset() == delta)
            .unwrap_or_else(|| panic!("unknown direction vector {:?}", delta))
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        if self.width == 0 || self.height == 0 {
            Err(MazeError::InvalidSize {
                width: self.width,
                height: self.height,
            })?
        }

        Ok(())
    }
}

impl FromStr for Size {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (raw_width, raw_height) = s
            .split_once('x')
            .ok_or_else(|| MazeError::InvalidSizeFormat(s.to_string()))?;

        let width = raw_width
            .trim()
            .parse::<usize>()
            .map_err(|_| MazeError::InvalidSizeFormat(format!("invalid width: {}", raw_width)))?;
        let height = raw_height
            .trim()
            .parse::<usize>()
            .map_err(|_| MazeError::InvalidSizeFormat(format!("invalid height: {}", raw_height)))?;

        Ok(Size { width, height })
    }
}

/// Row-major storage where cells are only allocated once something touches them.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    data: Vec<Option<T>>,
    size: Size,
}

pub struct GridIter<'a, T> {
    grid: &'a Grid<T>,
    pos: usize,
}

impl<T> Grid<T> {
    pub fn new(size: Size) -> Self {
        let mut data = Vec::with_capacity(size.area());
        data.resize_with(size.area(), || None);

        Self { data, size }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.width
    }

    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Number of cells that have been allocated so far.
    pub fn allocated(&self) -> usize {
        self.data.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn iter(&self) -> GridIter<T> {
        GridIter { grid: self, pos: 0 }
    }

    fn index(&self, (x, y): Position) -> usize {
        debug_assert!(x < self.size.width && y < self.size.height);

        x + (y * self.size.width)
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        if pos.0 >= self.size.width || pos.1 >= self.size.height {
            return None;
        }

        self.data[self.index(pos)].as_ref()
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut T> {
        if pos.0 >= self.size.width || pos.1 >= self.size.height {
            return None;
        }

        let index = self.index(pos);

        self.data[index].as_mut()
    }

    /// Neighbor of `pos` in `direction`, if it lies inside the grid.
    pub fn neighbor(&self, (x, y): Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.offset();
        let (nx, ny) = (x as isize + dx, y as isize + dy);

        if self.size.contains(nx, ny) {
            Some((nx as usize, ny as usize))
        } else {
            None
        }
    }

    /// In-bounds neighbors of `pos`, always in the order up, right, down, left.
    pub fn neighbors_in_bounds(&self, pos: Position) -> Vec<Position> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.neighbor(pos, direction))
            .collect()
    }
}

impl<T: Default> Grid<T> {
    /// Returns the cell at `pos`, allocating a default one first if needed.
    ///
    /// `pos` must already be inside the grid.
    pub fn get_or_create(&mut self, pos: Position) -> &mut T {
        let index = self.index(pos);

        self.data[index].get_or_insert_with(T::default)
    }
}

impl<'a, T> IntoIterator for &'a Grid<T> {
    type Item = (usize, usize, Option<&'a T>);
    type IntoIter = GridIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for GridIter<'a, T> {
    type Item = (usize, usize, Option<&'a T>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.grid.data.len() {
            None
        } else {
            let x = self.pos % self.grid.size.width;
            let y = self.pos / self.grid.size.width;
            let value = self.grid.data[self.pos].as_ref();

            self.pos += 1;

            Some((x, y, value))
        }
    }
}
