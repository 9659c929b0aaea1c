use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::error::MazeError;
use crate::grid::{Direction, Grid, Position, Size};
use crate::queue::{Placement, PlacementQueue};
use crate::signal::CancelToken;
use crate::tile::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    NotStarted,
    Running,
    Complete,
    Cancelled,
}

impl GeneratorState {
    pub fn is_finished(self) -> bool {
        matches!(self, GeneratorState::Complete | GeneratorState::Cancelled)
    }
}

/// Randomized depth-first backtracker carving a perfect maze.
///
/// Every step either carves a passage out of the current cell or backs up
/// one cell. A cell is emitted as a [`Placement`] right after a passage is
/// carved out of it and the first time the walk backs out of it, which is
/// when its walls can no longer change until it becomes current again.
pub struct Backtracker {
    grid: Grid<Tile>,
    size: Size,
    stack: Vec<Position>,
    current: Position,
    going_back: bool,
    placed: usize,
    state: GeneratorState,
    edges: Vec<(Position, Position)>,
    rng: XorShiftRng,
}

impl Backtracker {
    pub fn new(size: Size, seed: u64) -> Result<Self, MazeError> {
        size.validate()?;

        Ok(Self {
            grid: Grid::new(size),
            size,
            stack: Vec::with_capacity(size.area()),
            current: (0, 0),
            going_back: false,
            placed: 0,
            state: GeneratorState::NotStarted,
            edges: Vec::with_capacity(size.area()),
            rng: XorShiftRng::seed_from_u64(seed),
        })
    }

    /// Runs a whole maze in one go and returns every emitted record in order.
    pub fn generate(size: Size, seed: u64) -> Result<(Self, Vec<Placement>), MazeError> {
        let mut maze = Self::new(size, seed)?;
        let mut placements = Vec::with_capacity(size.area() * 2);

        while !maze.state.is_finished() {
            placements.extend(maze.step());
        }

        Ok((maze, placements))
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn done(&self) -> bool {
        self.state == GeneratorState::Complete
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Distinct cells emitted so far.
    pub fn placed(&self) -> usize {
        self.placed
    }

    pub fn remaining(&self) -> usize {
        self.size.area() - self.placed
    }

    pub fn grid(&self) -> &Grid<Tile> {
        &self.grid
    }

    /// Carved passages, in carve order.
    pub fn edges(&self) -> &[(Position, Position)] {
        &self.edges
    }

    pub fn start(&mut self) {
        self.grid = Grid::new(self.size);
        self.stack.clear();
        self.edges.clear();
        self.placed = 0;
        self.going_back = false;

        self.current = (
            self.rng.gen_range(0..self.size.width),
            self.rng.gen_range(0..self.size.height),
        );
        self.grid.get_or_create(self.current).visited = true;
        self.state = GeneratorState::Running;

        debug!("Starting at ({}, {})", self.current.0, self.current.1);
    }

    pub fn cancel(&mut self) {
        if self.state != GeneratorState::Complete {
            self.state = GeneratorState::Cancelled;
        }
    }

    /// Advances the walk by one carve or backtrack.
    ///
    /// Returns the record emitted by this step, if any.
    pub fn step(&mut self) -> Option<Placement> {
        if self.state == GeneratorState::NotStarted {
            self.start();
        }

        if self.state != GeneratorState::Running {
            return None;
        }

        let neighbors = self.unvisited_neighbors(self.current);

        let emitted = if !neighbors.is_empty() {
            self.stack.push(self.current);

            let next = neighbors[self.rng.gen_range(0..neighbors.len())];

            self.carve(self.current, next);
            self.grid.get_or_create(next).visited = true;

            let placement = self.placement(self.current, self.going_back);

            if !self.going_back {
                self.placed += 1;
            }

            trace!("Carved {:?} -> {:?}", self.current, next);

            self.current = next;
            self.going_back = false;

            Some(placement)
        } else {
            let placement = if self.going_back {
                None
            } else {
                self.placed += 1;
                Some(self.placement(self.current, false))
            };

            match self.stack.pop() {
                Some(previous) => {
                    trace!("Backtracking {:?} -> {:?}", self.current, previous);
                    self.current = previous;
                }
                None => assert_eq!(
                    self.placed,
                    self.size.area(),
                    "backtrack stack exhausted before every cell was placed"
                ),
            }

            self.going_back = true;

            placement
        };

        if self.placed == self.size.area() {
            self.state = GeneratorState::Complete;
        }

        emitted
    }

    /// Steps until the maze is complete or `cancel` fires, pushing every
    /// record onto `queue`. A closed queue counts as a cancellation.
    pub fn run(&mut self, queue: &PlacementQueue, cancel: &CancelToken) -> GeneratorState {
        while !self.state.is_finished() {
            if cancel.is_cancelled() {
                self.cancel();
                break;
            }

            if let Some(placement) = self.step() {
                if !queue.push(placement) {
                    self.cancel();
                }
            }
        }

        if self.state == GeneratorState::Cancelled {
            debug!(
                "Generation cancelled with {} of {} cells placed",
                self.placed,
                self.size.area()
            );
        }

        self.state
    }

    fn unvisited_neighbors(&mut self, pos: Position) -> Vec<Position> {
        let mut unvisited = Vec::with_capacity(4);

        for neighbor in self.grid.neighbors_in_bounds(pos) {
            if !self.grid.get_or_create(neighbor).visited {
                unvisited.push(neighbor);
            }
        }

        unvisited
    }

    fn carve(&mut self, from: Position, to: Position) {
        let direction = Direction::between(from, to);

        self.grid.get_or_create(from).walls[direction] = false;
        self.grid.get_or_create(to).walls[direction.invert()] = false;

        self.edges.push((from, to));
    }

    fn placement(&mut self, position: Position, revisit: bool) -> Placement {
        let (wall_type, rotation) = self.grid.get_or_create(position).classify();

        Placement {
            position,
            wall_type,
            rotation,
            revisit,
        }
    }
}
