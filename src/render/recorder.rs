use std::collections::HashMap;

use super::TileSink;
use crate::grid::{Direction, Position, Size};
use crate::tile::{walls_for, WallType, Walls};

/// A placement as the host received it.
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTile {
    pub position: Position,
    pub wall_type: WallType,
    pub rotation_units: i32,
}

impl AppliedTile {
    pub fn rotation(&self) -> Option<Direction> {
        Direction::from_rotation_units(self.rotation_units)
    }

    /// Wall layout implied by the shape and rotation the host was given.
    pub fn walls(&self) -> Walls {
        walls_for(self.wall_type, self.rotation().unwrap_or(Direction::Up))
    }
}

/// In-memory sink that remembers every placement.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub applied: Vec<AppliedTile>,
    pub ticks_requested: usize,
    cells: HashMap<Position, AppliedTile>,
}

impl Recorder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Latest tile placed at `position`.
    pub fn cell(&self, position: Position) -> Option<&AppliedTile> {
        self.cells.get(&position)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.applied.clear();
        self.cells.clear();
        self.ticks_requested = 0;
    }

    /// Draws the current state as ASCII art; cells not placed yet are filled.
    pub fn render(&self, size: Size) -> String {
        let mut output = String::with_capacity((size.width * 3 + 2) * (size.height * 2 + 1));

        for y in 0..size.height {
            let walls: Vec<Option<Walls>> = (0..size.width)
                .map(|x| self.cell((x, y)).map(|tile| tile.walls()))
                .collect();

            for cell in &walls {
                output.push('+');
                output.push_str(match cell {
                    Some(walls) if !walls[Direction::Up] => "  ",
                    _ => "--",
                });
            }
            output.push_str("+\n");

            for cell in &walls {
                output.push(match cell {
                    Some(walls) if !walls[Direction::Left] => ' ',
                    _ => '|',
                });
                output.push_str(if cell.is_some() { "  " } else { "##" });
            }
            output.push(match walls.last() {
                Some(Some(walls)) if !walls[Direction::Right] => ' ',
                _ => '|',
            });
            output.push('\n');
        }

        for x in 0..size.width {
            output.push('+');
            output.push_str(match self.cell((x, size.height.saturating_sub(1))) {
                Some(tile) if !tile.walls()[Direction::Down] => "  ",
                _ => "--",
            });
        }
        output.push_str("+\n");

        output
    }
}

impl TileSink for Recorder {
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32) {
        let tile = AppliedTile {
            position,
            wall_type,
            rotation_units,
        };

        self.applied.push(tile);
        self.cells.insert(position, tile);
    }

    fn request_tick(&mut self) {
        self.ticks_requested += 1;
    }
}
