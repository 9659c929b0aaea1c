use enum_map::{enum_map, EnumMap};

use crate::grid::Direction;

pub type Walls = EnumMap<Direction, bool>;

/// Per-cell carving state owned by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub visited: bool,
    pub walls: Walls,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            visited: false,
            walls: enum_map! { _ => true },
        }
    }
}

impl Tile {
    pub fn wall_count(&self) -> usize {
        self.walls.values().filter(|&&wall| wall).count()
    }

    pub fn classify(&self) -> (WallType, Direction) {
        classify(&self.walls)
    }
}

/// Shape of a finished cell, derived from how many walls it kept and where.
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum WallType {
    Empty,
    Single,
    Hallway,
    Corner,
    DeadEnd,
    Closed,
}

impl WallType {
    pub const ALL: [WallType; 6] = [
        WallType::Empty,
        WallType::Single,
        WallType::Hallway,
        WallType::Corner,
        WallType::DeadEnd,
        WallType::Closed,
    ];

    /// Item index of this shape in the host's tile library.
    pub fn item_index(self) -> u8 {
        match self {
            WallType::Empty => 0,
            WallType::Hallway => 1,
            WallType::Single => 2,
            WallType::Corner => 3,
            WallType::DeadEnd => 4,
            WallType::Closed => 5,
        }
    }

    pub fn from_item_index(index: u8) -> Option<Self> {
        WallType::ALL
            .into_iter()
            .find(|wall_type| wall_type.item_index() == index)
    }
}

impl Direction {
    /// Orientation value the host expects for a tile rotated towards this direction.
    pub fn rotation_units(self) -> i32 {
        match self {
            Direction::Up => 0,
            Direction::Right => 22,
            Direction::Down => 10,
            Direction::Left => 16,
        }
    }

    pub fn from_rotation_units(units: i32) -> Option<Self> {
        Direction::ALL
            .into_iter()
            .find(|direction| direction.rotation_units() == units)
    }
}

/// Maps a wall configuration to its shape and rotation.
///
/// Rotation follows the host's tile library: a single wall points at the
/// wall, a dead end points at its only opening, a corner points at the first
/// of its two walls going clockwise, and hallways are either `Up` (walls on
/// top and bottom) or `Right`. Empty and closed tiles always face `Up`.
pub fn classify(walls: &Walls) -> (WallType, Direction) {
    let count = walls.values().filter(|&&wall| wall).count();

    let wall_type = match count {
        0 => WallType::Empty,
        1 => WallType::Single,
        2 if walls[Direction::Up] == walls[Direction::Down] => WallType::Hallway,
        2 => WallType::Corner,
        3 => WallType::DeadEnd,
        4 => WallType::Closed,
        _ => unreachable!("wall count {} out of range", count),
    };

    (wall_type, rotation(walls, wall_type))
}

/// Canonical wall layout for a shape and rotation; the inverse of [`classify`].
pub fn walls_for(wall_type: WallType, rotation: Direction) -> Walls {
    let mut walls: Walls = enum_map! { _ => false };

    match wall_type {
        WallType::Empty => {}
        WallType::Single => walls[rotation] = true,
        WallType::Hallway => {
            walls[rotation] = true;
            walls[rotation.invert()] = true;
        }
        WallType::Corner => {
            walls[rotation] = true;
            walls[rotation.clockwise()] = true;
        }
        WallType::DeadEnd => {
            walls = enum_map! { _ => true };
            walls[rotation] = false;
        }
        WallType::Closed => walls = enum_map! { _ => true },
    }

    walls
}

fn first_where(walls: &Walls, present: bool) -> Direction {
    walls
        .iter()
        .find(|&(_, &wall)| wall == present)
        .map(|(direction, _)| direction)
        .unwrap_or_else(|| unreachable!("no direction with wall = {} in {:?}", present, walls))
}

fn rotation(walls: &Walls, wall_type: WallType) -> Direction {
    match wall_type {
        WallType::Empty | WallType::Closed => Direction::Up,
        WallType::Single => first_where(walls, true),
        WallType::Hallway if walls[Direction::Up] => Direction::Up,
        WallType::Hallway => Direction::Right,
        WallType::Corner => {
            let first = first_where(walls, true);

            // up+left wraps around, so the pair starts at left
            if first == Direction::Up && walls[Direction::Left] {
                Direction::Left
            } else {
                first
            }
        }
        WallType::DeadEnd => first_where(walls, false),
    }
}
