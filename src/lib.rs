//! Perfect maze generation with a randomized depth-first backtracker, streamed
//! to a host as finished tiles.
//!
//! The [`maze::Backtracker`] carves the maze and emits a [`queue::Placement`]
//! for every cell whose walls are final. A [`scheduler::Scheduler`] drains
//! those placements into a [`render::TileSink`] immediately, one at a time
//! with a delay, or within a time budget per frame.

pub mod error;
pub mod grid;
pub mod maze;
pub mod producer;
pub mod queue;
pub mod render;
pub mod scheduler;
pub mod signal;
pub mod tile;

pub use error::MazeError;
pub use grid::{Direction, Grid, Position, Size};
pub use maze::{Backtracker, GeneratorState};
pub use queue::{Placement, PlacementQueue};
pub use render::{Observer, RenderEvent, TileSink};
pub use scheduler::{CancelHandle, GenerationConfig, Policy, RunOutcome, Scheduler, TickStatus};
pub use signal::CancelToken;
pub use tile::{classify, Tile, WallType};
