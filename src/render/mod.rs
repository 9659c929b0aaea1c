pub mod events;
pub mod recorder;

#[cfg(feature = "image")]
pub mod image_renderer;

#[cfg(feature = "json")]
pub mod json_renderer;

use std::time::Duration;

use crate::error::MazeError;
use crate::grid::Position;
use crate::signal::CancelToken;
use crate::tile::WallType;

pub use events::{Observer, RenderEvent};
pub use recorder::{AppliedTile, Recorder};

/// Host side of the placement pipeline: whatever actually shows the tiles.
pub trait TileSink {
    /// Place one finished tile. `rotation_units` is already in the host's
    /// orientation encoding (see [`crate::grid::Direction::rotation_units`]).
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32);

    /// Ask to be ticked again on the next frame. Only used by the budgeted policy.
    fn request_tick(&mut self) {}

    /// Wait between two placements of the throttled policy.
    ///
    /// Returns `true` if the wait was interrupted by `cancel`.
    fn delay(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        cancel.sleep(duration)
    }

    /// Flush whatever the sink produces once a run is over.
    fn finalize(&mut self) -> Result<(), MazeError> {
        Ok(())
    }
}

impl<S: TileSink + ?Sized> TileSink for Box<S> {
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32) {
        (**self).apply_placement(position, wall_type, rotation_units)
    }

    fn request_tick(&mut self) {
        (**self).request_tick()
    }

    fn delay(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        (**self).delay(duration, cancel)
    }

    fn finalize(&mut self) -> Result<(), MazeError> {
        (**self).finalize()
    }
}

/// Fans every placement out to all contained sinks.
impl<S: TileSink> TileSink for Vec<S> {
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32) {
        for sink in self.iter_mut() {
            sink.apply_placement(position, wall_type, rotation_units);
        }
    }

    fn request_tick(&mut self) {
        for sink in self.iter_mut() {
            sink.request_tick();
        }
    }

    fn finalize(&mut self) -> Result<(), MazeError> {
        for sink in self.iter_mut() {
            sink.finalize()?;
        }

        Ok(())
    }
}

impl<A: TileSink, B: TileSink> TileSink for (A, B) {
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32) {
        self.0.apply_placement(position, wall_type, rotation_units);
        self.1.apply_placement(position, wall_type, rotation_units);
    }

    fn request_tick(&mut self) {
        self.0.request_tick();
        self.1.request_tick();
    }

    fn finalize(&mut self) -> Result<(), MazeError> {
        self.0.finalize()?;
        self.1.finalize()
    }
}
