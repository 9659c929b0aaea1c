use super::{AppliedTile, TileSink};
use crate::error::MazeError;
use crate::grid::Position;
use crate::tile::WallType;

use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Writes the placement log, in application order, as a JSON array
pub struct JsonRenderer {
    output_path: PathBuf,
    applied: Vec<AppliedTile>,
}

impl JsonRenderer {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            applied: Vec::new(),
        }
    }
}

impl TileSink for JsonRenderer {
    fn apply_placement(&mut self, position: Position, wall_type: WallType, rotation_units: i32) {
        self.applied.push(AppliedTile {
            position,
            wall_type,
            rotation_units,
        });
    }

    fn finalize(&mut self) -> Result<(), MazeError> {
        let writer = BufWriter::new(File::create(&self.output_path)?);

        serde_json::to_writer_pretty(writer, &self.applied)?;

        info!(
            "Wrote {} placements to {}",
            self.applied.len(),
            self.output_path.display()
        );

        Ok(())
    }
}
