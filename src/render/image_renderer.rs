use super::TileSink;
use crate::error::MazeError;
use crate::grid::{Direction, Position, Size};
use crate::tile::{walls_for, WallType};

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use log::info;
use std::path::PathBuf;

const UNPLACED: Rgba<u8> = Rgba([40, 40, 40, 255]);
const FLOOR: Rgba<u8> = Rgba([235, 235, 225, 255]);
const WALL: Rgba<u8> = Rgba([20, 20, 30, 255]);

/// Image file renderer that paints every placed tile and saves the result to disk
pub struct ImageRenderer {
    output_path: PathBuf,
    cell_size: u32,
    canvas: RgbaImage,
}

impl ImageRenderer {
    pub fn new(output_path: PathBuf, size: Size, cell_size: u32) -> Self {
        let cell_size = cell_size.max(3);

        Self {
            output_path,
            cell_size,
            canvas: RgbaImage::from_pixel(
                size.width as u32 * cell_size,
                size.height as u32 * cell_size,
                UNPLACED,
            ),
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    fn wall_rect(&self, x0: i32, y0: i32, direction: Direction) -> Rect {
        let size = self.cell_size;
        let thickness = (size / 8).max(1);
        let far = (size - thickness) as i32;

        match direction {
            Direction::Up => Rect::at(x0, y0).of_size(size, thickness),
            Direction::Down => Rect::at(x0, y0 + far).of_size(size, thickness),
            Direction::Left => Rect::at(x0, y0).of_size(thickness, size),
            Direction::Right => Rect::at(x0 + far, y0).of_size(thickness, size),
        }
    }
}

impl TileSink for ImageRenderer {
    fn apply_placement(&mut self, (x, y): Position, wall_type: WallType, rotation_units: i32) {
        let x0 = (x as u32 * self.cell_size) as i32;
        let y0 = (y as u32 * self.cell_size) as i32;
        let rotation = Direction::from_rotation_units(rotation_units).unwrap_or(Direction::Up);

        draw_filled_rect_mut(
            &mut self.canvas,
            Rect::at(x0, y0).of_size(self.cell_size, self.cell_size),
            FLOOR,
        );

        for (direction, &wall) in walls_for(wall_type, rotation).iter() {
            if wall {
                let rect = self.wall_rect(x0, y0, direction);
                draw_filled_rect_mut(&mut self.canvas, rect, WALL);
            }
        }
    }

    fn finalize(&mut self) -> Result<(), MazeError> {
        self.canvas.save(&self.output_path)?;

        info!("Saved maze image to {}", self.output_path.display());

        Ok(())
    }
}
