use crate::cli::AppConfig;

use maze_gen::render::Recorder;
use maze_gen::{Observer, RunOutcome, Scheduler, TileSink};

#[cfg(feature = "image")]
use maze_gen::render::image_renderer::ImageRenderer;

#[cfg(feature = "json")]
use maze_gen::render::json_renderer::JsonRenderer;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::time::Duration;

/// Mirrors scheduler progress onto a terminal progress bar
struct ProgressObserver {
    progress: ProgressBar,
}

impl ProgressObserver {
    fn new(cells: u64) -> Self {
        let progress = ProgressBar::new(cells);
        progress.enable_steady_tick(Duration::from_millis(200));
        progress.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>5}/{len} {per_sec:>12}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        Self { progress }
    }
}

impl Observer for ProgressObserver {
    fn on_progress(&mut self, placed: usize) {
        self.progress.set_position(placed as u64);
    }

    fn on_done(&mut self) {
        self.progress.finish();
    }
}

pub struct MazeApp {
    config: AppConfig,
}

impl MazeApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let size = self.config.generation.size;
        let sink = (Recorder::new(), self.create_renderers());
        let observer = ProgressObserver::new(size.area() as u64);

        let mut scheduler = Scheduler::new(sink, observer);

        if !scheduler.request_generation(&self.config.generation)? {
            warn!("A generation is already in progress");
            return Ok(());
        }

        match scheduler.run() {
            Some(RunOutcome::Completed) => info!("Generation completed"),
            Some(RunOutcome::Cancelled) => warn!("Generation cancelled"),
            None => warn!("Nothing was generated"),
        }

        // Finalize all renderers
        scheduler.sink_mut().finalize()?;

        if self.config.ascii {
            print!("{}", scheduler.sink().0.render(size));
        }

        Ok(())
    }

    fn create_renderers(&self) -> Vec<Box<dyn TileSink>> {
        let mut renderers: Vec<Box<dyn TileSink>> = Vec::new();

        // Add image renderer if output path is specified
        #[cfg(feature = "image")]
        if let Some(output_path) = &self.config.output_path {
            renderers.push(Box::new(ImageRenderer::new(
                output_path.clone(),
                self.config.generation.size,
                self.config.cell_size,
            )));
        }

        #[cfg(feature = "json")]
        if let Some(json_path) = &self.config.json_path {
            renderers.push(Box::new(JsonRenderer::new(json_path.clone())));
        }

        renderers
    }
}
