use maze_gen::{
    grid::{Direction, Size},
    render::TileSink,
    tile::WallType,
};

#[cfg(feature = "image")]
#[test]
fn test_image_renderer_draws_walls() {
    use maze_gen::render::image_renderer::ImageRenderer;

    let path = std::env::temp_dir().join("maze_gen_render_test.png");
    let mut renderer = ImageRenderer::new(path.clone(), Size::new(2, 1), 16);

    assert_eq!(renderer.canvas().dimensions(), (32, 16));

    // Left cell open to the right, right cell open to the left
    renderer.apply_placement((0, 0), WallType::DeadEnd, Direction::Right.rotation_units());
    renderer.apply_placement((1, 0), WallType::DeadEnd, Direction::Left.rotation_units());

    let canvas = renderer.canvas();
    let wall = *canvas.get_pixel(0, 8);
    let floor = *canvas.get_pixel(8, 8);

    assert_ne!(wall, floor);
    assert_eq!(*canvas.get_pixel(8, 0), wall);
    // The passage between both cells is open
    assert_eq!(*canvas.get_pixel(15, 8), floor);
    assert_eq!(*canvas.get_pixel(16, 8), floor);
    assert_eq!(*canvas.get_pixel(31, 8), wall);

    renderer.finalize().unwrap();
    assert!(path.exists());
    std::fs::remove_file(path).ok();
}

#[cfg(feature = "json")]
#[test]
fn test_json_renderer_writes_log() {
    use maze_gen::render::json_renderer::JsonRenderer;
    use maze_gen::render::AppliedTile;

    let path = std::env::temp_dir().join("maze_gen_render_test.json");
    let mut renderer = JsonRenderer::new(path.clone());

    renderer.apply_placement((0, 0), WallType::Corner, Direction::Left.rotation_units());
    renderer.apply_placement((1, 0), WallType::Hallway, Direction::Right.rotation_units());
    renderer.finalize().unwrap();

    let file = std::fs::File::open(&path).unwrap();
    let applied: Vec<AppliedTile> = serde_json::from_reader(file).unwrap();

    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].wall_type, WallType::Corner);
    assert_eq!(applied[0].rotation(), Some(Direction::Left));
    assert_eq!(applied[1].position, (1, 0));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_fan_out_sinks() {
    use maze_gen::render::Recorder;

    let mut sinks = vec![Recorder::new(), Recorder::new()];

    sinks.apply_placement((2, 3), WallType::Single, Direction::Down.rotation_units());
    sinks.request_tick();

    for recorder in &sinks {
        assert_eq!(recorder.applied.len(), 1);
        assert_eq!(recorder.ticks_requested, 1);

        let tile = recorder.cell((2, 3)).unwrap();
        assert_eq!(tile.rotation(), Some(Direction::Down));
        assert!(tile.walls()[Direction::Down]);
        assert!(!tile.walls()[Direction::Up]);
    }
}

#[test]
fn test_observer_defaults_ignore_progress() {
    use maze_gen::render::{Observer, Recorder};
    use maze_gen::scheduler::{GenerationConfig, Policy, RunOutcome, Scheduler};

    #[derive(Default)]
    struct DoneCounter {
        done: usize,
    }

    impl Observer for DoneCounter {
        fn on_done(&mut self) {
            self.done += 1;
        }
    }

    let mut scheduler = Scheduler::new(Recorder::new(), DoneCounter::default());
    let config = GenerationConfig::new(Size::new(4, 4))
        .with_policy(Policy::Immediate)
        .with_deferred(false)
        .with_seed(42);

    scheduler.request_generation(&config).unwrap();

    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));
    assert_eq!(scheduler.observer().done, 1);
    assert_eq!(scheduler.sink().cell_count(), 16);
}
