use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use maze_gen::{
    grid::Size,
    maze::Backtracker,
    queue::{Placement, PlacementQueue},
    render::{AppliedTile, Recorder, RenderEvent},
    scheduler::{GenerationConfig, Policy, RunOutcome, Scheduler, TickStatus},
    tile::WallType,
    MazeError,
};

// Fixed seed for deterministic tests
const TEST_SEED: u64 = 42;

type TestScheduler = Scheduler<Recorder, Vec<RenderEvent>>;

fn create_scheduler() -> TestScheduler {
    Scheduler::new(Recorder::new(), Vec::new()).with_frame_interval(Duration::from_millis(1))
}

fn config(size: usize, policy: Policy) -> GenerationConfig {
    GenerationConfig::new(Size::new(size, size))
        .with_policy(policy)
        .with_seed(TEST_SEED)
}

fn done_count(scheduler: &TestScheduler) -> usize {
    scheduler
        .observer()
        .iter()
        .filter(|event| **event == RenderEvent::Done)
        .count()
}

fn last_progress(scheduler: &TestScheduler) -> Option<usize> {
    scheduler.observer().iter().rev().find_map(|event| match event {
        RenderEvent::Progress(placed) => Some(*placed),
        RenderEvent::Done => None,
    })
}

fn expected_tiles(size: usize) -> Vec<AppliedTile> {
    let (_, placements) = Backtracker::generate(Size::new(size, size), TEST_SEED).unwrap();

    placements
        .iter()
        .map(|p| AppliedTile {
            position: p.position,
            wall_type: p.wall_type,
            rotation_units: p.rotation_units(),
        })
        .collect()
}

fn assert_completed(scheduler: &TestScheduler, size: usize) {
    let recorder = scheduler.sink();

    assert!(!scheduler.is_running());
    assert_eq!(scheduler.placed(), 0);
    assert_eq!(scheduler.queued(), 0);
    assert_eq!(recorder.cell_count(), size * size);
    assert_eq!(done_count(scheduler), 1);
    assert_eq!(scheduler.observer().last(), Some(&RenderEvent::Done));
    assert_eq!(last_progress(scheduler), Some(size * size));

    // Applied in exactly the order the generator emitted them
    assert_eq!(recorder.applied, expected_tiles(size));
}

#[test]
fn test_immediate_policy_inline() {
    let mut scheduler = create_scheduler();

    assert!(scheduler
        .request_generation(&config(8, Policy::Immediate).with_deferred(false))
        .unwrap());
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    assert_completed(&scheduler, 8);
}

#[test]
fn test_immediate_policy_background() {
    let mut scheduler = create_scheduler();

    assert!(scheduler
        .request_generation(&config(16, Policy::Immediate))
        .unwrap());
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    assert_completed(&scheduler, 16);
}

#[test]
fn test_throttled_policy_without_delay() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(10, Policy::Throttled))
        .unwrap();
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    assert_completed(&scheduler, 10);
}

#[test]
fn test_throttled_policy_reports_every_placement() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(
            &config(3, Policy::Throttled)
                .with_delay(Duration::from_millis(1))
                .with_deferred(false),
        )
        .unwrap();
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    assert_completed(&scheduler, 3);

    let progress = scheduler
        .observer()
        .iter()
        .filter(|event| matches!(event, RenderEvent::Progress(_)))
        .count();
    assert_eq!(progress, scheduler.sink().applied.len());
}

#[test]
fn test_budgeted_policy_run() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(20, Policy::Budgeted))
        .unwrap();
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    assert_completed(&scheduler, 20);
    assert!(scheduler.sink().ticks_requested >= 1);
}

#[test]
fn test_budgeted_policy_ticks() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(12, Policy::Budgeted).with_deferred(false))
        .unwrap();

    // Starting a budgeted run asks the host for the first tick
    assert_eq!(scheduler.sink().ticks_requested, 1);

    let mut ticks = 0;
    let outcome = loop {
        ticks += 1;
        match scheduler.tick() {
            TickStatus::Pending => continue,
            TickStatus::Finished(outcome) => break outcome,
            TickStatus::Idle => panic!("run vanished"),
        }
    };

    assert_eq!(outcome, RunOutcome::Completed);
    assert_completed(&scheduler, 12);

    // Every tick but the last one asked for another
    assert_eq!(scheduler.sink().ticks_requested, ticks);
    assert_eq!(scheduler.tick(), TickStatus::Idle);
}

#[test]
fn test_all_policies_apply_the_same_records() {
    let mut applied = Vec::new();

    for policy in [Policy::Immediate, Policy::Throttled, Policy::Budgeted] {
        let mut scheduler = create_scheduler();

        scheduler.request_generation(&config(9, policy)).unwrap();
        scheduler.run();

        applied.push(scheduler.sink().applied.clone());
    }

    assert_eq!(applied[0], applied[1]);
    assert_eq!(applied[1], applied[2]);
}

#[test]
fn test_single_cell_run() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(1, Policy::Immediate))
        .unwrap();
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    let recorder = scheduler.sink();
    assert_eq!(recorder.applied.len(), 1);
    assert_eq!(recorder.applied[0].wall_type, WallType::Closed);
    assert_eq!(done_count(&scheduler), 1);
}

#[test]
fn test_redundant_start_is_ignored() {
    let mut scheduler = create_scheduler();
    let config = config(6, Policy::Throttled).with_deferred(false);

    assert!(scheduler.request_generation(&config).unwrap());

    let queued = scheduler.queued();
    assert!(queued > 0);

    // Apply a couple, then try to start over
    scheduler.tick();
    scheduler.tick();

    let queued = scheduler.queued();
    let applied = scheduler.sink().applied.clone();

    assert!(!scheduler.request_generation(&config).unwrap());
    assert!(!scheduler
        .request_generation(&config.clone().with_seed(7))
        .unwrap());

    assert_eq!(scheduler.queued(), queued);
    assert_eq!(scheduler.sink().applied, applied);
    assert!(scheduler.is_running());

    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));
    assert_eq!(done_count(&scheduler), 1);
}

#[test]
fn test_invalid_size_is_rejected() {
    let mut scheduler = create_scheduler();
    let result = scheduler.request_generation(&GenerationConfig::new(Size::new(0, 4)));

    assert!(matches!(
        result,
        Err(MazeError::InvalidSize {
            width: 0,
            height: 4
        })
    ));
    assert!(!scheduler.is_running());
}

#[test]
fn test_cancel_mid_run() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(10, Policy::Throttled).with_deferred(false))
        .unwrap();

    for _ in 0..5 {
        assert_eq!(scheduler.tick(), TickStatus::Pending);
    }

    assert_eq!(scheduler.sink().applied.len(), 5);
    assert!(scheduler.placed() > 0);

    assert_eq!(scheduler.cancel(), Some(RunOutcome::Cancelled));

    assert_eq!(scheduler.queued(), 0);
    assert_eq!(scheduler.placed(), 0);
    assert_eq!(done_count(&scheduler), 1);
    assert!(!scheduler.is_running());

    // Nothing else is applied for that run
    assert_eq!(scheduler.tick(), TickStatus::Idle);
    assert_eq!(scheduler.run(), None);
    assert_eq!(scheduler.sink().applied.len(), 5);
    assert_eq!(done_count(&scheduler), 1);

    // A second cancel has nothing to act on
    assert_eq!(scheduler.cancel(), None);
}

#[test]
fn test_cancel_background_run() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(200, Policy::Budgeted).with_budget(Duration::from_micros(50)))
        .unwrap();
    scheduler.tick();

    assert_eq!(scheduler.cancel(), Some(RunOutcome::Cancelled));
    assert_eq!(scheduler.queued(), 0);
    assert_eq!(scheduler.placed(), 0);
    assert_eq!(done_count(&scheduler), 1);
    assert!(scheduler.sink().cell_count() < 200 * 200);
}

#[test]
fn test_cancel_from_another_thread() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(10, Policy::Throttled).with_delay(Duration::from_millis(20)))
        .unwrap();

    let handle = scheduler.cancel_handle().unwrap();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        handle.cancel();
    });

    assert_eq!(scheduler.run(), Some(RunOutcome::Cancelled));
    canceller.join().unwrap();

    assert_eq!(scheduler.queued(), 0);
    assert_eq!(scheduler.placed(), 0);
    assert_eq!(done_count(&scheduler), 1);
    assert!(scheduler.sink().applied.len() < 100);
}

#[test]
fn test_restart_after_cancel() {
    let mut scheduler = create_scheduler();
    let config = config(5, Policy::Immediate).with_deferred(false);

    scheduler.request_generation(&config).unwrap();
    scheduler.cancel();

    scheduler.sink_mut().clear();

    assert!(scheduler.request_generation(&config).unwrap());
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));
    assert_eq!(scheduler.sink().cell_count(), 25);
    assert_eq!(done_count(&scheduler), 2);
}

#[test]
fn test_policy_selection() {
    assert_eq!(Policy::from_delay(Duration::ZERO), Policy::Budgeted);
    assert_eq!(Policy::from_delay(Duration::from_millis(10)), Policy::Throttled);
    assert_eq!("Immediate".parse::<Policy>().unwrap(), Policy::Immediate);
    assert!("fast".parse::<Policy>().is_err());
}

#[test]
fn test_queue_is_fifo_and_closable() {
    let queue = PlacementQueue::new();
    let (_, placements) = Backtracker::generate(Size::new(4, 4), TEST_SEED).unwrap();

    let producer = {
        let queue = queue.clone();
        let placements = placements.clone();

        thread::spawn(move || {
            for placement in placements {
                assert!(queue.push(placement));
            }
        })
    };

    let mut received: Vec<Placement> = Vec::new();
    while received.len() < placements.len() {
        if let Some(placement) = queue.pop_timeout(Duration::from_millis(100)) {
            received.push(placement);
        }
    }
    producer.join().unwrap();

    assert_eq!(received, placements);

    queue.push(placements[0]);
    queue.close();

    assert!(queue.is_empty());
    assert!(queue.is_closed());
    assert!(!queue.push(placements[0]));
    assert_eq!(queue.pop_timeout(Duration::from_millis(1)), None);

    // Closing is final
    assert!(!queue.push(placements[0]));
    assert_eq!(queue.len(), 0);
}

#[test]
fn test_recorder_ascii_render() {
    let mut scheduler = create_scheduler();

    scheduler
        .request_generation(&config(2, Policy::Immediate).with_deferred(false))
        .unwrap();
    scheduler.run();

    let ascii = scheduler.sink().render(Size::new(2, 2));
    let lines: Vec<&str> = ascii.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "+--+--+");
    assert_eq!(lines[4], "+--+--+");
    assert!(!ascii.contains('#'));

    // Three passages in a 2x2 perfect maze, one wall left inside
    let inner_walls = lines[1][3..4].matches('|').count()
        + lines[3][3..4].matches('|').count()
        + lines[2][1..3].matches('-').count() / 2
        + lines[2][4..6].matches('-').count() / 2;
    assert_eq!(inner_walls, 1);

    let seen: HashSet<_> = scheduler.sink().applied.iter().map(|t| t.position).collect();
    assert_eq!(seen.len(), 4);
}

#[test]
fn test_stale_cancel_handle_leaves_next_run_alone() {
    let mut scheduler = create_scheduler();
    let first = config(30, Policy::Immediate).with_deferred(false);

    scheduler.request_generation(&first).unwrap();
    let stale = scheduler.cancel_handle().unwrap();
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));

    scheduler.sink_mut().clear();

    let second = config(8, Policy::Immediate);
    assert!(scheduler.request_generation(&second).unwrap());

    stale.cancel();

    assert!(!scheduler.cancel_handle().unwrap().is_cancelled());
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));
    assert_eq!(scheduler.sink().cell_count(), 64);
    assert_eq!(scheduler.sink().applied, expected_tiles(8));
    assert_eq!(done_count(&scheduler), 2);
}

#[test]
fn test_zero_budget_is_rejected() {
    let mut scheduler = create_scheduler();
    let budgeted = config(3, Policy::Budgeted)
        .with_deferred(false)
        .with_budget(Duration::ZERO);

    assert!(matches!(
        scheduler.request_generation(&budgeted),
        Err(MazeError::InvalidBudget)
    ));
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.queued(), 0);
    assert_eq!(done_count(&scheduler), 0);

    // The budget only matters for budgeted placement
    let immediate = budgeted.with_policy(Policy::Immediate);
    assert!(scheduler.request_generation(&immediate).unwrap());
    assert_eq!(scheduler.run(), Some(RunOutcome::Completed));
}
