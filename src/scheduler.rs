use core::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rand::rngs::OsRng;
use rand::Rng;

use crate::error::MazeError;
use crate::grid::Size;
use crate::maze::{Backtracker, GeneratorState};
use crate::producer::Producer;
use crate::queue::{Placement, PlacementQueue};
use crate::render::{Observer, TileSink};
use crate::signal::CancelToken;

/// Longest the immediate and throttled policies block waiting for the generator.
const IDLE_WAIT: Duration = Duration::from_millis(5);
pub const DEFAULT_BUDGET: Duration = Duration::from_micros(400);
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How queued placements are handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Apply everything as soon as it is available.
    Immediate,
    /// Apply one placement, then wait for the configured delay.
    Throttled,
    /// Apply placements for at most the configured budget per tick.
    Budgeted,
}

impl Policy {
    /// Budgeted when there is no delay, throttled otherwise.
    pub fn from_delay(delay: Duration) -> Self {
        if delay.is_zero() {
            Policy::Budgeted
        } else {
            Policy::Throttled
        }
    }
}

impl FromStr for Policy {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(Policy::Immediate),
            "throttled" => Ok(Policy::Throttled),
            "budgeted" => Ok(Policy::Budgeted),
            _ => Err(MazeError::InvalidPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub size: Size,
    /// Wait between placements for [`Policy::Throttled`].
    pub delay: Duration,
    pub policy: Policy,
    /// Generate on a background worker and apply placements on the thread
    /// driving the scheduler. When unset the whole maze is generated inside
    /// [`Scheduler::request_generation`] before anything is applied.
    pub deferred: bool,
    pub seed: Option<u64>,
    /// Time slice per tick for [`Policy::Budgeted`].
    pub budget: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size: Size::new(20, 20),
            delay: Duration::ZERO,
            policy: Policy::Budgeted,
            deferred: true,
            seed: None,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl GenerationConfig {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_deferred(mut self, deferred: bool) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn validate(&self) -> Result<(), MazeError> {
        self.size.validate()?;

        if self.policy == Policy::Budgeted && self.budget.is_zero() {
            return Err(MazeError::InvalidBudget);
        }

        Ok(())
    }
}

/// Result of one scheduling opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// No run in flight.
    Idle,
    /// The run needs more ticks.
    Pending,
    /// The run ended during this tick; `on_done` has fired.
    Finished(RunOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Cancels the run it was taken from; may be sent to other threads.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
    queue: PlacementQueue,
}

impl CancelHandle {
    /// Stops the generator at its next step and drops every queued placement.
    pub fn cancel(&self) {
        self.token.cancel();
        self.queue.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

struct Run {
    config: GenerationConfig,
    cancel: CancelToken,
    producer: Producer,
}

/// Drains generated placements into a [`TileSink`] under the configured [`Policy`].
pub struct Scheduler<S: TileSink, O: Observer> {
    sink: S,
    observer: O,
    queue: PlacementQueue,
    run: Option<Run>,
    placed: usize,
    frame_interval: Duration,
}

impl<S: TileSink, O: Observer> Scheduler<S, O> {
    pub fn new(sink: S, observer: O) -> Self {
        Self {
            sink,
            observer,
            queue: PlacementQueue::new(),
            run: None,
            placed: 0,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }

    /// Pause between ticks when [`Scheduler::run`] drives a budgeted run.
    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Distinct cells applied in the current run.
    pub fn placed(&self) -> usize {
        self.placed
    }

    /// Placements waiting to be applied.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn policy(&self) -> Option<Policy> {
        self.run.as_ref().map(|run| run.config.policy)
    }

    pub fn cancel_handle(&self) -> Option<CancelHandle> {
        self.run.as_ref().map(|run| CancelHandle {
            token: run.cancel.clone(),
            queue: self.queue.clone(),
        })
    }

    /// Starts a new run.
    ///
    /// Returns `Ok(false)` without touching anything if a previous run is
    /// still in flight or its placements have not all been applied yet.
    pub fn request_generation(&mut self, config: &GenerationConfig) -> Result<bool, MazeError> {
        config.validate()?;

        if self.run.is_some() || !self.queue.is_empty() {
            debug!("Ignoring generation request, previous run still in flight");
            return Ok(false);
        }

        let seed = config.seed.unwrap_or_else(|| OsRng.gen());

        info!(
            "Generating {}x{} maze with seed {} ({:?}, deferred: {})",
            config.size.width, config.size.height, seed, config.policy, config.deferred
        );

        let maze = Backtracker::new(config.size, seed)?;
        let cancel = CancelToken::new();

        // fresh per run; cancel handles from earlier runs keep the old one
        self.queue = PlacementQueue::new();

        let producer = if config.deferred {
            Producer::spawn(maze, self.queue.clone(), cancel.clone())?
        } else {
            Producer::inline(maze, &self.queue, &cancel)
        };

        self.run = Some(Run {
            config: config.clone(),
            cancel,
            producer,
        });

        if config.policy == Policy::Budgeted {
            self.sink.request_tick();
        }

        Ok(true)
    }

    /// Cancels the current run: the queue is emptied, progress drops to zero,
    /// the generator is stopped and `on_done` fires. Placements already
    /// applied stay where they are.
    pub fn cancel(&mut self) -> Option<RunOutcome> {
        let handle = self.cancel_handle()?;

        handle.cancel();

        Some(self.finish())
    }

    /// One scheduling opportunity under the active policy.
    pub fn tick(&mut self) -> TickStatus {
        let (policy, cancel) = match &self.run {
            None => return TickStatus::Idle,
            Some(run) => (run.config.policy, run.cancel.clone()),
        };

        if cancel.is_cancelled() {
            return TickStatus::Finished(self.finish());
        }

        match policy {
            Policy::Immediate => self.pump_immediate(),
            Policy::Throttled => self.pump_throttled(&cancel),
            Policy::Budgeted => self.pump_budgeted(),
        }
    }

    /// Ticks until the current run ends, standing in for the host's frame
    /// loop when the policy is budgeted.
    pub fn run(&mut self) -> Option<RunOutcome> {
        loop {
            match self.tick() {
                TickStatus::Idle => return None,
                TickStatus::Finished(outcome) => return Some(outcome),
                TickStatus::Pending => {
                    if self.policy() == Some(Policy::Budgeted) {
                        thread::sleep(self.frame_interval);
                    }
                }
            }
        }
    }

    fn pump_immediate(&mut self) -> TickStatus {
        if let Some(placement) = self.next_placement() {
            self.apply(placement);

            while let Some(placement) = self.queue.pop() {
                self.apply(placement);
            }

            self.observer.on_progress(self.placed);
        }

        self.check_finished()
    }

    fn pump_throttled(&mut self, cancel: &CancelToken) -> TickStatus {
        if let Some(placement) = self.next_placement() {
            self.apply(placement);
            self.observer.on_progress(self.placed);
        }

        if let status @ TickStatus::Finished(_) = self.check_finished() {
            return status;
        }

        let delay = self
            .run
            .as_ref()
            .map(|run| run.config.delay)
            .unwrap_or_default();

        if !delay.is_zero() && self.sink.delay(delay, cancel) {
            return TickStatus::Finished(self.finish());
        }

        TickStatus::Pending
    }

    fn pump_budgeted(&mut self) -> TickStatus {
        let budget = self
            .run
            .as_ref()
            .map(|run| run.config.budget)
            .unwrap_or(DEFAULT_BUDGET);
        let started = Instant::now();

        while started.elapsed() < budget {
            match self.queue.pop() {
                Some(placement) => self.apply(placement),
                None => break,
            }
        }

        self.observer.on_progress(self.placed);

        let status = self.check_finished();

        if status == TickStatus::Pending {
            self.sink.request_tick();
        }

        status
    }

    /// Pops the next placement, briefly waiting for the generator if it is
    /// still running.
    fn next_placement(&mut self) -> Option<Placement> {
        if let Some(placement) = self.queue.pop() {
            return Some(placement);
        }

        let producer_running = match self.run.as_mut() {
            Some(run) => run.producer.poll().is_none(),
            None => false,
        };

        if producer_running {
            self.queue.pop_timeout(IDLE_WAIT)
        } else {
            None
        }
    }

    fn apply(&mut self, placement: Placement) {
        trace!("Placing {:?}", placement);

        self.sink.apply_placement(
            placement.position,
            placement.wall_type,
            placement.rotation_units(),
        );

        if placement.is_new() {
            self.placed += 1;
        }
    }

    fn check_finished(&mut self) -> TickStatus {
        let producer_done = match self.run.as_mut() {
            None => return TickStatus::Idle,
            Some(run) => run.producer.poll().is_some(),
        };

        // the generator pushes before it reports, so this order sees every record
        if producer_done && self.queue.is_empty() {
            TickStatus::Finished(self.finish())
        } else {
            TickStatus::Pending
        }
    }

    fn finish(&mut self) -> RunOutcome {
        let Some(mut run) = self.run.take() else {
            return RunOutcome::Cancelled;
        };

        let state = run.producer.wait();

        let outcome = if run.cancel.is_cancelled() || state == GeneratorState::Cancelled {
            self.queue.close();
            RunOutcome::Cancelled
        } else {
            RunOutcome::Completed
        };

        info!(
            "Generation {:?} after placing {} of {} cells",
            outcome,
            self.placed,
            run.config.size.area()
        );

        self.placed = 0;
        self.observer.on_done();

        outcome
    }
}

impl<S: TileSink, O: Observer> Drop for Scheduler<S, O> {
    fn drop(&mut self) {
        if let Some(run) = &self.run {
            run.cancel.cancel();
            self.queue.close();
        }
    }
}
