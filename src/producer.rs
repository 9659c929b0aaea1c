use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::error::MazeError;
use crate::maze::{Backtracker, GeneratorState};
use crate::queue::PlacementQueue;
use crate::signal::CancelToken;

#[cfg(feature = "threaded")]
const MAX_GENERATOR_THREADS: usize = 2;

#[cfg(feature = "threaded")]
lazy_static::lazy_static! {
    static ref GENERATOR_POOL: rayon::ThreadPool = rayon::ThreadPoolBuilder::new()
        .num_threads(MAX_GENERATOR_THREADS)
        .thread_name(|i| format!("maze-generator-{}", i))
        .build()
        .expect("failed to build maze generator thread pool");
}

/// The generator side of a run, either still working in the background or done.
#[derive(Debug)]
pub enum Producer {
    Running(Receiver<GeneratorState>),
    Finished(GeneratorState),
}

impl Producer {
    /// Runs `maze` on the calling thread until it finishes.
    pub fn inline(mut maze: Backtracker, queue: &PlacementQueue, cancel: &CancelToken) -> Self {
        Producer::Finished(maze.run(queue, cancel))
    }

    /// Moves `maze` to a background worker. The grid never leaves that worker;
    /// only placements come back through `queue`.
    pub fn spawn(
        mut maze: Backtracker,
        queue: PlacementQueue,
        cancel: CancelToken,
    ) -> Result<Self, MazeError> {
        let rx = spawn_job(move || maze.run(&queue, &cancel))?;

        Ok(Producer::Running(rx))
    }

    /// Non-blocking completion check.
    pub fn poll(&mut self) -> Option<GeneratorState> {
        match self {
            Producer::Finished(state) => Some(*state),
            Producer::Running(rx) => match rx.try_recv() {
                Ok(state) => {
                    *self = Producer::Finished(state);
                    Some(state)
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => panic!("maze generator panicked"),
            },
        }
    }

    /// Blocks until the generator has stopped.
    pub fn wait(&mut self) -> GeneratorState {
        match self {
            Producer::Finished(state) => *state,
            Producer::Running(rx) => {
                let state = rx.recv().unwrap_or_else(|_| panic!("maze generator panicked"));
                *self = Producer::Finished(state);
                state
            }
        }
    }
}

/// Runs `job` on a background worker and reports its result on the returned
/// channel. A panicking job drops the sender without reporting.
pub fn spawn_job<F>(job: F) -> Result<Receiver<GeneratorState>, MazeError>
where
    F: FnOnce() -> GeneratorState + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(1);
    let job = move || {
        // rayon aborts the process on a panicking job
        if let Ok(state) = panic::catch_unwind(AssertUnwindSafe(job)) {
            tx.send(state).ok();
        }
    };

    #[cfg(feature = "threaded")]
    GENERATOR_POOL.spawn(job);

    #[cfg(not(feature = "threaded"))]
    std::thread::Builder::new()
        .name("maze-generator".to_string())
        .spawn(job)?;

    Ok(rx)
}

