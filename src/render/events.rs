/// Events emitted by the scheduler while a maze is being placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    /// Number of distinct cells applied so far in the current run
    Progress(usize),

    /// The run completed or was cancelled and fully drained
    Done,
}

/// Receives progress and completion notifications from the scheduler.
pub trait Observer {
    fn on_progress(&mut self, _placed: usize) {}

    fn on_done(&mut self) {}
}

impl Observer for () {}

/// Keeps every event in order.
impl Observer for Vec<RenderEvent> {
    fn on_progress(&mut self, placed: usize) {
        self.push(RenderEvent::Progress(placed));
    }

    fn on_done(&mut self) {
        self.push(RenderEvent::Done);
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn on_progress(&mut self, placed: usize) {
        (**self).on_progress(placed)
    }

    fn on_done(&mut self) {
        (**self).on_done()
    }
}
