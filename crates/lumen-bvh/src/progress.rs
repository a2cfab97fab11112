//! Progress reporting during scene flattening and construction.

/// Receives progress updates while a hierarchy is being built.
///
/// Purely informational; implementations must not influence the build.
pub trait TaskTracker: Send + Sync {
    /// Report that `done` out of `target` units of work are complete.
    fn update(&self, target: u32, done: u32);
}

/// A tracker that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTask;

impl TaskTracker for NullTask {
    fn update(&self, _target: u32, _done: u32) {}
}

/// Total work units reported by a full rebuild.
pub(crate) const PROGRESS_TARGET: u32 = 1000;

/// Work units reserved for flattening entities into primitives.
pub(crate) const FLATTEN_SHARE: u32 = 500;

/// Maps `done / total` into the `[offset, offset + share]` slice of the
/// overall progress bar, never reporting a value lower than the last one.
#[derive(Debug)]
pub(crate) struct Phase<'a> {
    task: &'a dyn TaskTracker,
    offset: u32,
    share: u32,
    total: usize,
    last: u32,
}

impl<'a> Phase<'a> {
    pub(crate) fn new(task: &'a dyn TaskTracker, offset: u32, share: u32, total: usize) -> Self {
        Self {
            task,
            offset,
            share,
            total,
            last: offset,
        }
    }

    pub(crate) fn advance(&mut self, done: usize) {
        if self.total == 0 {
            return;
        }
        let fraction = done.min(self.total) as f64 / self.total as f64;
        let value = self.offset + (fraction * f64::from(self.share)) as u32;
        if value > self.last {
            self.last = value;
            self.task.update(PROGRESS_TARGET, value);
        }
    }
}

impl std::fmt::Debug for dyn TaskTracker + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TaskTracker")
    }
}
