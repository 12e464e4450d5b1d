//! Cooperative tasks.
//!
//! Processes and the boot supervisor run as tasks on one [`Executor`]. A
//! task waiting for a key sits in no ready queue until the keyboard
//! producer wakes it.

use core::{
    future::Future,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
};
use futures_util::future::{FutureExt, LocalBoxFuture};

pub mod executor;
pub mod keyboard;

pub use executor::{Executor, QueueFull};
pub use keyboard::KeyboardQueue;

/// Identifies a task within its executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn allocate() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        TaskId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which ready queue a task is polled from. Higher drains first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Background kernel work.
    Idle = 0,
    /// User processes.
    Normal = 1,
    /// Supervisors that launch and reap processes.
    High = 2,
}

impl Priority {
    /// Number of priority levels, one ready queue each.
    pub const COUNT: usize = 3;

    fn queue_index(self) -> usize {
        self as usize
    }
}

/// A spawned future and its scheduling data.
pub struct Task {
    id: TaskId,
    priority: Priority,
    future: LocalBoxFuture<'static, ()>,
}

impl Task {
    /// A task at [`Priority::Normal`].
    pub fn new(future: impl Future<Output = ()> + 'static) -> Task {
        Self::with_priority(future, Priority::Normal)
    }

    /// A task at `priority`.
    pub fn with_priority(future: impl Future<Output = ()> + 'static, priority: Priority) -> Task {
        Task {
            id: TaskId::allocate(),
            priority,
            future: future.boxed_local(),
        }
    }

    /// The task's identifier.
    pub fn id(&self) -> TaskId {
        self.id
    }

    fn poll(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        self.future.poll_unpin(cx)
    }
}
