//! A cooperative, priority-ordered task executor.
//!
//! A task is polled only when it sits in a ready queue. Tasks waiting on the
//! keyboard are in no queue at all until their waker puts them back.

use super::{Priority, Task, TaskId};
use alloc::{collections::BTreeMap, sync::Arc};
use core::{
    fmt,
    task::{Context, Poll, Waker},
};
use crossbeam_queue::ArrayQueue;
use futures_util::task::ArcWake;

/// Capacity of each ready queue.
const READY_QUEUE_CAPACITY: usize = 100;

/// Every slot of a ready queue is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ready queue full ({} tasks)", READY_QUEUE_CAPACITY)
    }
}

/// Runs tasks until they complete.
pub struct Executor {
    tasks: BTreeMap<TaskId, Task>,
    ready_queues: [Arc<ArrayQueue<TaskId>>; Priority::COUNT],
    waker_cache: BTreeMap<TaskId, Waker>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    /// Create a new executor.
    pub fn new() -> Self {
        Executor {
            tasks: BTreeMap::new(),
            ready_queues: core::array::from_fn(|_| {
                Arc::new(ArrayQueue::new(READY_QUEUE_CAPACITY))
            }),
            waker_cache: BTreeMap::new(),
        }
    }

    /// Spawn a new task; it is ready immediately.
    ///
    /// # Panics
    ///
    /// Panics if the task's ready queue is full. See [`Executor::try_spawn`].
    pub fn spawn(&mut self, task: Task) -> TaskId {
        match self.try_spawn(task) {
            Ok(task_id) => task_id,
            Err(_) => panic!("{}", QueueFull),
        }
    }

    /// Spawn a new task, handing it back if its ready queue is full.
    pub fn try_spawn(&mut self, task: Task) -> Result<TaskId, Task> {
        let task_id = task.id;
        if self.ready_queues[task.priority.queue_index()]
            .push(task_id)
            .is_err()
        {
            return Err(task);
        }
        if self.tasks.insert(task_id, task).is_some() {
            panic!("task with same ID already in tasks");
        }
        Ok(task_id)
    }

    /// Number of tasks that have not finished.
    pub fn live_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task is ready to run.
    pub fn is_idle(&self) -> bool {
        self.ready_queues.iter().all(|q| q.is_empty())
    }

    /// Polls ready tasks, highest priority first, until none is ready.
    ///
    /// Blocked tasks stay parked; they run again once woken.
    pub fn run_until_idle(&mut self) {
        while !self.is_idle() {
            self.run_ready_tasks();
        }
    }

    /// Drain the ready queues once.
    fn run_ready_tasks(&mut self) {
        for priority in (0..Priority::COUNT).rev() {
            while let Some(task_id) = self.ready_queues[priority].pop() {
                let task = match self.tasks.get_mut(&task_id) {
                    Some(task) => task,
                    None => continue, // stale wake-up for a finished task
                };

                let queue = &self.ready_queues[priority];
                let waker = self
                    .waker_cache
                    .entry(task_id)
                    .or_insert_with(|| TaskWaker::new(task_id, queue.clone()));

                let mut context = Context::from_waker(waker);
                if let Poll::Ready(()) = task.poll(&mut context) {
                    self.tasks.remove(&task_id);
                    self.waker_cache.remove(&task_id);
                }
            }
        }
    }

    /// Run tasks forever, halting the CPU while nothing is ready.
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    pub fn run(&mut self) -> ! {
        loop {
            self.run_ready_tasks();
            self.sleep_if_idle();
        }
    }

    /// Sleep the CPU if no tasks are ready.
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    fn sleep_if_idle(&self) {
        use x86_64::instructions::interrupts;

        // Interrupts off so a wake-up cannot slip in between check and hlt.
        interrupts::disable();
        if self.is_idle() {
            interrupts::enable_and_hlt();
        } else {
            interrupts::enable();
        }
    }
}

struct TaskWaker {
    task_id: TaskId,
    ready_queue: Arc<ArrayQueue<TaskId>>,
}

impl TaskWaker {
    #[allow(clippy::new_ret_no_self)]
    fn new(task_id: TaskId, ready_queue: Arc<ArrayQueue<TaskId>>) -> Waker {
        futures_util::task::waker(Arc::new(TaskWaker {
            task_id,
            ready_queue,
        }))
    }
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        // A full queue already holds enough wake-ups to get the task polled.
        let _ = arc_self.ready_queue.push(arc_self.task_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::{Cell, RefCell};

    #[test]
    fn test_tasks_run_to_completion() {
        let mut executor = Executor::new();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            executor.spawn(Task::new(async move { hits.set(hits.get() + 1) }));
        }
        executor.run_until_idle();
        assert_eq!(hits.get(), 3);
        assert_eq!(executor.live_tasks(), 0);
    }

    #[test]
    fn test_higher_priority_runs_first() {
        let mut executor = Executor::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, priority) in [("idle", Priority::Idle), ("high", Priority::High), ("normal", Priority::Normal)] {
            let order = order.clone();
            executor.spawn(Task::with_priority(
                async move { order.borrow_mut().push(label) },
                priority,
            ));
        }
        executor.run_until_idle();
        assert_eq!(*order.borrow(), ["high", "normal", "idle"]);
    }

    #[test]
    fn test_full_ready_queue_hands_task_back() {
        let mut executor = Executor::new();
        for _ in 0..READY_QUEUE_CAPACITY {
            assert!(executor.try_spawn(Task::new(async {})).is_ok());
        }

        let rejected = executor.try_spawn(Task::new(async {}));
        assert!(rejected.is_err());
        assert_eq!(executor.live_tasks(), READY_QUEUE_CAPACITY);

        // Other priorities have their own queues.
        assert!(executor
            .try_spawn(Task::with_priority(async {}, Priority::High))
            .is_ok());

        executor.run_until_idle();
        assert_eq!(executor.live_tasks(), 0);
        assert!(executor.try_spawn(Task::new(async {})).is_ok());
    }

    #[test]
    fn test_blocked_task_resumes_after_wake() {
        use crate::task::KeyboardQueue;

        let queue: &'static KeyboardQueue = Box::leak(Box::new(KeyboardQueue::new(4)));
        let got = Rc::new(Cell::new(None));
        let mut executor = Executor::new();
        {
            let got = got.clone();
            executor.spawn(Task::new(async move {
                got.set(Some(queue.next_key().await));
            }));
        }

        executor.run_until_idle();
        assert!(executor.is_idle());
        assert_eq!(executor.live_tasks(), 1);
        assert_eq!(got.get(), None);

        queue.push_key(b'y');
        assert!(!executor.is_idle());
        executor.run_until_idle();
        assert_eq!(got.get(), Some(b'y'));
        assert_eq!(executor.live_tasks(), 0);
    }
}
