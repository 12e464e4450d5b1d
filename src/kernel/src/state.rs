//! Kernel-wide state.
//!
//! Created once at boot by [`init`] and never torn down. Interrupt handlers
//! and the print macros find it through [`kernel`].

use alloc::boxed::Box;
use core::future::Future;
use log::{info, warn};
use novum_hal::TextDisplay;
use spin::{Mutex, Once};

use crate::config::KernelConfig;
use crate::console::Console;
use crate::process::{Pid, Process, ProcessTable, UserGate};
use crate::task::{Executor, KeyboardQueue, QueueFull, Task};

/// Everything the syscalls operate on.
pub struct KernelState {
    /// The console state manager.
    pub console: Mutex<Console>,
    /// Keys delivered by the keyboard interrupt.
    pub keyboard: KeyboardQueue,
    /// Live processes.
    pub processes: ProcessTable,
}

impl KernelState {
    /// Builds kernel state rendering to `display`.
    pub fn new(display: Box<dyn TextDisplay + Send>, config: &KernelConfig) -> Self {
        KernelState {
            console: Mutex::new(Console::new(display, config.text_attribute)),
            keyboard: KeyboardQueue::new(config.keyboard_capacity.max(1)),
            processes: ProcessTable::new(),
        }
    }

    /// Creates a process for `program` without scheduling it.
    ///
    /// Await the returned [`Process`] to run it and collect its exit status.
    pub fn launch<F, Fut>(&'static self, program: F) -> Process
    where
        F: FnOnce(UserGate) -> Fut,
        Fut: Future<Output = i32> + 'static,
    {
        Process::new(self, program)
    }

    /// Creates a process and schedules it on `executor`.
    ///
    /// The exit status is logged; the process table forgets the pid once
    /// the process is torn down. If the executor has no room the process
    /// is dropped before it runs and never appears in the table.
    pub fn spawn<F, Fut>(
        &'static self,
        executor: &mut Executor,
        program: F,
    ) -> Result<Pid, QueueFull>
    where
        F: FnOnce(UserGate) -> Fut,
        Fut: Future<Output = i32> + 'static,
    {
        let process = self.launch(program);
        let pid = process.pid();
        let task = Task::new(async move {
            process.await;
        });
        match executor.try_spawn(task) {
            Ok(_) => Ok(pid),
            Err(_) => {
                warn!("process {}: not started, {}", pid, QueueFull);
                Err(QueueFull)
            }
        }
    }
}

static KERNEL: Once<KernelState> = Once::new();

/// Initializes the global kernel state.
///
/// Idempotent - later calls return the state built by the first one.
pub fn init(display: Box<dyn TextDisplay + Send>, config: &KernelConfig) -> &'static KernelState {
    KERNEL.call_once(|| {
        info!(
            "kernel state ready: keyboard queue holds {} keys",
            config.keyboard_capacity.max(1)
        );
        KernelState::new(display, config)
    })
}

/// The global kernel state, if [`init`] has run.
pub fn kernel() -> Option<&'static KernelState> {
    KERNEL.get()
}
