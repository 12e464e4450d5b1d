//! Process lifecycle.
//!
//! A process is a program future driven as a task. It reaches the kernel
//! only through its [`UserGate`]. Once the process exits, either by
//! calling `exit` or by faulting in dispatch, its future is dropped
//! and no further code of it runs.

use alloc::{boxed::Box, collections::BTreeMap};
use core::{
    fmt,
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicU64, Ordering},
    task::{Context, Poll},
};
use log::{debug, info};
use novum_common::{ExitStatus, SyscallFrame, Trap};
use spin::Mutex;

use crate::state::KernelState;
use crate::syscall::SyscallFuture;

/// A process identifier. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pid(u64);

impl Pid {
    fn next() -> Self {
        static NEXT_PID: AtomicU64 = AtomicU64::new(1);
        Pid(NEXT_PID.fetch_add(1, Ordering::Relaxed))
    }

}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling state of a live process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Runnable, or running.
    Ready,
    /// Parked in `getchar` until a key arrives.
    Blocked,
    /// Exit captured; the process is torn down on its next poll.
    Exited(ExitStatus),
}

/// The kernel's table of live processes.
pub struct ProcessTable {
    processes: Mutex<BTreeMap<Pid, ProcessState>>,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable {
    /// Create an empty table.
    pub fn new() -> Self {
        ProcessTable {
            processes: Mutex::new(BTreeMap::new()),
        }
    }

    fn register(&self) -> Pid {
        let pid = Pid::next();
        self.processes.lock().insert(pid, ProcessState::Ready);
        pid
    }

    /// State of `pid`, or `None` once it has been torn down.
    pub fn state(&self, pid: Pid) -> Option<ProcessState> {
        self.processes.lock().get(&pid).copied()
    }

    /// Number of processes not yet torn down.
    pub fn len(&self) -> usize {
        self.processes.lock().len()
    }

    /// Returns `true` if no process is alive.
    pub fn is_empty(&self) -> bool {
        self.processes.lock().is_empty()
    }

    /// Marks a live process ready or blocked. Exited processes stay exited.
    pub(crate) fn set_state(&self, pid: Pid, state: ProcessState) {
        if let Some(current) = self.processes.lock().get_mut(&pid) {
            if !matches!(current, ProcessState::Exited(_)) {
                *current = state;
            }
        }
    }

    /// Captures the exit status. The first capture wins.
    pub(crate) fn exit(&self, pid: Pid, status: ExitStatus) {
        if let Some(current) = self.processes.lock().get_mut(&pid) {
            if !matches!(current, ProcessState::Exited(_)) {
                *current = ProcessState::Exited(status);
            }
        }
    }

    /// Returns `true` once `pid` has exited or been torn down.
    pub(crate) fn has_exited(&self, pid: Pid) -> bool {
        !matches!(
            self.state(pid),
            Some(ProcessState::Ready | ProcessState::Blocked)
        )
    }

    fn exit_status(&self, pid: Pid) -> Option<ExitStatus> {
        match self.state(pid)? {
            ProcessState::Exited(status) => Some(status),
            _ => None,
        }
    }

    fn remove(&self, pid: Pid) {
        self.processes.lock().remove(&pid);
    }
}

/// A process's handle on the kernel, passed to its entry point.
#[derive(Clone, Copy)]
pub struct UserGate {
    pid: Pid,
    kernel: &'static KernelState,
}

impl UserGate {
    /// The process this gate belongs to.
    pub fn pid(&self) -> Pid {
        self.pid
    }
}

impl Trap for UserGate {
    fn trap(&self, frame: SyscallFrame) -> impl Future<Output = usize> {
        SyscallFuture::new(self.kernel, self.pid, frame)
    }
}

/// A running process. Resolves to its exit status once torn down.
pub struct Process {
    pid: Pid,
    kernel: &'static KernelState,
    program: Option<Pin<Box<dyn Future<Output = i32>>>>,
}

impl Process {
    /// Registers a new process running `program`.
    ///
    /// The program starts executing when the returned future is first polled.
    /// Its entry point returning `code` is the same as calling `exit(code)`.
    pub fn new<F, Fut>(kernel: &'static KernelState, program: F) -> Self
    where
        F: FnOnce(UserGate) -> Fut,
        Fut: Future<Output = i32> + 'static,
    {
        let pid = kernel.processes.register();
        let gate = UserGate { pid, kernel };
        debug!("process {}: created", pid);
        Process {
            pid,
            kernel,
            program: Some(Box::pin(program(gate))),
        }
    }

    /// The process identifier.
    pub fn pid(&self) -> Pid {
        self.pid
    }

    fn tear_down(&mut self, status: ExitStatus) -> ExitStatus {
        // Dropping the program withdraws any pending getchar.
        self.program = None;
        self.kernel.processes.remove(self.pid);
        info!("process {}: {}", self.pid, status);
        status
    }
}

impl Future for Process {
    type Output = ExitStatus;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<ExitStatus> {
        let this = self.get_mut();
        let program = match this.program.as_mut() {
            Some(program) => program,
            None => panic!("process {} polled after exit", this.pid),
        };

        let result = program.as_mut().poll(cx);
        if let Some(status) = this.kernel.processes.exit_status(this.pid) {
            return Poll::Ready(this.tear_down(status));
        }
        match result {
            Poll::Ready(code) => Poll::Ready(this.tear_down(ExitStatus::Exited(code))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        if self.program.is_some() {
            self.program = None;
            self.kernel.processes.remove(self.pid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Executor, Task};
    use crate::testutil::{self, RecordingDisplay};
    use alloc::rc::Rc;
    use core::cell::Cell;
    use novum_common::{Syscall, SyscallError};

    fn reap_into(
        executor: &mut Executor,
        process: Process,
    ) -> Rc<Cell<Option<ExitStatus>>> {
        let status = Rc::new(Cell::new(None));
        let slot = status.clone();
        executor.spawn(Task::new(async move { slot.set(Some(process.await)) }));
        status
    }

    #[test]
    fn test_returning_from_entry_is_exit() {
        let kernel = testutil::boot(RecordingDisplay::new());
        let mut executor = Executor::new();
        let process = Process::new(kernel, |_gate| async { 7 });
        let pid = process.pid();
        assert_eq!(kernel.processes.state(pid), Some(ProcessState::Ready));

        let status = reap_into(&mut executor, process);
        executor.run_until_idle();

        assert_eq!(status.get(), Some(ExitStatus::Exited(7)));
        assert_eq!(kernel.processes.state(pid), None);
    }

    #[test]
    fn test_exit_stops_the_program() {
        let kernel = testutil::boot(RecordingDisplay::new());
        let mut executor = Executor::new();
        let after_exit = Rc::new(Cell::new(false));
        let flag = after_exit.clone();
        let process = Process::new(kernel, move |gate| async move {
            gate.trap(SyscallFrame::with_args(Syscall::Exit, [-1i32 as usize, 0, 0]))
                .await;
            flag.set(true);
            0
        });

        let status = reap_into(&mut executor, process);
        executor.run_until_idle();

        assert_eq!(status.get(), Some(ExitStatus::Exited(-1)));
        assert!(!after_exit.get());
    }

    #[test]
    fn test_invalid_syscall_is_fatal() {
        let kernel = testutil::boot(RecordingDisplay::new());
        let mut executor = Executor::new();
        let process = Process::new(kernel, |gate| async move {
            gate.trap(SyscallFrame::raw(42, [0; 3])).await;
            0
        });

        let status = reap_into(&mut executor, process);
        executor.run_until_idle();

        assert_eq!(
            status.get(),
            Some(ExitStatus::Faulted(SyscallError::InvalidSyscall(42)))
        );
    }

    #[test]
    fn test_getchar_blocks_then_resumes() {
        let kernel = testutil::boot(RecordingDisplay::new());
        let mut executor = Executor::new();
        let process = Process::new(kernel, |gate| async move {
            let key = gate.trap(SyscallFrame::new(Syscall::GetChar)).await;
            key as i32
        });
        let pid = process.pid();
        let status = reap_into(&mut executor, process);

        executor.run_until_idle();
        assert_eq!(kernel.processes.state(pid), Some(ProcessState::Blocked));
        assert_eq!(kernel.keyboard.waiting(), 1);

        kernel.keyboard.push_key(b'A');
        executor.run_until_idle();
        assert_eq!(status.get(), Some(ExitStatus::Exited(b'A' as i32)));
    }

    #[test]
    fn test_dropping_blocked_process_withdraws_reader() {
        let kernel = testutil::boot(RecordingDisplay::new());
        let mut process = Process::new(kernel, |gate| async move {
            gate.trap(SyscallFrame::new(Syscall::GetChar)).await as i32
        });
        let pid = process.pid();

        let waker = futures_util::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut process).poll(&mut cx).is_pending());
        assert_eq!(kernel.keyboard.waiting(), 1);

        drop(process);
        assert_eq!(kernel.keyboard.waiting(), 0);
        assert_eq!(kernel.processes.state(pid), None);

        kernel.keyboard.push_key(b'z');
        assert_eq!(kernel.keyboard.try_pop(), Some(b'z'));
    }
}
