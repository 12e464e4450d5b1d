//! System Call Interface
//!
//! Entry point for traps from user programs.
//!
//! # Syscalls
//! - 0: exit(code) - terminate the calling process, never returns
//! - 1: print(str) - write a NUL-terminated string at the cursor
//! - 2: getchar() - block until a key is available
//! - 3: set_cursor(row, col) - move the cursor, clamped onto the screen
//! - 4: get_cursor(&row, &col) - read the cursor
//! - 5: clear_screen() - blank the screen, cursor to (0, 0)
//!
//! Every call except getchar completes within the poll that issued it.

mod handler;
mod validate;

pub use handler::{dispatch, Outcome};

use core::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use novum_common::{ExitStatus, SyscallFrame};

use crate::process::{Pid, ProcessState};
use crate::state::KernelState;
use crate::task::keyboard::NextKey;

enum CallState {
    Trapped(SyscallFrame),
    WaitingForKey(NextKey<'static>),
    Exited,
    Done,
}

/// One trap in flight.
///
/// Resolves with the return register. For `exit` and for rejected calls it
/// never resolves; the process wrapper tears the caller down instead. The
/// same holds for any call made after its process has exited.
pub struct SyscallFuture {
    kernel: &'static KernelState,
    pid: Pid,
    state: CallState,
}

impl SyscallFuture {
    /// Prepares a trap of `pid` into `kernel`. Nothing runs until polled.
    pub fn new(kernel: &'static KernelState, pid: Pid, frame: SyscallFrame) -> Self {
        SyscallFuture {
            kernel,
            pid,
            state: CallState::Trapped(frame),
        }
    }
}

impl Future for SyscallFuture {
    type Output = usize;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<usize> {
        let this = self.get_mut();
        let kernel = this.kernel;

        // A sibling future of the same process may already have exited it.
        // Nothing more is dispatched, and a parked getchar is withdrawn.
        if matches!(this.state, CallState::Trapped(_) | CallState::WaitingForKey(_))
            && kernel.processes.has_exited(this.pid)
        {
            this.state = CallState::Exited;
            return Poll::Pending;
        }

        loop {
            match &mut this.state {
                CallState::Trapped(frame) => match dispatch(kernel, this.pid, *frame) {
                    Ok(Outcome::Return(value)) => {
                        this.state = CallState::Done;
                        return Poll::Ready(value);
                    }
                    Ok(Outcome::WaitForKey) => {
                        this.state = CallState::WaitingForKey(kernel.keyboard.next_key());
                    }
                    Ok(Outcome::Exit(code)) => {
                        kernel.processes.exit(this.pid, ExitStatus::Exited(code));
                        this.state = CallState::Exited;
                    }
                    Err(err) => {
                        kernel.processes.exit(this.pid, ExitStatus::Faulted(err));
                        this.state = CallState::Exited;
                    }
                },
                CallState::WaitingForKey(next_key) => {
                    return match Pin::new(next_key).poll(cx) {
                        Poll::Ready(key) => {
                            kernel.processes.set_state(this.pid, ProcessState::Ready);
                            this.state = CallState::Done;
                            Poll::Ready(usize::from(key))
                        }
                        Poll::Pending => {
                            kernel.processes.set_state(this.pid, ProcessState::Blocked);
                            Poll::Pending
                        }
                    };
                }
                CallState::Exited => return Poll::Pending,
                CallState::Done => panic!("syscall polled after completion"),
            }
        }
    }
}
