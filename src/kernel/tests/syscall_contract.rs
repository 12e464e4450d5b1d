//! User programs written against the SDK, checked from the outside.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use futures_util::future::join;
use novum_common::{CursorPosition, SyscallError};
use novum_kernel::process::UserGate;
use novum_kernel::task::{Executor, Task};
use novum_kernel::testutil::{self, RecordingDisplay};
use novum_kernel::{KernelConfig, KernelState};
use novum_sdk::{self as nv, ExitStatus, SyscallFrame, Trap};

type Slot = Rc<Cell<Option<ExitStatus>>>;
type Program = Pin<Box<dyn Future<Output = i32>>>;

fn watch(
    executor: &mut Executor,
    kernel: &'static KernelState,
    program: impl FnOnce(UserGate) -> Program,
) -> Slot {
    let slot: Slot = Rc::new(Cell::new(None));
    let process = kernel.launch(program);
    let out = slot.clone();
    executor.spawn(Task::new(async move { out.set(Some(process.await)) }));
    slot
}

#[test]
fn cursor_calls_clamp_and_report() {
    let kernel = testutil::boot(RecordingDisplay::new());
    let mut executor = Executor::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let log = seen.clone();
    let status = watch(&mut executor, kernel, move |sys| {
        Box::pin(async move {
            nv::set_cursor(&sys, 200, 200).await;
            log.borrow_mut().push(nv::get_cursor(&sys).await);
            nv::set_cursor(&sys, 3, 0).await;
            // exactly one full row
            nv::print(
                &sys,
                c"1234567890123456789012345678901234567890\
                  1234567890123456789012345678901234567890",
            )
            .await;
            log.borrow_mut().push(nv::get_cursor(&sys).await);
            nv::clear_screen(&sys).await;
            log.borrow_mut().push(nv::get_cursor(&sys).await);
            0
        })
    });
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(0)));
    assert_eq!(*seen.borrow(), vec![(24, 79), (4, 0), (0, 0)]);
}

#[test]
fn bottom_line_overflow_scrolls() {
    let display = RecordingDisplay::new();
    let kernel = testutil::boot(display.clone());
    let mut executor = Executor::new();

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            nv::print(&sys, c"top").await;
            nv::set_cursor(&sys, 24, 0).await;
            nv::print(&sys, c"last\nnew").await;
            0
        })
    });
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(0)));
    assert!(!display.shows(0, 0, b"top"));
    assert!(display.shows(23, 0, b"last"));
    assert!(display.shows(24, 0, b"new"));
    assert_eq!(display.cursor(), (24, 3));
}

#[test]
fn keys_arrive_in_typing_order() {
    let display = RecordingDisplay::new();
    let kernel = testutil::boot(display.clone());
    let mut executor = Executor::new();
    let keys = Rc::new(RefCell::new(Vec::new()));

    let got = keys.clone();
    let status = watch(&mut executor, kernel, move |sys| {
        Box::pin(async move {
            for _ in 0..3 {
                got.borrow_mut().push(nv::getchar(&sys).await);
            }
            0
        })
    });

    kernel.keyboard.push_key(b'a');
    executor.run_until_idle();
    kernel.keyboard.push_key(b'b');
    kernel.keyboard.push_key(b'c');
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(0)));
    assert_eq!(*keys.borrow(), b"abc".to_vec());
}

#[test]
fn full_queue_keeps_newest_keys() {
    let config = KernelConfig::default().with_keyboard_capacity(2);
    let kernel = testutil::boot_with(RecordingDisplay::new(), &config);
    let mut executor = Executor::new();
    for key in *b"xyz" {
        kernel.keyboard.push_key(key);
    }
    assert_eq!(kernel.keyboard.dropped(), 1);

    let keys = Rc::new(RefCell::new(Vec::new()));
    let got = keys.clone();
    watch(&mut executor, kernel, move |sys| {
        Box::pin(async move {
            got.borrow_mut().push(nv::getchar(&sys).await);
            got.borrow_mut().push(nv::getchar(&sys).await);
            0
        })
    });
    executor.run_until_idle();

    assert_eq!(*keys.borrow(), b"yz".to_vec());
}

#[test]
fn one_key_wakes_one_reader() {
    let kernel = testutil::boot(RecordingDisplay::new());
    let mut executor = Executor::new();

    let first = watch(&mut executor, kernel, |sys| {
        Box::pin(async move { i32::from(nv::getchar(&sys).await) })
    });
    let second = watch(&mut executor, kernel, |sys| {
        Box::pin(async move { i32::from(nv::getchar(&sys).await) })
    });
    executor.run_until_idle();
    assert_eq!(kernel.keyboard.waiting(), 2);

    kernel.keyboard.push_key(b'1');
    executor.run_until_idle();
    assert_eq!(first.get(), Some(ExitStatus::Exited(i32::from(b'1'))));
    assert_eq!(second.get(), None);

    kernel.keyboard.push_key(b'2');
    executor.run_until_idle();
    assert_eq!(second.get(), Some(ExitStatus::Exited(i32::from(b'2'))));
}

#[test]
fn exit_does_not_come_back() {
    let display = RecordingDisplay::new();
    let kernel = testutil::boot(display.clone());
    let mut executor = Executor::new();

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            nv::getchar(&sys).await;
            let _ = nv::exit(&sys, 7).await;
            nv::print(&sys, c"unreachable").await;
            0
        })
    });
    kernel.keyboard.push_key(b' ');
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(7)));
    assert!(!display.shows(0, 0, b"unreachable"));
    assert!(kernel.processes.is_empty());
}

#[test]
fn exit_stops_sibling_calls_in_the_same_poll() {
    let display = RecordingDisplay::new();
    let kernel = testutil::boot(display.clone());
    let mut executor = Executor::new();

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            join(
                async {
                    let _ = nv::exit(&sys, 3).await;
                },
                async {
                    nv::print(&sys, c"after exit").await;
                    nv::set_cursor(&sys, 20, 20).await;
                },
            )
            .await;
            0
        })
    });
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(3)));
    assert!(!display.shows(0, 0, b"after exit"));
    assert_eq!(kernel.console.lock().cursor(), CursorPosition::origin());
}

#[test]
fn exited_process_leaves_queued_key_alone() {
    let kernel = testutil::boot(RecordingDisplay::new());
    let mut executor = Executor::new();
    kernel.keyboard.push_key(b'k');

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            let (_, key) = join(
                async {
                    let _ = nv::exit(&sys, 1).await;
                },
                nv::getchar(&sys),
            )
            .await;
            i32::from(key)
        })
    });
    executor.run_until_idle();

    assert_eq!(status.get(), Some(ExitStatus::Exited(1)));
    assert_eq!(kernel.keyboard.try_pop(), Some(b'k'));
    assert_eq!(kernel.keyboard.waiting(), 0);
}

#[test]
fn parked_reader_is_withdrawn_when_sibling_exits() {
    let kernel = testutil::boot(RecordingDisplay::new());
    let mut executor = Executor::new();

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            let (_, key) = join(
                async {
                    nv::getchar(&sys).await;
                    let _ = nv::exit(&sys, 2).await;
                },
                nv::getchar(&sys),
            )
            .await;
            i32::from(key)
        })
    });
    executor.run_until_idle();
    assert_eq!(kernel.keyboard.waiting(), 2);

    kernel.keyboard.push_key(b'a');
    executor.run_until_idle();
    assert_eq!(status.get(), Some(ExitStatus::Exited(2)));
    assert_eq!(kernel.keyboard.waiting(), 0);

    kernel.keyboard.push_key(b'b');
    assert_eq!(kernel.keyboard.try_pop(), Some(b'b'));
}

#[test]
fn unknown_syscall_ends_the_caller() {
    let display = RecordingDisplay::new();
    let kernel = testutil::boot(display.clone());
    let mut executor = Executor::new();

    let status = watch(&mut executor, kernel, |sys| {
        Box::pin(async move {
            sys.trap(SyscallFrame::raw(6, [0; 3])).await;
            nv::print(&sys, c"after").await;
            0
        })
    });
    executor.run_until_idle();

    assert_eq!(
        status.get(),
        Some(ExitStatus::Faulted(SyscallError::InvalidSyscall(6)))
    );
    assert!(!display.shows(0, 0, b"after"));
    assert_eq!(kernel.console.lock().cursor().row, 0);
}
