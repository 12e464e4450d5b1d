//! Keyboard input queue.
//!
//! The IRQ1 handler is the only producer. `getchar` callers are the only
//! consumers: a caller that finds the queue empty is parked on an explicit
//! wait queue and the next key is handed directly to the longest-waiting
//! caller. When the queue is full the oldest unread key is dropped.

use alloc::{collections::VecDeque, sync::Arc};
use core::{
    future::Future,
    pin::Pin,
    sync::atomic::{AtomicUsize, Ordering},
    task::{Context, Poll},
};
use crossbeam_queue::ArrayQueue;
use futures_util::task::AtomicWaker;
use spin::Mutex;

use crate::arch::without_interrupts;

/// A parked `getchar` caller.
struct Handoff {
    key: Mutex<Option<u8>>,
    waker: AtomicWaker,
}

impl Handoff {
    fn new() -> Self {
        Handoff {
            key: Mutex::new(None),
            waker: AtomicWaker::new(),
        }
    }

    fn deliver(&self, key: u8) {
        *self.key.lock() = Some(key);
        self.waker.wake();
    }

    fn take(&self) -> Option<u8> {
        self.key.lock().take()
    }
}

/// Bounded FIFO of ASCII key events with a wait queue of blocked readers.
///
/// While any reader is parked the event queue is empty: readers only park
/// after finding it empty, and the producer serves parked readers first.
pub struct KeyboardQueue {
    events: ArrayQueue<u8>,
    waiters: Mutex<VecDeque<Arc<Handoff>>>,
    dropped: AtomicUsize,
}

impl KeyboardQueue {
    /// Creates a queue holding at most `capacity` unread keys.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        KeyboardQueue {
            events: ArrayQueue::new(capacity),
            waiters: Mutex::new(VecDeque::new()),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Delivers a key from the interrupt handler.
    ///
    /// Wakes exactly one parked reader if there is one; otherwise queues the
    /// key, evicting the oldest unread key when full. Never blocks and never
    /// logs, so it is safe to call from interrupt context.
    pub fn push_key(&self, key: u8) {
        without_interrupts(|| {
            let mut waiters = self.waiters.lock();
            let waiter = waiters.pop_front();
            if let Some(waiter) = waiter {
                drop(waiters);
                waiter.deliver(key);
            } else if self.events.force_push(key).is_some() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    /// Takes the oldest unread key without waiting.
    pub fn try_pop(&self) -> Option<u8> {
        self.events.pop()
    }

    /// Returns a future resolving to the next key in arrival order.
    pub fn next_key(&self) -> NextKey<'_> {
        NextKey {
            queue: self,
            slot: None,
        }
    }

    /// Number of unread keys.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if no key is waiting to be read.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of unread keys.
    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }

    /// Number of readers parked on the queue.
    pub fn waiting(&self) -> usize {
        without_interrupts(|| self.waiters.lock().len())
    }

    /// Number of keys evicted by overflow since boot.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Future returned by [`KeyboardQueue::next_key`].
///
/// Dropping it while parked withdraws the reader from the wait queue. A key
/// already handed to it but never observed is discarded with it.
pub struct NextKey<'a> {
    queue: &'a KeyboardQueue,
    slot: Option<Arc<Handoff>>,
}

impl Future for NextKey<'_> {
    type Output = u8;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<u8> {
        let this = self.get_mut();

        if let Some(slot) = &this.slot {
            slot.waker.register(cx.waker());
            // Still parked, so IRQ1 may be delivering to this very slot.
            return match without_interrupts(|| slot.take()) {
                Some(key) => {
                    this.slot = None;
                    Poll::Ready(key)
                }
                None => Poll::Pending,
            };
        }

        // Check and park under one lock so a key arriving in between is not lost.
        let queue = this.queue;
        without_interrupts(|| {
            let mut waiters = queue.waiters.lock();
            if let Some(key) = queue.events.pop() {
                return Poll::Ready(key);
            }
            let slot = Arc::new(Handoff::new());
            slot.waker.register(cx.waker());
            waiters.push_back(slot.clone());
            this.slot = Some(slot);
            Poll::Pending
        })
    }
}

impl Drop for NextKey<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            let queue = self.queue;
            without_interrupts(|| {
                queue
                    .waiters
                    .lock()
                    .retain(|waiter| !Arc::ptr_eq(waiter, &slot));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{task::noop_waker, FutureExt};

    fn poll_once(future: &mut NextKey<'_>) -> Poll<u8> {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        Pin::new(future).poll(&mut cx)
    }

    #[test]
    fn test_keys_come_out_in_arrival_order() {
        let queue = KeyboardQueue::new(8);
        for key in b"hello" {
            queue.push_key(*key);
        }
        let read: Vec<u8> = (0..5)
            .map(|_| queue.next_key().now_or_never().expect("key queued"))
            .collect();
        assert_eq!(read, b"hello");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let queue = KeyboardQueue::new(3);
        for key in b"abcde" {
            queue.push_key(*key);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 2);
        assert_eq!(queue.try_pop(), Some(b'c'));
        assert_eq!(queue.try_pop(), Some(b'd'));
        assert_eq!(queue.try_pop(), Some(b'e'));
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_empty_queue_parks_reader() {
        let queue = KeyboardQueue::new(4);
        let mut reader = queue.next_key();
        assert_eq!(poll_once(&mut reader), Poll::Pending);
        assert_eq!(queue.waiting(), 1);

        queue.push_key(b'k');
        // Handed off, not queued.
        assert!(queue.is_empty());
        assert_eq!(queue.waiting(), 0);
        assert_eq!(poll_once(&mut reader), Poll::Ready(b'k'));
    }

    #[test]
    fn test_wake_one_serves_readers_in_order() {
        let queue = KeyboardQueue::new(4);
        let mut first = queue.next_key();
        let mut second = queue.next_key();
        assert_eq!(poll_once(&mut first), Poll::Pending);
        assert_eq!(poll_once(&mut second), Poll::Pending);

        queue.push_key(b'1');
        assert_eq!(poll_once(&mut second), Poll::Pending);
        assert_eq!(poll_once(&mut first), Poll::Ready(b'1'));

        queue.push_key(b'2');
        assert_eq!(poll_once(&mut second), Poll::Ready(b'2'));
    }

    #[test]
    fn test_repolled_reader_stays_parked_until_handoff() {
        let queue = KeyboardQueue::new(4);
        let mut reader = queue.next_key();
        assert_eq!(poll_once(&mut reader), Poll::Pending);
        assert_eq!(poll_once(&mut reader), Poll::Pending);
        assert_eq!(poll_once(&mut reader), Poll::Pending);
        assert_eq!(queue.waiting(), 1);

        queue.push_key(b'r');
        assert_eq!(poll_once(&mut reader), Poll::Ready(b'r'));
        assert_eq!(queue.waiting(), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dropped_reader_leaves_wait_queue() {
        let queue = KeyboardQueue::new(4);
        {
            let mut reader = queue.next_key();
            assert_eq!(poll_once(&mut reader), Poll::Pending);
            assert_eq!(queue.waiting(), 1);
        }
        assert_eq!(queue.waiting(), 0);

        queue.push_key(b'x');
        assert_eq!(queue.try_pop(), Some(b'x'));
    }

    #[test]
    fn test_handoff_wakes_registered_waker() {
        use alloc::sync::Arc;
        use core::sync::atomic::AtomicBool;
        use futures_util::task::{waker, ArcWake};

        struct Flag(AtomicBool);
        impl ArcWake for Flag {
            fn wake_by_ref(arc_self: &Arc<Self>) {
                arc_self.0.store(true, Ordering::SeqCst);
            }
        }

        let queue = KeyboardQueue::new(4);
        let flag = Arc::new(Flag(AtomicBool::new(false)));
        let waker = waker(flag.clone());
        let mut cx = Context::from_waker(&waker);
        let mut reader = queue.next_key();
        assert_eq!(Pin::new(&mut reader).poll(&mut cx), Poll::Pending);
        assert!(!flag.0.load(Ordering::SeqCst));

        queue.push_key(b'w');
        assert!(flag.0.load(Ordering::SeqCst));
    }
}
