//! Codec-decoding message queue with waker notification.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use farcall_core::MessageCodec;
use serde::de::DeserializeOwned;

/// Waker-notified FIFO that decodes inbound payloads into `T`.
///
/// Producers feed raw bytes through [`receive`](Self::receive); consumers
/// take decoded messages with [`try_recv`](Self::try_recv) or await them
/// with [`recv`](Self::recv). Payloads that fail to decode are logged and
/// dropped; the counters keep the drops observable. Closing the queue
/// releases every waiting consumer.
///
/// Uses `RefCell` for single-threaded runtimes; not thread-safe.
pub struct MessageQueue<T, C: MessageCodec> {
    inner: RefCell<QueueInner<T>>,
    codec: C,
}

struct QueueInner<T> {
    queue: VecDeque<T>,
    wakers: Vec<Waker>,
    closed: bool,
    received: u64,
    dropped: u64,
}

impl<T> Default for QueueInner<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            wakers: Vec::new(),
            closed: false,
            received: 0,
            dropped: 0,
        }
    }
}

impl<T, C: MessageCodec> MessageQueue<T, C> {
    /// Create an empty queue decoding through `codec`.
    pub fn new(codec: C) -> Self {
        Self {
            inner: RefCell::new(QueueInner::default()),
            codec,
        }
    }

    /// Take the next message without waiting.
    pub fn try_recv(&self) -> Option<T> {
        self.inner.borrow_mut().queue.pop_front()
    }

    /// Whether the queue currently holds no messages.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }

    /// Number of messages currently queued.
    pub fn len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Total messages decoded successfully.
    pub fn received(&self) -> u64 {
        self.inner.borrow().received
    }

    /// Total payloads dropped because they failed to decode.
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }

    /// Mark the queue as closed and release all waiting consumers.
    ///
    /// After closing, [`recv`](Self::recv) drains the remaining messages and
    /// then yields `None`.
    pub fn close(&self) {
        let wakers = {
            let mut inner = self.inner.borrow_mut();
            inner.closed = true;
            std::mem::take(&mut inner.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// Whether the queue has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    fn push(&self, message: T) {
        let wakers = {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(message);
            inner.received += 1;
            std::mem::take(&mut inner.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }
}

impl<T: DeserializeOwned + 'static, C: MessageCodec> MessageQueue<T, C> {
    /// Decode one payload and enqueue it, waking waiting consumers.
    ///
    /// Undecodable payloads are dropped with a warning.
    pub fn receive(&self, payload: &[u8]) {
        match self.codec.decode::<T>(payload) {
            Ok(message) => self.push(message),
            Err(error) => {
                tracing::warn!(error = %error, "failed to decode inbound payload");
                self.inner.borrow_mut().dropped += 1;
            }
        }
    }

    /// Await the next message; `None` once the queue is closed and drained.
    pub fn recv(&self) -> RecvFuture<'_, T, C> {
        RecvFuture { queue: self }
    }
}

/// Future returned by [`MessageQueue::recv`].
pub struct RecvFuture<'a, T, C: MessageCodec> {
    queue: &'a MessageQueue<T, C>,
}

impl<T, C: MessageCodec> Future for RecvFuture<'_, T, C> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.queue.inner.borrow_mut();
        if let Some(message) = inner.queue.pop_front() {
            return Poll::Ready(Some(message));
        }
        if inner.closed {
            return Poll::Ready(None);
        }
        inner.wakers.push(cx.waker().clone());
        Poll::Pending
    }
}
