//! Join coordinator: suspend until the communicator is torn down.
//!
//! A condition-variable analogue with a single, one-way notification: the
//! destructor calls `notify_all` exactly once, releasing every waiter past
//! and future. Timed waits are built on a [`TimeProvider`] timeout around
//! the plain wait.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use farcall_core::TimeProvider;

/// Condition released once, by the destructor.
#[derive(Default)]
pub(crate) struct JoinCondition {
    inner: RefCell<JoinInner>,
}

#[derive(Default)]
struct JoinInner {
    notified: bool,
    wakers: Vec<Waker>,
}

impl JoinCondition {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Release every waiter, current and future. Idempotent.
    pub(crate) fn notify_all(&self) {
        let wakers = {
            let mut inner = self.inner.borrow_mut();
            inner.notified = true;
            std::mem::take(&mut inner.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
    }

    /// Suspend until [`notify_all`](Self::notify_all) runs. Resolves
    /// immediately if it already has. Release order of concurrent waiters is
    /// unspecified.
    pub(crate) fn wait(&self) -> WaitFuture<'_> {
        WaitFuture { condition: self }
    }

    /// Suspend up to `timeout`; `true` if awoken, `false` if the timeout
    /// expired first.
    pub(crate) async fn wait_for<T: TimeProvider>(&self, timeout: Duration, time: &T) -> bool {
        time.timeout(timeout, self.wait()).await.is_ok()
    }

    /// Like [`wait_for`](Self::wait_for), with an absolute deadline on the
    /// provider's clock.
    pub(crate) async fn wait_until<T: TimeProvider>(&self, deadline: Duration, time: &T) -> bool {
        let remaining = deadline.saturating_sub(time.now());
        self.wait_for(remaining, time).await
    }
}

/// Future returned by [`JoinCondition::wait`].
pub(crate) struct WaitFuture<'a> {
    condition: &'a JoinCondition,
}

impl Future for WaitFuture<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.condition.inner.borrow_mut();
        if inner.notified {
            return Poll::Ready(());
        }
        inner.wakers.push(cx.waker().clone());
        Poll::Pending
    }
}
