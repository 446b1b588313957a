//! Communicator: the symmetric RFC peer.
//!
//! One communicator sits on each end of a bidirectional message channel.
//! Outbound calls from the [`Driver`] are assigned a fresh uid, parked in
//! the pending-call table, and transmitted through the [`Transmit`] hook;
//! inbound frames arrive through [`Communicator::reply_data`], where call
//! frames are dispatched against the local provider and return frames
//! settle the matching pending call. Teardown ([`Communicator::close`])
//! rejects everything outstanding and wakes all joiners.
//!
//! # Consumer Contract
//!
//! A transport must:
//! 1. implement [`Transmit`] to deliver frames to the remote peer,
//! 2. call [`Communicator::reply_data`] once per received frame,
//! 3. supply a [`ReadyGate`] (directly, or via [`Connector`]) if calls must
//!    be gated by connection state,
//! 4. call [`Communicator::close`] when the channel terminates, passing the
//!    reason if known.
//!
//! [`Connector`]: crate::Connector
//!
//! # Single-Threaded
//!
//! All state lives behind `Cell`/`RefCell` on one task executor; the only
//! process-wide piece is the atomic uid counter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use farcall_core::{ErrorRecord, Invoke, InvokeFunction, InvokeParameter, InvokeReturn, TimeProvider};
use serde_json::Value;

use super::dispatch::{ProviderSlot, dispatch};
use super::driver::Driver;
use super::join::JoinCondition;
use super::pending::PendingCalls;
use super::provider::ProviderObject;
use super::sequence::next_uid;
use crate::error::{CallError, NotReadyError, TransmitError};

/// Default teardown diagnostic when no reason is supplied.
const CLOSED_MESSAGE: &str = "Connection has been closed.";

/// Outbound transport hook: delivers one wire frame to the remote peer.
///
/// Implementations serialize the frame however they like and await
/// transport-level completion. Preserving delivery order is not required by
/// the core - correlation is by uid - but it helps debuggability.
#[async_trait(?Send)]
pub trait Transmit {
    /// Deliver `invoke` to the remote peer.
    async fn send(&self, invoke: Invoke) -> Result<(), TransmitError>;
}

/// Readiness hook consulted before issuing a call or joining.
pub trait ReadyGate {
    /// Return the diagnostic error if the communicator cannot issue calls
    /// right now, `Ok(())` if it can. `method` names the operation being
    /// attempted and ends up in the diagnostic.
    fn inspect_ready(&self, method: &str) -> Result<(), NotReadyError>;
}

/// Gate that is always ready; the default for raw communicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadyGate for AlwaysReady {
    fn inspect_ready(&self, _method: &str) -> Result<(), NotReadyError> {
        Ok(())
    }
}

/// The symmetric peer multiplexing concurrent calls over one channel.
pub struct Communicator {
    transmit: Box<dyn Transmit>,
    gate: Box<dyn ReadyGate>,
    provider: RefCell<ProviderSlot>,
    pending: PendingCalls,
    join: JoinCondition,
    closed: Cell<bool>,
}

impl Communicator {
    /// Create a communicator with the default always-ready gate.
    pub fn new(transmit: impl Transmit + 'static) -> Rc<Self> {
        Self::with_gate(transmit, AlwaysReady)
    }

    /// Create a communicator with an explicit readiness gate.
    pub fn with_gate(transmit: impl Transmit + 'static, gate: impl ReadyGate + 'static) -> Rc<Self> {
        Rc::new(Self {
            transmit: Box::new(transmit),
            gate: Box::new(gate),
            provider: RefCell::new(ProviderSlot::Unset),
            pending: PendingCalls::new(),
            join: JoinCondition::new(),
            closed: Cell::new(false),
        })
    }

    /// Install (or reinstall) the provider.
    ///
    /// `None` means the peer explicitly offers nothing, which is a distinct
    /// condition from never having installed one: inbound calls are answered
    /// with different diagnostics. Reinstallation is allowed at any time;
    /// a dispatch uses the provider current when it begins.
    pub fn set_provider(&self, provider: Option<ProviderObject>) {
        *self.provider.borrow_mut() = match provider {
            Some(object) => ProviderSlot::Object(Rc::new(object)),
            None => ProviderSlot::Null,
        };
    }

    /// The currently installed provider, if any.
    pub fn provider(&self) -> Option<Rc<ProviderObject>> {
        match &*self.provider.borrow() {
            ProviderSlot::Object(object) => Some(Rc::clone(object)),
            _ => None,
        }
    }

    /// Obtain the driver for outbound calls.
    ///
    /// Safe to call before the connection is ready; transmission is gated
    /// per call.
    pub fn driver(self: &Rc<Self>) -> Driver {
        Driver::new(Rc::clone(self))
    }

    /// Suspend until the communicator is torn down.
    ///
    /// Fails immediately with the gate's diagnostic if the communicator is
    /// not ready.
    pub async fn join(&self) -> Result<(), NotReadyError> {
        self.gate.inspect_ready("join")?;
        self.join.wait().await;
        Ok(())
    }

    /// Timed join: `true` if torn down within `timeout`, `false` otherwise.
    pub async fn join_for<T: TimeProvider>(
        &self,
        timeout: Duration,
        time: &T,
    ) -> Result<bool, NotReadyError> {
        self.gate.inspect_ready("join_for")?;
        Ok(self.join.wait_for(timeout, time).await)
    }

    /// Timed join with an absolute deadline on `time`'s clock.
    pub async fn join_until<T: TimeProvider>(
        &self,
        deadline: Duration,
        time: &T,
    ) -> Result<bool, NotReadyError> {
        self.gate.inspect_ready("join_until")?;
        Ok(self.join.wait_until(deadline, time).await)
    }

    /// Number of outbound calls currently awaiting a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Entry point for the transport: process one inbound wire frame.
    ///
    /// Call frames are dispatched against the provider and answered with a
    /// return frame; this suspends across the provider function and the
    /// reply transmission. Return frames settle the matching pending call;
    /// a return with no matching call is dropped. Never fails: dispatch
    /// faults travel back as negative returns, and reply transmission
    /// failures are logged and swallowed.
    pub async fn reply_data(&self, invoke: Invoke) {
        if self.closed.get() {
            tracing::debug!(uid = invoke.uid(), "dropping frame received after close");
            return;
        }
        match invoke {
            Invoke::Function(function) => self.handle_function(function).await,
            Invoke::Return(ret) => self.handle_return(ret),
        }
    }

    async fn handle_function(&self, function: InvokeFunction) {
        let uid = function.uid;
        let listener = function.listener.clone();
        let provider = self.provider.borrow().clone();
        let ret = dispatch(provider, function).await;
        if !ret.success {
            tracing::debug!(uid, listener = %listener, "dispatch produced an error return");
        }
        if let Err(error) = self.transmit.send(Invoke::Return(ret)).await {
            tracing::warn!(uid, listener = %listener, error = %error, "failed to send reply");
        }
    }

    fn handle_return(&self, ret: InvokeReturn) {
        let InvokeReturn {
            uid,
            success,
            value,
        } = ret;
        let outcome = if success {
            Ok(value)
        } else {
            Err(CallError::Remote(value))
        };
        if !self.pending.settle(uid, outcome) {
            tracing::debug!(uid, "dropping reply with no pending call");
        }
    }

    /// Issue one outbound call. Used by [`Driver`] handles.
    pub(crate) async fn call_function(
        &self,
        listener: &str,
        parameters: Vec<InvokeParameter>,
    ) -> Result<Value, CallError> {
        self.gate.inspect_ready("call")?;
        if self.closed.get() {
            return Err(CallError::Disconnected(ErrorRecord::error(CLOSED_MESSAGE)));
        }

        let uid = next_uid();
        let reply = self.pending.insert(uid);
        let invoke = Invoke::Function(InvokeFunction {
            uid,
            listener: listener.to_owned(),
            parameters,
        });
        if let Err(error) = self.transmit.send(invoke).await {
            // A failed send surfaces through the same rejection path as a
            // disconnection. The entry may already be gone if a teardown
            // raced the send; settle is a no-op then.
            self.pending.settle(
                uid,
                Err(CallError::Disconnected(ErrorRecord::error(
                    error.to_string(),
                ))),
            );
        }
        reply.await
    }

    /// Tear the communicator down.
    ///
    /// Rejects every outstanding call with `reason` (or the default closure
    /// error) and wakes all joiners. Transports must call this when the
    /// channel terminates, normally or abnormally; repeated invocations are
    /// ignored. No further calls are issued or accepted afterwards.
    pub fn close(&self, reason: Option<ErrorRecord>) {
        if self.closed.replace(true) {
            return;
        }
        let record = reason.unwrap_or_else(|| ErrorRecord::error(CLOSED_MESSAGE));
        tracing::debug!(pending = self.pending.len(), reason = %record, "communicator closed");
        self.pending.reject_all(&record);
        self.join.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Transmit that records frames for inspection.
    #[derive(Clone, Default)]
    struct Recorder {
        sent: Rc<RefCell<VecDeque<Invoke>>>,
    }

    impl Recorder {
        fn take(&self) -> Option<Invoke> {
            self.sent.borrow_mut().pop_front()
        }

        fn count(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl Transmit for Recorder {
        async fn send(&self, invoke: Invoke) -> Result<(), TransmitError> {
            self.sent.borrow_mut().push_back(invoke);
            Ok(())
        }
    }

    /// Transmit that always fails.
    struct Unplugged;

    #[async_trait(?Send)]
    impl Transmit for Unplugged {
        async fn send(&self, _invoke: Invoke) -> Result<(), TransmitError> {
            Err(TransmitError::Closed)
        }
    }

    /// Gate that always refuses.
    struct Refusing;

    impl ReadyGate for Refusing {
        fn inspect_ready(&self, method: &str) -> Result<(), NotReadyError> {
            Err(NotReadyError {
                connector: "Refusing".to_owned(),
                method: method.to_owned(),
                hint: "nope.".to_owned(),
            })
        }
    }

    fn echo_provider() -> ProviderObject {
        ProviderObject::new().function("echo", |mut args: Vec<Value>| async move {
            Ok(args.pop().unwrap_or(Value::Null))
        })
    }

    #[tokio::test]
    async fn test_call_emits_frame_and_resolves_on_return() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        let driver = comm.driver();

        let echo_call = driver.path("echo");
        let (result, ()) = tokio::join!(echo_call.call(vec![json!(7)]), async {
            let Some(Invoke::Function(sent)) = recorder.take() else {
                panic!("expected a call frame");
            };
            assert_eq!(sent.listener, "echo");
            assert_eq!(sent.parameters[0].value, json!(7));
            comm.reply_data(Invoke::Return(InvokeReturn {
                uid: sent.uid,
                success: true,
                value: json!(7),
            }))
            .await;
        });
        assert_eq!(result, Ok(json!(7)));
        assert_eq!(comm.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_negative_return_rejects_with_remote_error() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        let driver = comm.driver();

        let boom_call = driver.path("boom");
        let (result, ()) = tokio::join!(boom_call.call(vec![]), async {
            let Some(Invoke::Function(sent)) = recorder.take() else {
                panic!("expected a call frame");
            };
            comm.reply_data(Invoke::Return(InvokeReturn {
                uid: sent.uid,
                success: false,
                value: json!({ "name": "Error", "message": "nope" }),
            }))
            .await;
        });
        match result {
            Err(CallError::Remote(value)) => assert_eq!(value["message"], json!("nope")),
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_gate_refusal_is_immediate_and_silent_on_the_wire() {
        let recorder = Recorder::default();
        let comm = Communicator::with_gate(recorder.clone(), Refusing);
        let driver = comm.driver();

        let result = driver.path("echo").call(vec![json!(1)]).await;
        match result {
            Err(CallError::NotReady(error)) => {
                assert_eq!(error.method, "call");
                assert_eq!(error.hint, "nope.");
            }
            other => panic!("expected NotReady, got {other:?}"),
        }
        // No uid allocated, nothing transmitted.
        assert_eq!(recorder.count(), 0);
        assert_eq!(comm.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_rejects_through_disconnect_path() {
        let comm = Communicator::new(Unplugged);
        let driver = comm.driver();

        match driver.path("echo").call(vec![]).await {
            Err(CallError::Disconnected(record)) => {
                assert_eq!(record.message, "channel closed");
            }
            other => panic!("expected Disconnected, got {other:?}"),
        }
        assert_eq!(comm.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_close_rejects_pending_and_wakes_joiners() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        let driver = comm.driver();

        let slow_call = driver.path("slow");
        let (result, join_result, ()) =
            tokio::join!(slow_call.call(vec![]), comm.join(), async {
                tokio::task::yield_now().await;
                comm.close(Some(ErrorRecord::error("bye")));
            });
        match result {
            Err(CallError::Disconnected(record)) => assert_eq!(record.message, "bye"),
            other => panic!("expected Disconnected, got {other:?}"),
        }
        assert_eq!(join_result, Ok(()));
    }

    #[tokio::test]
    async fn test_close_default_reason() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        let driver = comm.driver();

        let slow_call = driver.path("slow");
        let (result, ()) = tokio::join!(slow_call.call(vec![]), async {
            tokio::task::yield_now().await;
            comm.close(None);
        });
        match result {
            Err(CallError::Disconnected(record)) => {
                assert_eq!(record.message, "Connection has been closed.");
            }
            other => panic!("expected Disconnected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let comm = Communicator::new(Recorder::default());
        comm.close(None);
        comm.close(Some(ErrorRecord::error("again")));
        assert!(comm.is_closed());
    }

    #[tokio::test]
    async fn test_no_calls_accepted_after_close() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        comm.close(None);

        let result = comm.driver().path("echo").call(vec![]).await;
        assert!(matches!(result, Err(CallError::Disconnected(_))));
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_inbound_call_dispatched_and_answered() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        comm.set_provider(Some(echo_provider()));

        comm.reply_data(Invoke::Function(InvokeFunction {
            uid: 42,
            listener: "echo".to_owned(),
            parameters: vec![InvokeParameter::of(json!("hi"))],
        }))
        .await;

        let Some(Invoke::Return(ret)) = recorder.take() else {
            panic!("expected a return frame");
        };
        assert_eq!(ret.uid, 42);
        assert!(ret.success);
        assert_eq!(ret.value, json!("hi"));
    }

    #[tokio::test]
    async fn test_inbound_call_without_provider_answers_negatively() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());

        comm.reply_data(Invoke::Function(InvokeFunction {
            uid: 1,
            listener: "echo".to_owned(),
            parameters: vec![],
        }))
        .await;

        let Some(Invoke::Return(ret)) = recorder.take() else {
            panic!("expected a return frame");
        };
        assert!(!ret.success);
        assert_eq!(ret.value["message"], json!("the provider is not specified yet."));
    }

    #[tokio::test]
    async fn test_provider_reinstallation_takes_effect() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        comm.set_provider(Some(echo_provider()));
        comm.set_provider(None);

        comm.reply_data(Invoke::Function(InvokeFunction {
            uid: 2,
            listener: "echo".to_owned(),
            parameters: vec![],
        }))
        .await;

        let Some(Invoke::Return(ret)) = recorder.take() else {
            panic!("expected a return frame");
        };
        assert!(!ret.success);
        assert_eq!(ret.value["message"], json!("the provider would not be provided."));
        assert!(comm.provider().is_none());
    }

    #[tokio::test]
    async fn test_unmatched_return_is_dropped_silently() {
        let comm = Communicator::new(Recorder::default());
        comm.reply_data(Invoke::Return(InvokeReturn {
            uid: 12345,
            success: true,
            value: json!(1),
        }))
        .await;
        assert_eq!(comm.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_inbound_dropped_after_close() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        comm.set_provider(Some(echo_provider()));
        comm.close(None);

        comm.reply_data(Invoke::Function(InvokeFunction {
            uid: 3,
            listener: "echo".to_owned(),
            parameters: vec![],
        }))
        .await;
        assert_eq!(recorder.count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_calls_correlate_by_uid() {
        let recorder = Recorder::default();
        let comm = Communicator::new(recorder.clone());
        let driver = comm.driver();

        let first_path = driver.path("echo");
        let second_path = driver.path("echo");
        let first = first_path.call(vec![json!("first")]);
        let second = second_path.call(vec![json!("second")]);

        let (first, second, ()) = tokio::join!(first, second, async {
            let mut frames = Vec::new();
            while let Some(Invoke::Function(sent)) = recorder.take() {
                frames.push(sent);
            }
            assert_eq!(frames.len(), 2);
            assert_ne!(frames[0].uid, frames[1].uid);
            // Answer in reverse order; correlation must still hold.
            for sent in frames.into_iter().rev() {
                let value = sent.parameters[0].value.clone();
                comm.reply_data(Invoke::Return(InvokeReturn {
                    uid: sent.uid,
                    success: true,
                    value,
                }))
                .await;
            }
        });
        assert_eq!(first, Ok(json!("first")));
        assert_eq!(second, Ok(json!("second")));
    }
}
