//! Connector: lifecycle gate over the communicator.
//!
//! A connector tracks where a connection is in its life -
//! `None → Connecting → Open → Closing → Closed` - and refuses calls and
//! joins in every state but `Open`, each with a state-specific diagnostic.
//! Transitions are driven by concrete transport code; the core only reads
//! the state. The opaque header is captured once at construction and never
//! interpreted.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use farcall_core::{ErrorRecord, Invoke, TimeProvider};

use super::communicator::{Communicator, ReadyGate, Transmit};
use super::driver::Driver;
use super::provider::ProviderObject;
use crate::error::NotReadyError;

/// Connection lifecycle state.
///
/// The derived ordering follows the lifecycle:
/// `None < Connecting < Open < Closing < Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    /// No connection attempt has been made yet.
    None,
    /// A connection attempt is in progress.
    Connecting,
    /// The connection is established; calls and joins proceed.
    Open,
    /// A close handshake is in progress.
    Closing,
    /// The connection has been closed.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::None => "none",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// State-tracking wrapper gating communicator operations by connection
/// lifecycle, with an immutable header captured at construction.
pub struct Connector<H> {
    comm: Rc<Communicator>,
    state: Rc<Cell<ConnectionState>>,
    header: H,
    name: &'static str,
}

impl<H> Connector<H> {
    /// Create a connector in the [`ConnectionState::None`] state.
    ///
    /// `name` is the concrete connector name used in not-ready diagnostics
    /// (e.g. `"WebSocketConnector"`). The header is stored as-is and never
    /// interpreted by the core.
    pub fn new(name: &'static str, header: H, transmit: impl Transmit + 'static) -> Self {
        let state = Rc::new(Cell::new(ConnectionState::None));
        let gate = StateGate {
            name,
            state: Rc::clone(&state),
        };
        let comm = Communicator::with_gate(transmit, gate);
        Self {
            comm,
            state,
            header,
            name,
        }
    }

    /// The opaque header captured at construction.
    pub fn header(&self) -> &H {
        &self.header
    }

    /// The connector name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Assign the lifecycle state.
    ///
    /// Transport code drives the transitions; the core only reads them.
    pub fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
    }

    /// The underlying communicator, for transport plumbing.
    pub fn communicator(&self) -> &Rc<Communicator> {
        &self.comm
    }

    /// Install (or reinstall) the provider. See
    /// [`Communicator::set_provider`].
    pub fn set_provider(&self, provider: Option<ProviderObject>) {
        self.comm.set_provider(provider);
    }

    /// The currently installed provider, if any.
    pub fn provider(&self) -> Option<Rc<ProviderObject>> {
        self.comm.provider()
    }

    /// Obtain the driver for outbound calls.
    pub fn driver(&self) -> Driver {
        self.comm.driver()
    }

    /// Process one inbound wire frame. See [`Communicator::reply_data`].
    pub async fn reply_data(&self, invoke: Invoke) {
        self.comm.reply_data(invoke).await;
    }

    /// Suspend until the connection is torn down.
    pub async fn join(&self) -> Result<(), NotReadyError> {
        self.comm.join().await
    }

    /// Timed join: `true` if torn down within `timeout`.
    pub async fn join_for<T: TimeProvider>(
        &self,
        timeout: Duration,
        time: &T,
    ) -> Result<bool, NotReadyError> {
        self.comm.join_for(timeout, time).await
    }

    /// Timed join with an absolute deadline on `time`'s clock.
    pub async fn join_until<T: TimeProvider>(
        &self,
        deadline: Duration,
        time: &T,
    ) -> Result<bool, NotReadyError> {
        self.comm.join_until(deadline, time).await
    }

    /// Tear the connection down. See [`Communicator::close`].
    pub fn close(&self, reason: Option<ErrorRecord>) {
        self.comm.close(reason);
    }
}

/// Gate reading the connector's state cell.
struct StateGate {
    name: &'static str,
    state: Rc<Cell<ConnectionState>>,
}

impl ReadyGate for StateGate {
    fn inspect_ready(&self, method: &str) -> Result<(), NotReadyError> {
        let hint = match self.state.get() {
            ConnectionState::Open => return Ok(()),
            ConnectionState::None => "connect first.",
            ConnectionState::Connecting => "it's on connecting, wait for a second.",
            ConnectionState::Closing => "the connection is on closing.",
            ConnectionState::Closed => "the connection has been closed.",
        };
        Err(NotReadyError {
            connector: self.name.to_owned(),
            method: method.to_owned(),
            hint: hint.to_owned(),
        })
    }
}
