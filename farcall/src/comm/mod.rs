//! The communicator core.
//!
//! This module implements the symmetric RFC peer and everything it composes:
//!
//! - **`Communicator`**: uid correlation, dispatch, teardown
//! - **`Driver`** / **`RemoteFunction`**: path-builder proxy for outbound calls
//! - **`ProviderObject`**: the locally-exposed function tree
//! - **`Connector`**: lifecycle gating with the state machine
//!   `None → Connecting → Open → Closing → Closed`
//!
//! # Design Philosophy
//!
//! The peer is deliberately symmetric: there is no client or server role at
//! this layer. Whichever side holds a driver can call; whichever side
//! installed a provider can be called; most real deployments do both at
//! once over the same channel.

mod communicator;
mod connector;
mod dispatch;
mod driver;
mod join;
mod pending;
mod provider;
mod sequence;

pub use communicator::{AlwaysReady, Communicator, ReadyGate, Transmit};
pub use connector::{ConnectionState, Connector};
pub use driver::{Driver, RemoteFunction};
pub use provider::{CallFault, ProviderFn, ProviderFuture, ProviderNode, ProviderObject};
