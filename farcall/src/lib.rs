//! # Farcall
//!
//! Transport-agnostic remote function calls between two symmetric peers.
//!
//! Each peer exposes a [`ProviderObject`] (the functions the other side may
//! call) and consumes a [`Driver`] (a virtual object whose member
//! invocations travel to the remote provider). The [`Communicator`] in the
//! middle multiplexes any number of concurrent in-flight calls over a single
//! bidirectional message channel, correlating requests and replies by uid.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              Application Code                   │
//! │    ProviderObject (exposed) + Driver (consumed) │
//! ├─────────────────────────────────────────────────┤
//! │    Connector (lifecycle gate + opaque header)   │
//! ├─────────────────────────────────────────────────┤
//! │    Communicator                                 │
//! │    • uid correlation of concurrent calls        │
//! │    • path dispatch with access filtering        │
//! │    • teardown: reject pending, wake joiners     │
//! ├─────────────────────────────────────────────────┤
//! │    Transport (implements Transmit, pumps        │
//! │    inbound frames into reply_data)              │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Communicator`] | Symmetric peer: calls out, dispatches in, tears down |
//! | [`Driver`] | Virtual remote object for outbound calls |
//! | [`ProviderObject`] | Locally-exposed function tree |
//! | [`Connector`] | Gates operations by connection lifecycle state |
//! | [`local`] | In-process channel pair for tests and same-process peers |
//!
//! ## Quick Start
//!
//! ```ignore
//! use farcall::{local, provider_object, remote_call, Communicator, JsonCodec};
//!
//! let (near, far) = local::pair(JsonCodec);
//! let server = Communicator::new(far.clone());
//! server.set_provider(Some(provider_object! {
//!     math: {
//!         add: |args| async move { Ok(serde_json::json!(
//!             args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)
//!         )) },
//!     },
//! }));
//!
//! let client = Communicator::new(near.clone());
//! let driver = client.driver();
//! // ... pump frames between the sockets, then:
//! let sum = remote_call!(driver => math.add(2, 3)).await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

// Re-export core types for convenience
pub use farcall_core::{
    CodecError, ErrorRecord, Invoke, InvokeFunction, InvokeParameter, InvokeReturn, JsonCodec,
    MessageCodec, TimeError, TimeProvider, TokioTimeProvider,
};

// =============================================================================
// Modules
// =============================================================================

/// Error types for communicator operations.
pub mod error;

/// The communicator core: pending calls, dispatch, driver, connector.
pub mod comm;

/// In-process channel pair for tests, examples and same-process peers.
pub mod local;

mod macros;

// =============================================================================
// Public API Re-exports
// =============================================================================

// Error exports
pub use error::{CallError, NotReadyError, TransmitError};

// Communicator exports
pub use comm::{
    AlwaysReady, CallFault, Communicator, ConnectionState, Connector, Driver, ProviderFn,
    ProviderFuture, ProviderNode, ProviderObject, ReadyGate, RemoteFunction, Transmit,
};

// Local channel exports
pub use local::{LocalSocket, MessageQueue};

// Macro plumbing: lets the exported macros name serde_json through $crate.
#[doc(hidden)]
pub use serde_json as __serde_json;
