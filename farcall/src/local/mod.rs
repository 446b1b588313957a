//! In-process channel pair.
//!
//! Two communicators in the same process can talk through a
//! [`LocalSocket`] pair. Frames still cross a real serialization boundary -
//! every send is encoded through the pair's [`MessageCodec`] and decoded on
//! the far side - so tests and examples exercise exactly the wire schema a
//! network transport would carry.
//!
//! # Example
//!
//! ```rust
//! use farcall::{JsonCodec, local};
//!
//! let (near, far) = local::pair(JsonCodec);
//! // hand `near` to one communicator, `far` to the other, and pump
//! // `recv()` into `reply_data` on each side.
//! # let _ = (near, far);
//! ```

mod queue;
mod socket;

pub use queue::MessageQueue;
pub use socket::{LocalSocket, pair};
