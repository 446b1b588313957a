//! Process-wide sequence counter for minting call uids.

use std::sync::atomic::{AtomicU64, Ordering};

/// Mint a fresh call uid.
///
/// The counter is shared by every communicator in the process, so a uid
/// doubles as a correlation key across connection logs. Live calls are
/// bounded, so an incrementing integer stays unique among outstanding calls
/// even if the counter were ever to wrap.
pub(crate) fn next_uid() -> u64 {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}
