//! One half of a connected in-process channel.

use std::rc::Rc;

use async_trait::async_trait;
use farcall_core::{Invoke, MessageCodec};

use super::queue::MessageQueue;
use crate::comm::Transmit;
use crate::error::TransmitError;

/// One endpoint of an in-process channel pair.
///
/// Implements [`Transmit`] by encoding each frame through the codec into
/// the peer's inbox; [`recv`](Self::recv) yields the decoded frames sent by
/// the peer. Clones share the same endpoint, so a socket can serve both as
/// a communicator's transmit hook and as the inbound pump's source.
#[derive(Clone)]
pub struct LocalSocket<C: MessageCodec> {
    inbox: Rc<MessageQueue<Invoke, C>>,
    peer: Rc<MessageQueue<Invoke, C>>,
    codec: C,
}

/// Create a connected socket pair sharing `codec`.
pub fn pair<C: MessageCodec>(codec: C) -> (LocalSocket<C>, LocalSocket<C>) {
    let left = Rc::new(MessageQueue::new(codec.clone()));
    let right = Rc::new(MessageQueue::new(codec.clone()));
    (
        LocalSocket {
            inbox: Rc::clone(&left),
            peer: Rc::clone(&right),
            codec: codec.clone(),
        },
        LocalSocket {
            inbox: right,
            peer: left,
            codec,
        },
    )
}

impl<C: MessageCodec> LocalSocket<C> {
    /// Receive the next inbound frame; `None` once the channel is closed
    /// and drained.
    pub async fn recv(&self) -> Option<Invoke> {
        self.inbox.recv().await
    }

    /// Close both directions of the channel.
    pub fn close(&self) {
        self.inbox.close();
        self.peer.close();
    }

    /// Whether this endpoint's inbound direction has been closed.
    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}

#[async_trait(?Send)]
impl<C: MessageCodec> Transmit for LocalSocket<C> {
    async fn send(&self, invoke: Invoke) -> Result<(), TransmitError> {
        if self.peer.is_closed() {
            return Err(TransmitError::Closed);
        }
        let payload = self
            .codec
            .encode(&invoke)
            .map_err(|error| TransmitError::Encode(error.to_string()))?;
        self.peer.receive(&payload);
        Ok(())
    }
}
