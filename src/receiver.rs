//! In-order reassembly of out-of-order control-channel packets.

use crate::error::NotReady;
use crate::window::{SequenceId, SequenceWindow};

/// Per-packet obligations reported by [`ReliableReceiver::receive`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiveFlags(u8);

impl ReceiveFlags {
    /// No obligation; the packet was dropped without state change.
    pub const EMPTY: ReceiveFlags = ReceiveFlags(0);
    /// An acknowledgement for this ID should be returned to the sender.
    pub const ACK_TO_SENDER: ReceiveFlags = ReceiveFlags(1 << 0);
    /// The packet was stored in the window (otherwise it was discarded).
    pub const IN_WINDOW: ReceiveFlags = ReceiveFlags(1 << 1);

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: ReceiveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if the sender should be acknowledged.
    pub fn ack_to_sender(self) -> bool {
        self.contains(Self::ACK_TO_SENDER)
    }

    /// True if the packet was buffered in-window.
    pub fn in_window(self) -> bool {
        self.contains(Self::IN_WINDOW)
    }

    /// True if no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ReceiveFlags {
    type Output = ReceiveFlags;

    fn bitor(self, rhs: ReceiveFlags) -> ReceiveFlags {
        ReceiveFlags(self.0 | rhs.0)
    }
}

/// A buffered control-channel packet with its sequence ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message<P> {
    /// Sequence ID the packet arrived under.
    pub id: SequenceId,
    /// The packet payload.
    pub packet: P,
}

/// Turns arbitrary-order packet arrival into a strictly ordered stream.
///
/// Arrivals are buffered with [`receive`](Self::receive); the ordered
/// side is drained with [`ready`](Self::ready) /
/// [`next_sequenced`](Self::next_sequenced) / [`advance`](Self::advance),
/// so a caller can pull zero or more ready messages per network event
/// without re-deriving window state. Retransmission and ACK emission
/// belong to the layers above; this type only reports the obligation.
pub struct ReliableReceiver<P> {
    window: SequenceWindow<Message<P>>,
}

impl<P> ReliableReceiver<P> {
    /// Receiver expecting IDs starting at zero.
    pub fn new(span: u32) -> Self {
        Self::with_base(0, span)
    }

    /// Receiver expecting IDs starting at `base`.
    pub fn with_base(base: SequenceId, span: u32) -> Self {
        Self {
            window: SequenceWindow::new(base, span),
        }
    }

    /// Feed one unsequenced packet off the wire.
    ///
    /// In-window IDs are stored (a duplicate arrival overwrites its slot
    /// idempotently) and report `ACK_TO_SENDER | IN_WINDOW`. Pre-window
    /// IDs were already delivered: the packet is discarded but the
    /// sender still needs the acknowledgement again, so `ACK_TO_SENDER`
    /// alone is reported. IDs beyond the window are dropped with no
    /// state change, bounding memory against sequence-ID flooding.
    pub fn receive(&mut self, packet: P, id: SequenceId) -> ReceiveFlags {
        if self.window.in_window(id) {
            *self.window.ref_by_id(id) = Some(Message { id, packet });
            ReceiveFlags::ACK_TO_SENDER | ReceiveFlags::IN_WINDOW
        } else if self.window.pre_window(id) {
            ReceiveFlags::ACK_TO_SENDER
        } else {
            ReceiveFlags::EMPTY
        }
    }

    /// True if the next message in strict sequence order is available.
    pub fn ready(&self) -> bool {
        self.window.head_defined()
    }

    /// The next in-order message, without removing it.
    ///
    /// Fails with [`NotReady`] when [`ready`](Self::ready) is false;
    /// callers must check first rather than process stale data.
    pub fn next_sequenced(&mut self) -> Result<&Message<P>, NotReady> {
        match self.window.ref_head() {
            Some(message) => Ok(message),
            None => Err(NotReady),
        }
    }

    /// Dispose of the message returned by
    /// [`next_sequenced`](Self::next_sequenced) and slide the window
    /// forward by one.
    pub fn advance(&mut self) {
        self.window.rm_head_nocheck();
    }

    /// Sequence ID the receiver will yield next.
    pub fn next_id(&self) -> SequenceId {
        self.window.base()
    }
}
