//! Error types for the tunnel core.

use thiserror::Error;

use crate::crypto::CipherMode;

/// Session-fatal failures.
///
/// These indicate the session was built against an incompatible or
/// invalid crypto configuration and must be torn down; they are never
/// returned for an individual bad packet.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The negotiated cipher mode cannot be processed by this core.
    #[error("unsupported cipher mode {0:?}: only CBC data channels are handled")]
    UnsupportedCipherMode(CipherMode),
    /// A crypto context was constructed with a key of the wrong length.
    #[error("invalid key length for crypto context")]
    InvalidKey,
}

/// `next_sequenced()` was called while no in-order message is buffered.
///
/// This is a caller-contract violation, not a network condition; check
/// `ready()` first.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("next sequenced message not ready")]
pub struct NotReady;
