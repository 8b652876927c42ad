//! Crypto backend seam and the AES-CBC / HMAC-SHA-256 implementation.
//!
//! The decrypt pipeline talks to the cipher and HMAC through the traits
//! here; an "undefined" context in the session state is simply `None` at
//! the pipeline level. The concrete types bind RustCrypto primitives to
//! negotiated session keys.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::SessionError;

/// Block-cipher operating mode reported by a cipher context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherMode {
    /// Block chaining with a leading IV. The only mode the decrypt
    /// pipeline handles.
    Cbc,
    /// Combined-mode AEAD. Listed so sessions negotiated against a
    /// backend this core cannot process fail loudly at setup instead of
    /// being mis-processed per packet.
    Aead,
}

/// Per-packet cipher rejection (bad padding, misaligned or oversized
/// input). Expected under adversarial traffic; never session-fatal.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cipher rejected packet")]
pub struct CipherReject;

/// Decrypt-direction cipher context bound to a session key.
pub trait DecryptCipher {
    /// IV length in bytes, read from the head of each packet.
    fn iv_length(&self) -> usize;

    /// Operating mode of this context.
    fn cipher_mode(&self) -> CipherMode;

    /// Decrypt `input` into `out`, returning the plaintext length.
    fn decrypt(&self, iv: &[u8], out: &mut [u8], input: &[u8]) -> Result<usize, CipherReject>;
}

/// Keyed packet authenticator.
pub trait PacketHmac {
    /// Tag length in bytes. Must not exceed [`MAX_TAG_LEN`].
    fn output_size(&self) -> usize;

    /// Compute the tag over `data` into `out` (`output_size()` bytes).
    fn tag(&self, data: &[u8], out: &mut [u8]);
}

/// Upper bound on HMAC tag length accepted by the pipeline.
pub const MAX_TAG_LEN: usize = 64;

/// Constant-time tag equality. Length mismatch compares unequal.
pub fn tags_match(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256-CBC decryptor with PKCS#7 padding.
pub struct CbcDecryptor {
    key: [u8; 32],
}

impl CbcDecryptor {
    /// Bind a decryptor to a 32-byte session key.
    pub fn new(key: &[u8]) -> Result<Self, SessionError> {
        let key: [u8; 32] = key.try_into().map_err(|_| SessionError::InvalidKey)?;
        Ok(Self { key })
    }
}

impl DecryptCipher for CbcDecryptor {
    fn iv_length(&self) -> usize {
        16
    }

    fn cipher_mode(&self) -> CipherMode {
        CipherMode::Cbc
    }

    fn decrypt(&self, iv: &[u8], out: &mut [u8], input: &[u8]) -> Result<usize, CipherReject> {
        let dec = Aes256CbcDec::new_from_slices(&self.key, iv).map_err(|_| CipherReject)?;
        let plaintext = dec
            .decrypt_padded_b2b_mut::<Pkcs7>(input, out)
            .map_err(|_| CipherReject)?;
        Ok(plaintext.len())
    }
}

/// HMAC-SHA-256 packet authenticator.
pub struct Sha256KeyedDigest {
    mac: Hmac<Sha256>,
}

impl Sha256KeyedDigest {
    /// Bind an authenticator to a session key.
    pub fn new(key: &[u8]) -> Result<Self, SessionError> {
        if key.is_empty() {
            return Err(SessionError::InvalidKey);
        }
        let mac = <Hmac<Sha256> as Mac>::new_from_slice(key).map_err(|_| SessionError::InvalidKey)?;
        Ok(Self { mac })
    }
}

impl PacketHmac for Sha256KeyedDigest {
    fn output_size(&self) -> usize {
        32
    }

    fn tag(&self, data: &[u8], out: &mut [u8]) {
        let mut mac = self.mac.clone();
        mac.update(data);
        let digest = mac.finalize().into_bytes();
        out[..digest.len()].copy_from_slice(&digest);
    }
}
