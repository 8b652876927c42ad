//! Data-channel decrypt pipeline: authenticate, decrypt, replay-check.
//!
//! One synchronous call per packet. Per-packet rejections come back as
//! [`DecryptStatus`] values so the hot path never unwinds; the only
//! `Err` is the session-fatal unsupported cipher mode. Every rejection
//! path resets the caller's buffer to empty, so a caller that ignores
//! the status forwards nothing.

use log::debug;

use crate::buffer::PacketBuffer;
use crate::crypto::{tags_match, CipherMode, DecryptCipher, PacketHmac, MAX_TAG_LEN};
use crate::error::SessionError;
use crate::frame::Frame;
use crate::replay::{PacketId, PacketTime, ReplayWindow};

/// Pipeline over the crate's concrete AES-256-CBC / HMAC-SHA-256 backend.
pub type CbcSha256Pipeline =
    DecryptPipeline<crate::crypto::CbcDecryptor, crate::crypto::Sha256KeyedDigest>;

/// Per-packet outcome of [`DecryptPipeline::decrypt`].
///
/// Every non-`Success` value is expected under lossy or adversarial
/// network conditions; the caller counts or logs it and moves on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptStatus {
    /// Buffer holds verified cleartext (or was an empty keepalive).
    Success,
    /// Authentication tag mismatch or truncated tag.
    HmacError,
    /// Cipher rejected the payload (bad padding, truncation, overflow).
    DecryptError,
    /// Packet ID already seen, expired, or stale.
    ReplayError,
}

/// Converts one authenticated/encrypted packet into cleartext.
///
/// Owns the session's decrypt-side crypto contexts (`None` means the
/// stage is pass-through), its anti-replay window, and one scratch
/// buffer reused across calls. One instance per session; calls must be
/// externally serialized.
pub struct DecryptPipeline<C, H> {
    frame: Frame,
    cipher: Option<C>,
    hmac: Option<H>,
    replay: ReplayWindow,
    work: PacketBuffer,
}

impl<C: DecryptCipher, H: PacketHmac> DecryptPipeline<C, H> {
    /// Assemble a pipeline from session state.
    pub fn new(frame: Frame, cipher: Option<C>, hmac: Option<H>, replay: ReplayWindow) -> Self {
        Self {
            frame,
            cipher,
            hmac,
            replay,
            work: PacketBuffer::new(),
        }
    }

    /// Setup-time configuration check.
    ///
    /// Detects an incompatible cipher mode before the first packet
    /// arrives; the same condition surfaces from
    /// [`decrypt`](Self::decrypt) if a session skips validation.
    pub fn validate(&self) -> Result<(), SessionError> {
        if let Some(cipher) = &self.cipher {
            let mode = cipher.cipher_mode();
            if mode != CipherMode::Cbc {
                return Err(SessionError::UnsupportedCipherMode(mode));
            }
        }
        Ok(())
    }

    /// The session's anti-replay window.
    pub fn replay(&self) -> &ReplayWindow {
        &self.replay
    }

    /// Authenticate, decrypt, and replay-check one packet in place.
    ///
    /// On success `buf` holds the verified cleartext; on any per-packet
    /// rejection `buf` is empty and the status names the failing stage.
    pub fn decrypt(
        &mut self,
        buf: &mut PacketBuffer,
        now: PacketTime,
    ) -> Result<DecryptStatus, SessionError> {
        // Keepalive packets carry no payload.
        if buf.is_empty() {
            return Ok(DecryptStatus::Success);
        }

        if let Some(hmac) = &self.hmac {
            let tag_len = hmac.output_size();
            debug_assert!(tag_len <= MAX_TAG_LEN);
            let packet_tag = match buf.read_front(tag_len) {
                Some(tag) => tag,
                None => {
                    debug!("auth: packet shorter than {tag_len}-byte tag");
                    buf.reset();
                    return Ok(DecryptStatus::HmacError);
                }
            };
            let mut local_tag = [0u8; MAX_TAG_LEN];
            hmac.tag(buf.as_slice(), &mut local_tag[..tag_len]);
            if !tags_match(&local_tag[..tag_len], &packet_tag) {
                debug!("auth: tag mismatch");
                buf.reset();
                return Ok(DecryptStatus::HmacError);
            }
        }

        match &self.cipher {
            Some(cipher) => {
                // The IV rides in clear at the head of the ciphertext.
                let iv = match buf.read_front(cipher.iv_length()) {
                    Some(iv) => iv,
                    None => {
                        debug!("decrypt: packet shorter than IV");
                        buf.reset();
                        return Ok(DecryptStatus::DecryptError);
                    }
                };

                self.frame.prepare_decrypt_work(&mut self.work);
                let written = match cipher.decrypt(&iv[..], self.work.as_mut_slice(), buf.as_slice())
                {
                    Ok(n) if n > 0 => n,
                    Ok(_) | Err(_) => {
                        debug!("decrypt: cipher rejected {}-byte payload", buf.len());
                        buf.reset();
                        return Ok(DecryptStatus::DecryptError);
                    }
                };
                self.work.truncate(written);

                match cipher.cipher_mode() {
                    CipherMode::Cbc => {
                        // The packet ID is part of the ciphertext, so it
                        // is verified against the decrypted payload.
                        if !verify_packet_id(&mut self.replay, &mut self.work, now) {
                            buf.reset();
                            return Ok(DecryptStatus::ReplayError);
                        }
                    }
                    mode => return Err(SessionError::UnsupportedCipherMode(mode)),
                }

                // Hand the cleartext back in the caller's buffer.
                buf.swap(&mut self.work);
            }
            None => {
                // Authentication-only session: the packet ID sits in the
                // raw post-HMAC bytes.
                if !verify_packet_id(&mut self.replay, buf, now) {
                    buf.reset();
                    return Ok(DecryptStatus::ReplayError);
                }
            }
        }

        Ok(DecryptStatus::Success)
    }
}

/// Consume and check the leading packet ID of `buf`; true to accept.
/// A window that is not initialized skips the check and consumes nothing.
fn verify_packet_id(replay: &mut ReplayWindow, buf: &mut PacketBuffer, now: PacketTime) -> bool {
    if !replay.initialized() {
        return true;
    }
    let pid = match PacketId::read_from(buf, replay.long_form()) {
        Some(pid) => pid,
        None => {
            debug!("replay: payload shorter than packet ID");
            return false;
        }
    };
    if replay.test(pid, now) {
        replay.add(pid, now);
        true
    } else {
        debug!("replay: rejected packet ID {pid:?}");
        false
    }
}
