//! [RFC9180 Sec.5](https://www.rfc-editor.org/rfc/rfc9180.html#section-5) Key schedule,
//! sender/receiver contexts, and the setup entry points for the four modes.

#[cfg(test)]
mod vector_test;

use bytes::{BufMut, Bytes, BytesMut};
use rand_core::CryptoRngCore;
use zeroize::Zeroize;

use crate::aead::{AeadId, AeadKey};
use crate::error::*;
use crate::kdf::{Kdf, KdfId};
use crate::kem::{KemId, KemPrivateKey, KemPublicKey};
use crate::suite::CipherSuite;

/// HPKE operating modes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Mode {
    Base = 0x00,
    Psk = 0x01,
    Auth = 0x02,
    AuthPsk = 0x03,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Sender,
    Receiver,
}

// KEM outputs retained for test-vector generation.
pub(crate) struct SetupParams {
    pub(crate) mode: Mode,
    pub(crate) shared_secret: Vec<u8>,
    pub(crate) enc: Vec<u8>,
}

// Key-schedule intermediates retained for test-vector generation.
pub(crate) struct ContextParams {
    pub(crate) key_schedule_context: Vec<u8>,
    pub(crate) secret: Vec<u8>,
}

/// State shared by the sending and receiving halves of a session.
pub(crate) struct CipherContext {
    pub(crate) role: Role,
    pub(crate) kem_id: KemId,
    pub(crate) kdf_id: KdfId,
    pub(crate) aead_id: AeadId,

    kdf: Kdf,
    aead_key: AeadKey,

    pub(crate) key: Vec<u8>,
    pub(crate) base_nonce: Vec<u8>,
    pub(crate) exporter_secret: Vec<u8>,
    pub(crate) seq: u64,

    pub(crate) setup_params: SetupParams,
    pub(crate) context_params: ContextParams,
}

impl CipherContext {
    // The last sequence number that can still be sealed or opened. The
    // counter occupies min(8, Nn) bytes of the nonce.
    fn max_seq(&self) -> u64 {
        let nn = self.base_nonce.len();
        if nn >= 8 {
            u64::MAX
        } else {
            (1u64 << (8 * nn)) - 1
        }
    }

    // Big-endian sequence number, right-aligned and zero-padded to the nonce
    // size, XORed into the base nonce.
    pub(crate) fn compute_nonce(&self, seq: u64) -> Vec<u8> {
        let mut nonce = self.base_nonce.clone();
        let seq_bytes = seq.to_be_bytes();
        let nn = nonce.len();
        let take = seq_bytes.len().min(nn);
        for i in 0..take {
            nonce[nn - 1 - i] ^= seq_bytes[seq_bytes.len() - 1 - i];
        }
        nonce
    }

    pub(crate) fn seal(&mut self, aad: &[u8], plaintext: &[u8]) -> Result<Bytes> {
        if self.seq >= self.max_seq() {
            return Err(Error::SequenceOverflow);
        }

        let nonce = self.compute_nonce(self.seq);
        let ciphertext = self.aead_key.seal(&nonce, plaintext, aad)?;
        self.seq += 1;
        Ok(ciphertext)
    }

    pub(crate) fn open(&mut self, aad: &[u8], ciphertext: &[u8]) -> Result<Bytes> {
        if self.seq >= self.max_seq() {
            return Err(Error::SequenceOverflow);
        }

        let nonce = self.compute_nonce(self.seq);
        // seq only advances once the record authenticates
        let plaintext = self.aead_key.open(&nonce, ciphertext, aad)?;
        self.seq += 1;
        Ok(plaintext)
    }

    pub(crate) fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.kdf
            .labeled_expand(&self.exporter_secret, "sec", exporter_context, length)
    }
}

impl Drop for CipherContext {
    fn drop(&mut self) {
        self.key.zeroize();
        self.base_nonce.zeroize();
        self.exporter_secret.zeroize();
        self.setup_params.shared_secret.zeroize();
        self.context_params.secret.zeroize();
    }
}

/// The encrypting half of an HPKE session, created by one of the `setup_*_s`
/// entry points. Records must be opened by the receiver in the order they
/// were sealed.
pub struct SenderContext {
    pub(crate) context: CipherContext,
}

impl SenderContext {
    pub fn seal(&mut self, aad: &[u8], plaintext: &[u8]) -> Result<Bytes> {
        self.context.seal(aad, plaintext)
    }

    /// Derive `length` bytes bound to this session and `exporter_context`.
    /// Deterministic and identical on both sides.
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.context.export(exporter_context, length)
    }
}

/// The decrypting half of an HPKE session, created by one of the `setup_*_r`
/// entry points.
pub struct ReceiverContext {
    pub(crate) context: CipherContext,
}

impl ReceiverContext {
    pub fn open(&mut self, aad: &[u8], ciphertext: &[u8]) -> Result<Bytes> {
        self.context.open(aad, ciphertext)
    }

    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.context.export(exporter_context, length)
    }
}

fn verify_psk_inputs(mode: Mode, psk: &[u8], psk_id: &[u8]) -> Result<()> {
    let got_psk = !psk.is_empty();
    let got_psk_id = !psk_id.is_empty();
    if got_psk != got_psk_id {
        return Err(Error::InconsistentPskInputs);
    }

    match mode {
        Mode::Base | Mode::Auth if got_psk => Err(Error::PskInputsForbidden),
        Mode::Psk | Mode::AuthPsk if !got_psk => Err(Error::PskInputsRequired),
        _ => Ok(()),
    }
}

fn key_schedule(
    suite: &CipherSuite,
    role: Role,
    mode: Mode,
    shared_secret: Bytes,
    enc: Bytes,
    info: &[u8],
    psk: &[u8],
    psk_id: &[u8],
) -> Result<CipherContext> {
    verify_psk_inputs(mode, psk, psk_id)?;

    let kdf = suite.kdf;

    let psk_id_hash = kdf.labeled_extract(&[], "pskID_hash", psk_id)?;
    let info_hash = kdf.labeled_extract(&[], "info_hash", info)?;

    let mut context = BytesMut::with_capacity(1 + psk_id_hash.len() + info_hash.len());
    context.put_u8(mode as u8);
    context.put_slice(&psk_id_hash);
    context.put_slice(&info_hash);
    let key_schedule_context = context.freeze();

    let psk_hash = kdf.labeled_extract(&[], "psk_hash", psk)?;
    let secret = kdf.labeled_extract(&psk_hash, "zz", &shared_secret)?;

    let key = kdf.labeled_expand(&secret, "key", &key_schedule_context, suite.aead.key_size())?;
    let base_nonce = kdf.labeled_expand(
        &secret,
        "nonce",
        &key_schedule_context,
        suite.aead.nonce_size(),
    )?;
    let exporter_secret =
        kdf.labeled_expand(&secret, "exp", &key_schedule_context, kdf.output_size())?;

    let aead_key = suite.aead.new_key(&key)?;

    Ok(CipherContext {
        role,
        kem_id: suite.kem.id(),
        kdf_id: kdf.id(),
        aead_id: suite.aead.id(),
        kdf,
        aead_key,
        key: key.to_vec(),
        base_nonce: base_nonce.to_vec(),
        exporter_secret: exporter_secret.to_vec(),
        seq: 0,
        setup_params: SetupParams {
            mode,
            shared_secret: shared_secret.to_vec(),
            enc: enc.to_vec(),
        },
        context_params: ContextParams {
            key_schedule_context: key_schedule_context.to_vec(),
            secret: secret.to_vec(),
        },
    })
}

/// Set up a sender context in Base mode: encrypt to `pk_r`.
pub fn setup_base_s(
    suite: &CipherSuite,
    rng: &mut dyn CryptoRngCore,
    pk_r: &KemPublicKey,
    info: &[u8],
) -> Result<(Bytes, SenderContext)> {
    let (shared_secret, enc) = suite.kem.encap(rng, pk_r)?;
    let context = key_schedule(
        suite,
        Role::Sender,
        Mode::Base,
        shared_secret,
        enc.clone(),
        info,
        &[],
        &[],
    )?;
    Ok((enc, SenderContext { context }))
}

/// Set up the receiver context matching [`setup_base_s`].
pub fn setup_base_r(
    suite: &CipherSuite,
    sk_r: &KemPrivateKey,
    enc: &[u8],
    info: &[u8],
) -> Result<ReceiverContext> {
    let shared_secret = suite.kem.decap(enc, sk_r)?;
    let context = key_schedule(
        suite,
        Role::Receiver,
        Mode::Base,
        shared_secret,
        Bytes::copy_from_slice(enc),
        info,
        &[],
        &[],
    )?;
    Ok(ReceiverContext { context })
}

/// Set up a sender context in PSK mode: Base plus a pre-shared key bound
/// into the key schedule.
pub fn setup_psk_s(
    suite: &CipherSuite,
    rng: &mut dyn CryptoRngCore,
    pk_r: &KemPublicKey,
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<(Bytes, SenderContext)> {
    let (shared_secret, enc) = suite.kem.encap(rng, pk_r)?;
    let context = key_schedule(
        suite,
        Role::Sender,
        Mode::Psk,
        shared_secret,
        enc.clone(),
        info,
        psk,
        psk_id,
    )?;
    Ok((enc, SenderContext { context }))
}

/// Set up the receiver context matching [`setup_psk_s`].
pub fn setup_psk_r(
    suite: &CipherSuite,
    sk_r: &KemPrivateKey,
    enc: &[u8],
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<ReceiverContext> {
    let shared_secret = suite.kem.decap(enc, sk_r)?;
    let context = key_schedule(
        suite,
        Role::Receiver,
        Mode::Psk,
        shared_secret,
        Bytes::copy_from_slice(enc),
        info,
        psk,
        psk_id,
    )?;
    Ok(ReceiverContext { context })
}

/// Set up a sender context in Auth mode: the encapsulation additionally
/// authenticates the sender's key pair. Requires an Auth-capable KEM.
pub fn setup_auth_s(
    suite: &CipherSuite,
    rng: &mut dyn CryptoRngCore,
    pk_r: &KemPublicKey,
    sk_s: &KemPrivateKey,
    info: &[u8],
) -> Result<(Bytes, SenderContext)> {
    let (shared_secret, enc) = suite.kem.auth_encap(rng, pk_r, sk_s)?;
    let context = key_schedule(
        suite,
        Role::Sender,
        Mode::Auth,
        shared_secret,
        enc.clone(),
        info,
        &[],
        &[],
    )?;
    Ok((enc, SenderContext { context }))
}

/// Set up the receiver context matching [`setup_auth_s`].
pub fn setup_auth_r(
    suite: &CipherSuite,
    sk_r: &KemPrivateKey,
    pk_s: &KemPublicKey,
    enc: &[u8],
    info: &[u8],
) -> Result<ReceiverContext> {
    let shared_secret = suite.kem.auth_decap(enc, sk_r, pk_s)?;
    let context = key_schedule(
        suite,
        Role::Receiver,
        Mode::Auth,
        shared_secret,
        Bytes::copy_from_slice(enc),
        info,
        &[],
        &[],
    )?;
    Ok(ReceiverContext { context })
}

/// Set up a sender context in AuthPSK mode: sender authentication and a
/// pre-shared key. Requires an Auth-capable KEM.
pub fn setup_auth_psk_s(
    suite: &CipherSuite,
    rng: &mut dyn CryptoRngCore,
    pk_r: &KemPublicKey,
    sk_s: &KemPrivateKey,
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<(Bytes, SenderContext)> {
    let (shared_secret, enc) = suite.kem.auth_encap(rng, pk_r, sk_s)?;
    let context = key_schedule(
        suite,
        Role::Sender,
        Mode::AuthPsk,
        shared_secret,
        enc.clone(),
        info,
        psk,
        psk_id,
    )?;
    Ok((enc, SenderContext { context }))
}

/// Set up the receiver context matching [`setup_auth_psk_s`].
pub fn setup_auth_psk_r(
    suite: &CipherSuite,
    sk_r: &KemPrivateKey,
    pk_s: &KemPublicKey,
    enc: &[u8],
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<ReceiverContext> {
    let shared_secret = suite.kem.auth_decap(enc, sk_r, pk_s)?;
    let context = key_schedule(
        suite,
        Role::Receiver,
        Mode::AuthPsk,
        shared_secret,
        Bytes::copy_from_slice(enc),
        info,
        psk,
        psk_id,
    )?;
    Ok(ReceiverContext { context })
}
