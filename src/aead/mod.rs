//! [RFC9180 Sec.4](https://www.rfc-editor.org/rfc/rfc9180.html#section-4) AEAD schemes.
//!
//! Sealing and opening are stateless: every call is fully determined by the
//! key, nonce, associated data, and payload.


use aes_gcm::aead::{Aead as _, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use bytes::Bytes;
use chacha20poly1305::ChaCha20Poly1305;

use crate::error::*;

/// Registered AEAD identifiers.
#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum AeadId {
    #[default]
    AES128GCM = 0x0001,
    AES256GCM = 0x0002,
    ChaCha20Poly1305 = 0x0003,
}

impl TryFrom<u16> for AeadId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0001 => Ok(AeadId::AES128GCM),
            0x0002 => Ok(AeadId::AES256GCM),
            0x0003 => Ok(AeadId::ChaCha20Poly1305),
            _ => Err(Error::UnknownAeadId(v)),
        }
    }
}

/// An AEAD algorithm. Keying it with [`Aead::new_key`] yields a sealer/opener.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Aead {
    #[default]
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl Aead {
    pub fn new(id: AeadId) -> Self {
        match id {
            AeadId::AES128GCM => Aead::Aes128Gcm,
            AeadId::AES256GCM => Aead::Aes256Gcm,
            AeadId::ChaCha20Poly1305 => Aead::ChaCha20Poly1305,
        }
    }

    pub fn id(&self) -> AeadId {
        match self {
            Aead::Aes128Gcm => AeadId::AES128GCM,
            Aead::Aes256Gcm => AeadId::AES256GCM,
            Aead::ChaCha20Poly1305 => AeadId::ChaCha20Poly1305,
        }
    }

    /// The size in bytes of the keys used by the AEAD cipher.
    pub fn key_size(&self) -> usize {
        match self {
            Aead::Aes128Gcm => 16,
            Aead::Aes256Gcm | Aead::ChaCha20Poly1305 => 32,
        }
    }

    /// The size in bytes of the nonce used by the AEAD cipher.
    pub fn nonce_size(&self) -> usize {
        match self {
            Aead::Aes128Gcm | Aead::Aes256Gcm | Aead::ChaCha20Poly1305 => 12,
        }
    }

    /// Instantiate the cipher with `key`. Fails if the key length does not
    /// match [`Aead::key_size`].
    pub fn new_key(&self, key: &[u8]) -> Result<AeadKey> {
        if key.len() != self.key_size() {
            return Err(Error::IncorrectKeySize {
                got: key.len(),
                want: self.key_size(),
            });
        }

        match self {
            Aead::Aes128Gcm => {
                let cipher = Aes128Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                Ok(AeadKey::Aes128Gcm(cipher))
            }
            Aead::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                Ok(AeadKey::Aes256Gcm(cipher))
            }
            Aead::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                Ok(AeadKey::ChaCha20Poly1305(cipher))
            }
        }
    }
}

/// A keyed AEAD cipher.
#[derive(Clone)]
pub enum AeadKey {
    Aes128Gcm(Aes128Gcm),
    Aes256Gcm(Aes256Gcm),
    ChaCha20Poly1305(ChaCha20Poly1305),
}

impl AeadKey {
    fn nonce_size(&self) -> usize {
        match self {
            AeadKey::Aes128Gcm(_) | AeadKey::Aes256Gcm(_) | AeadKey::ChaCha20Poly1305(_) => 12,
        }
    }

    /// Encrypt and authenticate `plaintext` with `additional_data`, returning
    /// the ciphertext with the tag appended.
    pub fn seal(&self, nonce: &[u8], plaintext: &[u8], additional_data: &[u8]) -> Result<Bytes> {
        if nonce.len() != self.nonce_size() {
            return Err(Error::RustCryptoError(format!(
                "incorrect nonce size {}",
                nonce.len()
            )));
        }

        let payload = Payload {
            msg: plaintext,
            aad: additional_data,
        };
        let ciphertext = match self {
            AeadKey::Aes128Gcm(cipher) => cipher.encrypt(aes_gcm::Nonce::from_slice(nonce), payload),
            AeadKey::Aes256Gcm(cipher) => cipher.encrypt(aes_gcm::Nonce::from_slice(nonce), payload),
            AeadKey::ChaCha20Poly1305(cipher) => {
                cipher.encrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
        }
        .map_err(|err| Error::RustCryptoError(err.to_string()))?;

        Ok(Bytes::from(ciphertext))
    }

    /// Decrypt and verify `ciphertext` (with trailing tag) against
    /// `additional_data`, returning the plaintext.
    pub fn open(&self, nonce: &[u8], ciphertext: &[u8], additional_data: &[u8]) -> Result<Bytes> {
        if nonce.len() != self.nonce_size() {
            return Err(Error::RustCryptoError(format!(
                "incorrect nonce size {}",
                nonce.len()
            )));
        }

        let payload = Payload {
            msg: ciphertext,
            aad: additional_data,
        };
        let plaintext = match self {
            AeadKey::Aes128Gcm(cipher) => cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload),
            AeadKey::Aes256Gcm(cipher) => cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload),
            AeadKey::ChaCha20Poly1305(cipher) => {
                cipher.decrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
        }
        .map_err(|_| Error::AeadOpenFailed)?;

        Ok(Bytes::from(plaintext))
    }
}
