//! [RFC9180 Sec.4](https://www.rfc-editor.org/rfc/rfc9180.html#section-4) HKDF schemes used by
//! the key schedule and the DH-based KEMs.


use bytes::{BufMut, Bytes, BytesMut};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};
use sha3::Sha3_256;

use crate::error::*;

/// Label prefix prepended by [`Kdf::labeled_extract`] and [`Kdf::labeled_expand`], joined to
/// each label with a single ASCII space. Fixed by the draft revision this library implements;
/// changing a single byte breaks interoperability.
pub(crate) const RFC_LABEL: &str = "RFCXXXX";

/// Registered KDF identifiers.
#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum KdfId {
    #[default]
    HKDF_SHA256 = 0x0001,
    HKDF_SHA384 = 0x0002,
    HKDF_SHA512 = 0x0003,
    HKDF_SHA3_256 = 0x0004,
}

impl TryFrom<u16> for KdfId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0001 => Ok(KdfId::HKDF_SHA256),
            0x0002 => Ok(KdfId::HKDF_SHA384),
            0x0003 => Ok(KdfId::HKDF_SHA512),
            0x0004 => Ok(KdfId::HKDF_SHA3_256),
            _ => Err(Error::UnknownKdfId(v)),
        }
    }
}

/// An HKDF instantiation over a fixed hash.
#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kdf {
    #[default]
    HKDF_SHA256,
    HKDF_SHA384,
    HKDF_SHA512,
    HKDF_SHA3_256,
}

impl Kdf {
    pub fn new(id: KdfId) -> Self {
        match id {
            KdfId::HKDF_SHA256 => Kdf::HKDF_SHA256,
            KdfId::HKDF_SHA384 => Kdf::HKDF_SHA384,
            KdfId::HKDF_SHA512 => Kdf::HKDF_SHA512,
            KdfId::HKDF_SHA3_256 => Kdf::HKDF_SHA3_256,
        }
    }

    pub fn id(&self) -> KdfId {
        match self {
            Kdf::HKDF_SHA256 => KdfId::HKDF_SHA256,
            Kdf::HKDF_SHA384 => KdfId::HKDF_SHA384,
            Kdf::HKDF_SHA512 => KdfId::HKDF_SHA512,
            Kdf::HKDF_SHA3_256 => KdfId::HKDF_SHA3_256,
        }
    }

    /// The output size of the underlying hash in bytes (Nh).
    pub fn output_size(&self) -> usize {
        match self {
            Kdf::HKDF_SHA256 | Kdf::HKDF_SHA3_256 => 32,
            Kdf::HKDF_SHA384 => 48,
            Kdf::HKDF_SHA512 => 64,
        }
    }

    pub fn hash(&self, message: &[u8]) -> Bytes {
        match self {
            Kdf::HKDF_SHA256 => {
                let mut h = Sha256::new();
                h.update(message);
                Bytes::from(h.finalize().to_vec())
            }
            Kdf::HKDF_SHA384 => {
                let mut h = Sha384::new();
                h.update(message);
                Bytes::from(h.finalize().to_vec())
            }
            Kdf::HKDF_SHA512 => {
                let mut h = Sha512::new();
                h.update(message);
                Bytes::from(h.finalize().to_vec())
            }
            Kdf::HKDF_SHA3_256 => {
                let mut h = Sha3_256::new();
                h.update(message);
                Bytes::from(h.finalize().to_vec())
            }
        }
    }

    /// HKDF-Extract. An empty salt is replaced by Nh zero bytes.
    pub fn extract(&self, salt: &[u8], ikm: &[u8]) -> Result<Bytes> {
        let zero_salt;
        let salt = if salt.is_empty() {
            zero_salt = vec![0u8; self.output_size()];
            &zero_salt
        } else {
            salt
        };

        match self {
            Kdf::HKDF_SHA256 => {
                let mut m = Hmac::<Sha256>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
            Kdf::HKDF_SHA384 => {
                let mut m = Hmac::<Sha384>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
            Kdf::HKDF_SHA512 => {
                let mut m = Hmac::<Sha512>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
            Kdf::HKDF_SHA3_256 => {
                let mut m = Hmac::<Sha3_256>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
        }
    }

    /// HKDF-Expand of `prk` into `out_len` bytes of output keying material.
    pub fn expand(&self, prk: &[u8], info: &[u8], out_len: usize) -> Result<Bytes> {
        let mut out = vec![0u8; out_len];

        match self {
            Kdf::HKDF_SHA256 => {
                let hkdf = Hkdf::<Sha256>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|_| Error::ExpandLengthTooLarge(out_len))?;
            }
            Kdf::HKDF_SHA384 => {
                let hkdf = Hkdf::<Sha384>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|_| Error::ExpandLengthTooLarge(out_len))?;
            }
            Kdf::HKDF_SHA512 => {
                let hkdf = Hkdf::<Sha512>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|_| Error::ExpandLengthTooLarge(out_len))?;
            }
            Kdf::HKDF_SHA3_256 => {
                let hkdf = Hkdf::<Sha3_256>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|_| Error::ExpandLengthTooLarge(out_len))?;
            }
        }

        Ok(Bytes::from(out))
    }

    /// Extract with the label prefixed to the input keying material.
    pub fn labeled_extract(&self, salt: &[u8], label: &str, ikm: &[u8]) -> Result<Bytes> {
        let mut labeled_ikm =
            BytesMut::with_capacity(RFC_LABEL.len() + 1 + label.len() + ikm.len());
        labeled_ikm.put_slice(RFC_LABEL.as_bytes());
        labeled_ikm.put_u8(b' ');
        labeled_ikm.put_slice(label.as_bytes());
        labeled_ikm.put_slice(ikm);
        self.extract(salt, &labeled_ikm)
    }

    /// Expand with the output length and label prefixed to the info string.
    pub fn labeled_expand(
        &self,
        prk: &[u8],
        label: &str,
        info: &[u8],
        out_len: usize,
    ) -> Result<Bytes> {
        if out_len > 0xffff {
            return Err(Error::ExpandLengthTooLarge(out_len));
        }

        let mut labeled_info =
            BytesMut::with_capacity(2 + RFC_LABEL.len() + 1 + label.len() + info.len());
        labeled_info.put_u16(out_len as u16);
        labeled_info.put_slice(RFC_LABEL.as_bytes());
        labeled_info.put_u8(b' ');
        labeled_info.put_slice(label.as_bytes());
        labeled_info.put_slice(info);
        self.expand(prk, &labeled_info, out_len)
    }
}
