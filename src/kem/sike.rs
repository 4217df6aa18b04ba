//! SIKE-based KEM over the PQClean bindings.
//!
//! Encapsulation and decapsulation delegate to the isogeny primitive; the
//! primitive's fixed-length shared secret is stretched to the KDF output
//! size with the same labeled extract/expand as the DH path, keyed by the
//! encapsulation. Private-key serialization and ephemeral-key injection are
//! not supported for this KEM.

use bytes::Bytes;
use pqcrypto_sike::{sikep503, sikep751};
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SharedSecret as _};
use rand_core::CryptoRngCore;

use crate::error::*;
use crate::kdf::Kdf;
use crate::kem::{KemId, KemPrivateKey, KemPublicKey};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum SikeField {
    P503,
    P751,
}

#[derive(Clone)]
pub enum SikePublicKey {
    P503(sikep503::PublicKey),
    P751(sikep751::PublicKey),
}

#[derive(Clone)]
pub enum SikePrivateKey {
    // The public key rides along: decapsulation and marshaling of the
    // corresponding public half both need it.
    P503 {
        sk: sikep503::SecretKey,
        pk: sikep503::PublicKey,
    },
    P751 {
        sk: sikep751::SecretKey,
        pk: sikep751::PublicKey,
    },
}

impl SikePrivateKey {
    pub(crate) fn public_key(&self) -> SikePublicKey {
        match self {
            SikePrivateKey::P503 { pk, .. } => SikePublicKey::P503(pk.clone()),
            SikePrivateKey::P751 { pk, .. } => SikePublicKey::P751(pk.clone()),
        }
    }
}

#[derive(Clone)]
pub(crate) struct SikeKem {
    pub(crate) field: SikeField,
    pub(crate) kdf: Kdf,
}

impl SikeKem {
    pub(crate) fn new(field: SikeField, kdf: Kdf) -> Self {
        SikeKem { field, kdf }
    }

    pub(crate) fn id(&self) -> KemId {
        match self.field {
            SikeField::P503 => KemId::KEM_SIKE503,
            SikeField::P751 => KemId::KEM_SIKE751,
        }
    }

    /// The PQClean key generation draws its own operating-system randomness;
    /// the caller-supplied source is unused on this path.
    pub(crate) fn generate_key_pair(
        &self,
        _rng: &mut dyn CryptoRngCore,
    ) -> Result<(KemPrivateKey, KemPublicKey)> {
        match self.field {
            SikeField::P503 => {
                let (pk, sk) = sikep503::keypair();
                Ok((
                    KemPrivateKey::Sike(SikePrivateKey::P503 {
                        sk,
                        pk: pk.clone(),
                    }),
                    KemPublicKey::Sike(SikePublicKey::P503(pk)),
                ))
            }
            SikeField::P751 => {
                let (pk, sk) = sikep751::keypair();
                Ok((
                    KemPrivateKey::Sike(SikePrivateKey::P751 {
                        sk,
                        pk: pk.clone(),
                    }),
                    KemPublicKey::Sike(SikePublicKey::P751(pk)),
                ))
            }
        }
    }

    pub(crate) fn marshal(&self, pk: &KemPublicKey) -> Result<Bytes> {
        match (self.field, pk) {
            (SikeField::P503, KemPublicKey::Sike(SikePublicKey::P503(pk))) => {
                Ok(Bytes::copy_from_slice(pk.as_bytes()))
            }
            (SikeField::P751, KemPublicKey::Sike(SikePublicKey::P751(pk))) => {
                Ok(Bytes::copy_from_slice(pk.as_bytes()))
            }
            _ => Err(Error::WrongKeyType),
        }
    }

    pub(crate) fn unmarshal(&self, enc: &[u8]) -> Result<KemPublicKey> {
        match self.field {
            SikeField::P503 => {
                let pk = sikep503::PublicKey::from_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                Ok(KemPublicKey::Sike(SikePublicKey::P503(pk)))
            }
            SikeField::P751 => {
                let pk = sikep751::PublicKey::from_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                Ok(KemPublicKey::Sike(SikePublicKey::P751(pk)))
            }
        }
    }

    pub(crate) fn public_key_size(&self) -> usize {
        match self.field {
            SikeField::P503 => sikep503::public_key_bytes(),
            SikeField::P751 => sikep751::public_key_bytes(),
        }
    }

    fn extract_and_expand(&self, ss: &[u8], kem_context: &[u8]) -> Result<Bytes> {
        let prk = self.kdf.labeled_extract(&[], "dh", ss)?;
        self.kdf
            .labeled_expand(&prk, "prk", kem_context, self.kdf.output_size())
    }

    pub(crate) fn encap(
        &self,
        _rng: &mut dyn CryptoRngCore,
        pk_r: &KemPublicKey,
    ) -> Result<(Bytes, Bytes)> {
        match (self.field, pk_r) {
            (SikeField::P503, KemPublicKey::Sike(SikePublicKey::P503(pk))) => {
                let (ss, ct) = sikep503::encapsulate(pk);
                let enc = Bytes::copy_from_slice(ct.as_bytes());
                let shared_secret = self.extract_and_expand(ss.as_bytes(), &enc)?;
                Ok((shared_secret, enc))
            }
            (SikeField::P751, KemPublicKey::Sike(SikePublicKey::P751(pk))) => {
                let (ss, ct) = sikep751::encapsulate(pk);
                let enc = Bytes::copy_from_slice(ct.as_bytes());
                let shared_secret = self.extract_and_expand(ss.as_bytes(), &enc)?;
                Ok((shared_secret, enc))
            }
            _ => Err(Error::WrongKeyType),
        }
    }

    pub(crate) fn decap(&self, enc: &[u8], sk_r: &KemPrivateKey) -> Result<Bytes> {
        match (self.field, sk_r) {
            (SikeField::P503, KemPrivateKey::Sike(SikePrivateKey::P503 { sk, .. })) => {
                let ct = sikep503::Ciphertext::from_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                let ss = sikep503::decapsulate(&ct, sk);
                self.extract_and_expand(ss.as_bytes(), enc)
            }
            (SikeField::P751, KemPrivateKey::Sike(SikePrivateKey::P751 { sk, .. })) => {
                let ct = sikep751::Ciphertext::from_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                let ss = sikep751::decapsulate(&ct, sk);
                self.extract_and_expand(ss.as_bytes(), enc)
            }
            _ => Err(Error::WrongKeyType),
        }
    }
}
