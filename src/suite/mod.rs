//! [RFC9180 Sec.7](https://www.rfc-editor.org/rfc/rfc9180.html#section-7) Cipher suite assembly.

#[cfg(test)]
mod suite_test;

use crate::aead::{Aead, AeadId};
use crate::error::*;
use crate::kdf::{Kdf, KdfId};
use crate::kem::{KemId, KemScheme};

/// An HPKE cipher suite consisting of a KEM, KDF, and AEAD algorithm.
#[derive(Clone)]
pub struct CipherSuite {
    pub kem: KemScheme,
    pub kdf: Kdf,
    pub aead: Aead,
}

impl CipherSuite {
    pub fn new(kem: KemId, kdf: KdfId, aead: AeadId) -> Self {
        CipherSuite {
            kem: KemScheme::new(kem),
            kdf: Kdf::new(kdf),
            aead: Aead::new(aead),
        }
    }

    /// Look each identifier up in its registry and assemble a cipher suite.
    /// Fails with a distinct error for whichever identifier is unknown.
    pub fn assemble(kem_id: u16, kdf_id: u16, aead_id: u16) -> Result<CipherSuite> {
        let kem = KemId::try_from(kem_id)?;
        let kdf = KdfId::try_from(kdf_id)?;
        let aead = AeadId::try_from(aead_id)?;
        Ok(CipherSuite::new(kem, kdf, aead))
    }
}
