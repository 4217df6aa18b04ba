//! [RFC9180 Sec.4.1](https://www.rfc-editor.org/rfc/rfc9180.html#section-4.1) DH-based KEM.
//!
//! Wraps a Diffie-Hellman group: the encapsulation is the serialized
//! ephemeral public key, and the DH output is stretched to the KDF output
//! size with labeled extract/expand over a context binding both public keys.

use bytes::{BufMut, Bytes, BytesMut};
use rand_core::CryptoRngCore;

use crate::error::*;
use crate::kdf::Kdf;
use crate::kem::group::DhGroup;
use crate::kem::{KemId, KemPrivateKey, KemPublicKey};

#[derive(Clone)]
pub(crate) struct DhKem {
    pub(crate) group: DhGroup,
    pub(crate) kdf: Kdf,
    ephemeral: Option<KemPrivateKey>,
}

impl DhKem {
    pub(crate) fn new(group: DhGroup, kdf: Kdf) -> Self {
        DhKem {
            group,
            kdf,
            ephemeral: None,
        }
    }

    pub(crate) fn id(&self) -> KemId {
        match self.group {
            DhGroup::P256 => KemId::DHKEM_P256,
            DhGroup::P521 => KemId::DHKEM_P521,
            DhGroup::X25519 => KemId::DHKEM_X25519,
            DhGroup::X448 => KemId::DHKEM_X448,
        }
    }

    /// Pin the ephemeral key pair used by the next encapsulation, so that
    /// test vectors can be reproduced deterministically.
    #[cfg(any(test, feature = "insecure-test-vectors"))]
    pub(crate) fn set_ephemeral_key_pair(&mut self, sk: KemPrivateKey) {
        self.ephemeral = Some(sk);
    }

    fn ephemeral_key_pair(
        &self,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(KemPrivateKey, KemPublicKey)> {
        if let Some(sk) = &self.ephemeral {
            return Ok((sk.clone(), sk.public_key()));
        }
        self.group.generate_key_pair(rng)
    }

    fn extract_and_expand(&self, dh: &[u8], kem_context: &[u8]) -> Result<Bytes> {
        let prk = self.kdf.labeled_extract(&[], "dh", dh)?;
        self.kdf
            .labeled_expand(&prk, "prk", kem_context, self.kdf.output_size())
    }

    pub(crate) fn encap(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_r: &KemPublicKey,
    ) -> Result<(Bytes, Bytes)> {
        let (sk_e, pk_e) = self.ephemeral_key_pair(rng)?;
        let dh = self.group.dh(&sk_e, pk_r)?;

        let enc = self.group.marshal(&pk_e)?;
        let pk_rm = self.group.marshal(pk_r)?;

        let mut kem_context = BytesMut::with_capacity(enc.len() + pk_rm.len());
        kem_context.put_slice(&enc);
        kem_context.put_slice(&pk_rm);

        let shared_secret = self.extract_and_expand(&dh, &kem_context)?;
        Ok((shared_secret, enc))
    }

    pub(crate) fn decap(&self, enc: &[u8], sk_r: &KemPrivateKey) -> Result<Bytes> {
        let pk_e = self.group.unmarshal(enc)?;
        let dh = self.group.dh(sk_r, &pk_e)?;

        let pk_rm = self.group.marshal(&sk_r.public_key())?;

        let mut kem_context = BytesMut::with_capacity(enc.len() + pk_rm.len());
        kem_context.put_slice(enc);
        kem_context.put_slice(&pk_rm);

        self.extract_and_expand(&dh, &kem_context)
    }

    pub(crate) fn auth_encap(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_r: &KemPublicKey,
        sk_s: &KemPrivateKey,
    ) -> Result<(Bytes, Bytes)> {
        let (sk_e, pk_e) = self.ephemeral_key_pair(rng)?;
        let dh_er = self.group.dh(&sk_e, pk_r)?;
        let dh_sr = self.group.dh(sk_s, pk_r)?;

        let mut dh = zeroize::Zeroizing::new(Vec::with_capacity(dh_er.len() + dh_sr.len()));
        dh.extend_from_slice(&dh_er);
        dh.extend_from_slice(&dh_sr);

        let enc = self.group.marshal(&pk_e)?;
        let pk_rm = self.group.marshal(pk_r)?;
        let pk_sm = self.group.marshal(&sk_s.public_key())?;

        let mut kem_context = BytesMut::with_capacity(enc.len() + pk_rm.len() + pk_sm.len());
        kem_context.put_slice(&enc);
        kem_context.put_slice(&pk_rm);
        kem_context.put_slice(&pk_sm);

        let shared_secret = self.extract_and_expand(&dh, &kem_context)?;
        Ok((shared_secret, enc))
    }

    pub(crate) fn auth_decap(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        pk_s: &KemPublicKey,
    ) -> Result<Bytes> {
        let pk_e = self.group.unmarshal(enc)?;
        let dh_er = self.group.dh(sk_r, &pk_e)?;
        let dh_sr = self.group.dh(sk_r, pk_s)?;

        let mut dh = zeroize::Zeroizing::new(Vec::with_capacity(dh_er.len() + dh_sr.len()));
        dh.extend_from_slice(&dh_er);
        dh.extend_from_slice(&dh_sr);

        let pk_rm = self.group.marshal(&sk_r.public_key())?;
        let pk_sm = self.group.marshal(pk_s)?;

        let mut kem_context = BytesMut::with_capacity(enc.len() + pk_rm.len() + pk_sm.len());
        kem_context.put_slice(enc);
        kem_context.put_slice(&pk_rm);
        kem_context.put_slice(&pk_sm);

        self.extract_and_expand(&dh, &kem_context)
    }

    pub(crate) fn public_key_size(&self) -> usize {
        self.group.public_key_size()
    }
}
