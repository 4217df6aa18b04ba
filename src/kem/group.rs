//! Diffie-Hellman groups backing the DH-KEMs.
//!
//! The DH output for the NIST curves is the full uncompressed encoding of the
//! scalar-multiplied point (65 bytes for P-256, 133 for P-521); for X25519
//! and X448 it is the canonical 32/56-byte shared secret.

use bytes::Bytes;
use elliptic_curve::group::Group as _;
use elliptic_curve::sec1::ToEncodedPoint;
use rand_core::{CryptoRng, CryptoRngCore, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::error::*;
use crate::kem::{KemPrivateKey, KemPublicKey};

// `p256`/`p521`'s `SecretKey::random` takes `impl CryptoRngCore`, which
// carries an implicit `Sized` bound and so can't be instantiated directly
// with the `dyn CryptoRngCore` trait object this module receives. Wrap it in
// a sized forwarder to satisfy that bound.
struct SizedRng<'a>(&'a mut dyn CryptoRngCore);

impl RngCore for SizedRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SizedRng<'_> {}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum DhGroup {
    P256,
    P521,
    X25519,
    X448,
}

impl DhGroup {
    pub(crate) fn generate_key_pair(
        &self,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(KemPrivateKey, KemPublicKey)> {
        match self {
            DhGroup::P256 => {
                let sk = p256::SecretKey::random(&mut SizedRng(rng));
                let pk = sk.public_key();
                Ok((KemPrivateKey::P256(sk), KemPublicKey::P256(pk)))
            }
            DhGroup::P521 => {
                let sk = p521::SecretKey::random(&mut SizedRng(rng));
                let pk = sk.public_key();
                Ok((KemPrivateKey::P521(sk), KemPublicKey::P521(pk)))
            }
            DhGroup::X25519 => {
                let mut raw = [0u8; 32];
                rng.try_fill_bytes(&mut raw)
                    .map_err(|err| Error::RandomnessFailure(err.to_string()))?;
                let sk = x25519_dalek::StaticSecret::from(raw);
                raw.zeroize();
                let pk = x25519_dalek::PublicKey::from(&sk);
                Ok((KemPrivateKey::X25519(sk), KemPublicKey::X25519(pk)))
            }
            DhGroup::X448 => {
                let mut raw = [0u8; 56];
                rng.try_fill_bytes(&mut raw)
                    .map_err(|err| Error::RandomnessFailure(err.to_string()))?;
                let sk = x448::Secret::from_bytes(&raw).ok_or(Error::InvalidPrivateKey)?;
                raw.zeroize();
                let pk = x448::PublicKey::from(&sk);
                Ok((KemPrivateKey::X448(sk), KemPublicKey::X448(pk)))
            }
        }
    }

    pub(crate) fn marshal(&self, pk: &KemPublicKey) -> Result<Bytes> {
        match (self, pk) {
            (DhGroup::P256, KemPublicKey::P256(pk)) => Ok(Bytes::copy_from_slice(
                pk.to_encoded_point(false).as_bytes(),
            )),
            (DhGroup::P521, KemPublicKey::P521(pk)) => Ok(Bytes::copy_from_slice(
                pk.to_encoded_point(false).as_bytes(),
            )),
            (DhGroup::X25519, KemPublicKey::X25519(pk)) => {
                Ok(Bytes::copy_from_slice(pk.as_bytes()))
            }
            (DhGroup::X448, KemPublicKey::X448(pk)) => Ok(Bytes::copy_from_slice(pk.as_bytes())),
            _ => Err(Error::WrongKeyType),
        }
    }

    pub(crate) fn unmarshal(&self, enc: &[u8]) -> Result<KemPublicKey> {
        // Only the fixed-size uncompressed wire form is accepted.
        if enc.len() != self.public_key_size() {
            return Err(Error::InvalidPublicKey);
        }

        match self {
            DhGroup::P256 => {
                let pk = p256::PublicKey::from_sec1_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                Ok(KemPublicKey::P256(pk))
            }
            DhGroup::P521 => {
                let pk = p521::PublicKey::from_sec1_bytes(enc)
                    .map_err(|_| Error::InvalidPublicKey)?;
                Ok(KemPublicKey::P521(pk))
            }
            DhGroup::X25519 => {
                let raw: [u8; 32] = enc.try_into().map_err(|_| Error::InvalidPublicKey)?;
                Ok(KemPublicKey::X25519(x25519_dalek::PublicKey::from(raw)))
            }
            DhGroup::X448 => {
                let pk = x448::PublicKey::from_bytes(enc).ok_or(Error::InvalidPublicKey)?;
                Ok(KemPublicKey::X448(pk))
            }
        }
    }

    pub(crate) fn marshal_private(&self, sk: &KemPrivateKey) -> Result<Bytes> {
        match (self, sk) {
            (DhGroup::P256, KemPrivateKey::P256(sk)) => {
                Ok(Bytes::copy_from_slice(sk.to_bytes().as_slice()))
            }
            (DhGroup::P521, KemPrivateKey::P521(sk)) => {
                Ok(Bytes::copy_from_slice(sk.to_bytes().as_slice()))
            }
            (DhGroup::X25519, KemPrivateKey::X25519(sk)) => {
                Ok(Bytes::copy_from_slice(sk.as_bytes()))
            }
            (DhGroup::X448, KemPrivateKey::X448(sk)) => Ok(Bytes::copy_from_slice(sk.as_bytes())),
            _ => Err(Error::WrongKeyType),
        }
    }

    pub(crate) fn unmarshal_private(&self, enc: &[u8]) -> Result<KemPrivateKey> {
        match self {
            DhGroup::P256 => {
                let sk = p256::SecretKey::from_slice(enc).map_err(|_| Error::InvalidPrivateKey)?;
                Ok(KemPrivateKey::P256(sk))
            }
            DhGroup::P521 => {
                let sk = p521::SecretKey::from_slice(enc).map_err(|_| Error::InvalidPrivateKey)?;
                Ok(KemPrivateKey::P521(sk))
            }
            DhGroup::X25519 => {
                let raw: [u8; 32] = enc.try_into().map_err(|_| Error::InvalidPrivateKey)?;
                Ok(KemPrivateKey::X25519(x25519_dalek::StaticSecret::from(raw)))
            }
            DhGroup::X448 => {
                let sk = x448::Secret::from_bytes(enc).ok_or(Error::InvalidPrivateKey)?;
                Ok(KemPrivateKey::X448(sk))
            }
        }
    }

    /// The Diffie-Hellman operation between `sk` and `pk`.
    pub(crate) fn dh(&self, sk: &KemPrivateKey, pk: &KemPublicKey) -> Result<Zeroizing<Vec<u8>>> {
        match (self, sk, pk) {
            (DhGroup::P256, KemPrivateKey::P256(sk), KemPublicKey::P256(pk)) => {
                let point = p256::ProjectivePoint::from(*pk.as_affine()) * *sk.to_nonzero_scalar();
                if bool::from(point.is_identity()) {
                    return Err(Error::DhFailure);
                }
                Ok(Zeroizing::new(
                    point.to_affine().to_encoded_point(false).as_bytes().to_vec(),
                ))
            }
            (DhGroup::P521, KemPrivateKey::P521(sk), KemPublicKey::P521(pk)) => {
                let point = p521::ProjectivePoint::from(*pk.as_affine()) * *sk.to_nonzero_scalar();
                if bool::from(point.is_identity()) {
                    return Err(Error::DhFailure);
                }
                Ok(Zeroizing::new(
                    point.to_affine().to_encoded_point(false).as_bytes().to_vec(),
                ))
            }
            (DhGroup::X25519, KemPrivateKey::X25519(sk), KemPublicKey::X25519(pk)) => {
                let shared = sk.diffie_hellman(pk);
                Ok(Zeroizing::new(shared.as_bytes().to_vec()))
            }
            (DhGroup::X448, KemPrivateKey::X448(sk), KemPublicKey::X448(pk)) => {
                let shared = sk.as_diffie_hellman(pk).ok_or(Error::DhFailure)?;
                Ok(Zeroizing::new(shared.as_bytes().to_vec()))
            }
            _ => Err(Error::WrongKeyType),
        }
    }

    pub(crate) fn public_key_size(&self) -> usize {
        match self {
            DhGroup::P256 => 65,
            DhGroup::P521 => 133,
            DhGroup::X25519 => 32,
            DhGroup::X448 => 56,
        }
    }
}
