//! [RFC9180 Sec.4.1](https://www.rfc-editor.org/rfc/rfc9180.html#section-4.1) Key encapsulation
//! mechanisms.
//!
//! Two tiers are registered: DH-based KEMs over P-256, P-521, X25519, and
//! X448, which also provide the authenticated encapsulation used by the Auth
//! modes, and the SIKE KEMs, which do not.


pub(crate) mod dhkem;
pub(crate) mod group;
pub(crate) mod sike;

use bytes::Bytes;
use rand_core::CryptoRngCore;

use crate::error::*;
use crate::kdf::Kdf;

use self::dhkem::DhKem;
use self::group::DhGroup;
use self::sike::{SikeField, SikeKem, SikePrivateKey, SikePublicKey};

/// Registered KEM identifiers.
#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum KemId {
    DHKEM_P256 = 0x0010,
    DHKEM_P521 = 0x0012,
    #[default]
    DHKEM_X25519 = 0x0020,
    DHKEM_X448 = 0x0021,
    KEM_SIKE503 = 0xfffe,
    KEM_SIKE751 = 0xffff,
}

impl TryFrom<u16> for KemId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0010 => Ok(KemId::DHKEM_P256),
            0x0012 => Ok(KemId::DHKEM_P521),
            0x0020 => Ok(KemId::DHKEM_X25519),
            0x0021 => Ok(KemId::DHKEM_X448),
            0xfffe => Ok(KemId::KEM_SIKE503),
            0xffff => Ok(KemId::KEM_SIKE751),
            _ => Err(Error::UnknownKemId(v)),
        }
    }
}

/// A KEM public key. The variant must match the suite's KEM.
pub enum KemPublicKey {
    P256(p256::PublicKey),
    P521(p521::PublicKey),
    X25519(x25519_dalek::PublicKey),
    X448(x448::PublicKey),
    Sike(SikePublicKey),
}

// `x448::PublicKey` does not implement `Clone`, so the derive can't be used
// here; reconstruct that variant from its byte encoding instead.
impl Clone for KemPublicKey {
    fn clone(&self) -> Self {
        match self {
            KemPublicKey::P256(pk) => KemPublicKey::P256(pk.clone()),
            KemPublicKey::P521(pk) => KemPublicKey::P521(pk.clone()),
            KemPublicKey::X25519(pk) => KemPublicKey::X25519(*pk),
            KemPublicKey::X448(pk) => {
                KemPublicKey::X448(x448::PublicKey::from_bytes(pk.as_bytes()).unwrap())
            }
            KemPublicKey::Sike(pk) => KemPublicKey::Sike(pk.clone()),
        }
    }
}

/// A KEM private key. The variant must match the suite's KEM.
pub enum KemPrivateKey {
    P256(p256::SecretKey),
    P521(p521::SecretKey),
    X25519(x25519_dalek::StaticSecret),
    X448(x448::Secret),
    Sike(SikePrivateKey),
}

// `x448::Secret` does not implement `Clone`, so the derive can't be used
// here; reconstruct that variant from its byte encoding instead.
impl Clone for KemPrivateKey {
    fn clone(&self) -> Self {
        match self {
            KemPrivateKey::P256(sk) => KemPrivateKey::P256(sk.clone()),
            KemPrivateKey::P521(sk) => KemPrivateKey::P521(sk.clone()),
            KemPrivateKey::X25519(sk) => KemPrivateKey::X25519(sk.clone()),
            KemPrivateKey::X448(sk) => {
                KemPrivateKey::X448(x448::Secret::from_bytes(sk.as_bytes()).unwrap())
            }
            KemPrivateKey::Sike(sk) => KemPrivateKey::Sike(sk.clone()),
        }
    }
}

impl KemPrivateKey {
    /// The public half of this key pair.
    pub fn public_key(&self) -> KemPublicKey {
        match self {
            KemPrivateKey::P256(sk) => KemPublicKey::P256(sk.public_key()),
            KemPrivateKey::P521(sk) => KemPublicKey::P521(sk.public_key()),
            KemPrivateKey::X25519(sk) => KemPublicKey::X25519(x25519_dalek::PublicKey::from(sk)),
            KemPrivateKey::X448(sk) => KemPublicKey::X448(x448::PublicKey::from(sk)),
            KemPrivateKey::Sike(sk) => KemPublicKey::Sike(sk.public_key()),
        }
    }
}

/// A registered KEM instantiation.
#[derive(Clone)]
pub enum KemScheme {
    Dh(DhKem),
    Sike(SikeKem),
}

impl KemScheme {
    pub fn new(id: KemId) -> Self {
        match id {
            KemId::DHKEM_P256 => KemScheme::Dh(DhKem::new(DhGroup::P256, Kdf::HKDF_SHA256)),
            KemId::DHKEM_P521 => KemScheme::Dh(DhKem::new(DhGroup::P521, Kdf::HKDF_SHA512)),
            KemId::DHKEM_X25519 => KemScheme::Dh(DhKem::new(DhGroup::X25519, Kdf::HKDF_SHA256)),
            KemId::DHKEM_X448 => KemScheme::Dh(DhKem::new(DhGroup::X448, Kdf::HKDF_SHA512)),
            KemId::KEM_SIKE503 => KemScheme::Sike(SikeKem::new(SikeField::P503, Kdf::HKDF_SHA512)),
            KemId::KEM_SIKE751 => KemScheme::Sike(SikeKem::new(SikeField::P751, Kdf::HKDF_SHA512)),
        }
    }

    pub fn id(&self) -> KemId {
        match self {
            KemScheme::Dh(kem) => kem.id(),
            KemScheme::Sike(kem) => kem.id(),
        }
    }

    pub fn generate_key_pair(
        &self,
        rng: &mut dyn CryptoRngCore,
    ) -> Result<(KemPrivateKey, KemPublicKey)> {
        match self {
            KemScheme::Dh(kem) => kem.group.generate_key_pair(rng),
            KemScheme::Sike(kem) => kem.generate_key_pair(rng),
        }
    }

    /// Serialize a public key into its wire form.
    pub fn marshal(&self, pk: &KemPublicKey) -> Result<Bytes> {
        match self {
            KemScheme::Dh(kem) => kem.group.marshal(pk),
            KemScheme::Sike(kem) => kem.marshal(pk),
        }
    }

    /// Parse a public key from its wire form. Fails on a wrong length or a
    /// point not on the curve.
    pub fn unmarshal(&self, enc: &[u8]) -> Result<KemPublicKey> {
        match self {
            KemScheme::Dh(kem) => kem.group.unmarshal(enc),
            KemScheme::Sike(kem) => kem.unmarshal(enc),
        }
    }

    pub fn marshal_private(&self, sk: &KemPrivateKey) -> Result<Bytes> {
        match self {
            KemScheme::Dh(kem) => kem.group.marshal_private(sk),
            KemScheme::Sike(_) => Err(Error::PrivateKeySerializationUnsupported),
        }
    }

    pub fn unmarshal_private(&self, enc: &[u8]) -> Result<KemPrivateKey> {
        match self {
            KemScheme::Dh(kem) => kem.group.unmarshal_private(enc),
            KemScheme::Sike(_) => Err(Error::PrivateKeySerializationUnsupported),
        }
    }

    /// The wire size of public keys for this KEM.
    pub fn public_key_size(&self) -> usize {
        match self {
            KemScheme::Dh(kem) => kem.public_key_size(),
            KemScheme::Sike(kem) => kem.public_key_size(),
        }
    }

    /// Generate a shared secret and its encapsulation for the receiver's
    /// public key. The shared secret has the KDF's output size.
    pub fn encap(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_r: &KemPublicKey,
    ) -> Result<(Bytes, Bytes)> {
        match self {
            KemScheme::Dh(kem) => kem.encap(rng, pk_r),
            KemScheme::Sike(kem) => kem.encap(rng, pk_r),
        }
    }

    /// Recover the shared secret from an encapsulation.
    pub fn decap(&self, enc: &[u8], sk_r: &KemPrivateKey) -> Result<Bytes> {
        match self {
            KemScheme::Dh(kem) => kem.decap(enc, sk_r),
            KemScheme::Sike(kem) => kem.decap(enc, sk_r),
        }
    }

    /// Whether this KEM provides the authenticated tier required by the Auth
    /// and AuthPSK modes.
    pub fn supports_auth(&self) -> bool {
        matches!(self, KemScheme::Dh(_))
    }

    pub fn auth_encap(
        &self,
        rng: &mut dyn CryptoRngCore,
        pk_r: &KemPublicKey,
        sk_s: &KemPrivateKey,
    ) -> Result<(Bytes, Bytes)> {
        match self {
            KemScheme::Dh(kem) => kem.auth_encap(rng, pk_r, sk_s),
            KemScheme::Sike(_) => Err(Error::AuthModeUnsupported),
        }
    }

    pub fn auth_decap(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        pk_s: &KemPublicKey,
    ) -> Result<Bytes> {
        match self {
            KemScheme::Dh(kem) => kem.auth_decap(enc, sk_r, pk_s),
            KemScheme::Sike(_) => Err(Error::AuthModeUnsupported),
        }
    }

    /// Pin the ephemeral key pair used by the next encapsulation. SIKE
    /// refuses injection; its encapsulation randomness is internal to the
    /// primitive.
    #[cfg(any(test, feature = "insecure-test-vectors"))]
    pub fn set_ephemeral_key_pair(&mut self, sk: KemPrivateKey) -> Result<()> {
        match self {
            KemScheme::Dh(kem) => {
                kem.set_ephemeral_key_pair(sk);
                Ok(())
            }
            KemScheme::Sike(_) => Err(Error::EphemeralKeyUnsupported),
        }
    }
}
