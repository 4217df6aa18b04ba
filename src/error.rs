use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown KEM id {0:#06x}")]
    UnknownKemId(u16),
    #[error("unknown KDF id {0:#06x}")]
    UnknownKdfId(u16),
    #[error("unknown AEAD id {0:#06x}")]
    UnknownAeadId(u16),
    #[error("invalid public key encoding")]
    InvalidPublicKey,
    #[error("invalid private key encoding")]
    InvalidPrivateKey,
    #[error("key does not belong to this KEM")]
    WrongKeyType,
    #[error("incorrect AEAD key size {got}, expected {want}")]
    IncorrectKeySize { got: usize, want: usize },
    #[error("PSK and PSK id are required in this mode")]
    PskInputsRequired,
    #[error("PSK and PSK id are forbidden in this mode")]
    PskInputsForbidden,
    #[error("PSK and PSK id must be provided together")]
    InconsistentPskInputs,
    #[error("KEM does not support authenticated modes")]
    AuthModeUnsupported,
    #[error("Diffie-Hellman failure")]
    DhFailure,
    #[error("AEAD authentication failed")]
    AeadOpenFailed,
    #[error("sequence number overflow")]
    SequenceOverflow,
    #[error("expand length {0} is too large")]
    ExpandLengthTooLarge(usize),
    #[error("randomness source failure: {0}")]
    RandomnessFailure(String),
    #[error("ephemeral key pairs cannot be injected into this KEM")]
    EphemeralKeyUnsupported,
    #[error("private key serialization is not supported by this KEM")]
    PrivateKeySerializationUnsupported,
    #[error("RustCrypto error {0}")]
    RustCryptoError(String),
}
