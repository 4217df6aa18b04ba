use super::*;

#[test]
fn test_assemble_known_suites() -> Result<()> {
    let suite = CipherSuite::assemble(0x0020, 0x0001, 0x0001)?;
    assert_eq!(suite.kem.id(), KemId::DHKEM_X25519);
    assert_eq!(suite.kdf.id(), KdfId::HKDF_SHA256);
    assert_eq!(suite.aead.id(), AeadId::AES128GCM);

    let suite = CipherSuite::assemble(0xffff, 0x0004, 0x0003)?;
    assert_eq!(suite.kem.id(), KemId::KEM_SIKE751);
    assert_eq!(suite.kdf.id(), KdfId::HKDF_SHA3_256);
    assert_eq!(suite.aead.id(), AeadId::ChaCha20Poly1305);

    Ok(())
}

// A distinct error per unknown identifier.
#[test]
fn test_assemble_unknown_ids() {
    assert!(matches!(
        CipherSuite::assemble(0x0000, 0x0001, 0x0001),
        Err(Error::UnknownKemId(0x0000))
    ));
    assert!(matches!(
        CipherSuite::assemble(0x0020, 0x0000, 0x0001),
        Err(Error::UnknownKdfId(0x0000))
    ));
    assert!(matches!(
        CipherSuite::assemble(0x0020, 0x0001, 0x0000),
        Err(Error::UnknownAeadId(0x0000))
    ));
}
