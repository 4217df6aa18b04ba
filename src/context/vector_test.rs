use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use super::*;
use crate::aead::AeadId;
use crate::kdf::KdfId;
use crate::kem::KemId;

const OUTPUT_ENV_KEY: &str = "HPKE_TEST_VECTORS_OUT";
const INPUT_ENV_KEY: &str = "HPKE_TEST_VECTORS_IN";
const VECTOR_ENCRYPTION_COUNT: usize = 10;
const VECTOR_EXPORT_COUNT: usize = 5;
const VECTOR_EXPORT_LENGTH: usize = 32;

const INFO: &[u8] = b"Ode on a Grecian Urn";
const ORIGINAL: &[u8] = b"Beauty is truth, truth beauty";
const FIXED_PSK: &[u8] = &[
    0x5d, 0xb3, 0xb8, 0x0a, 0x81, 0xcb, 0x63, 0xca, 0x59, 0x47, 0x0c, 0x83, 0x41, 0x4e, 0xf7,
    0x0a,
];
const FIXED_PSK_ID: &[u8] = b"Ennyn Durin aran Moria";

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
struct EncryptionVector {
    #[serde(with = "hex")]
    plaintext: Vec<u8>,
    #[serde(with = "hex")]
    aad: Vec<u8>,
    #[serde(with = "hex")]
    nonce: Vec<u8>,
    #[serde(with = "hex")]
    ciphertext: Vec<u8>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
struct ExportVector {
    #[serde(with = "hex")]
    export_context: Vec<u8>,
    export_length: usize,
    #[serde(with = "hex")]
    export_value: Vec<u8>,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
struct TestVector {
    // Parameters
    mode: u8,
    kem_id: u16,
    kdf_id: u16,
    aead_id: u16,
    #[serde(with = "hex")]
    info: Vec<u8>,

    // Private keys
    #[serde(with = "hex")]
    sk_r: Vec<u8>,
    #[serde(with = "hex")]
    sk_s: Vec<u8>,
    #[serde(with = "hex")]
    sk_e: Vec<u8>,
    #[serde(with = "hex")]
    psk: Vec<u8>,
    #[serde(with = "hex")]
    psk_id: Vec<u8>,

    // Public keys
    #[serde(with = "hex")]
    pk_r: Vec<u8>,
    #[serde(with = "hex")]
    pk_s: Vec<u8>,
    #[serde(with = "hex")]
    pk_e: Vec<u8>,

    // Key schedule inputs and computations
    #[serde(with = "hex")]
    enc: Vec<u8>,
    #[serde(with = "hex")]
    shared_secret: Vec<u8>,
    #[serde(with = "hex")]
    key_schedule_context: Vec<u8>,
    #[serde(with = "hex")]
    secret: Vec<u8>,
    #[serde(with = "hex")]
    key: Vec<u8>,
    #[serde(with = "hex")]
    base_nonce: Vec<u8>,
    #[serde(with = "hex")]
    exporter_secret: Vec<u8>,

    encryptions: Vec<EncryptionVector>,
    exports: Vec<ExportVector>,
}

fn load_test_vectors<P: AsRef<Path>>(path: P) -> Vec<TestVector> {
    let file = File::open(path).expect("failed opening test vectors");
    serde_json::from_reader(BufReader::new(file)).expect("failed decoding test vectors")
}

fn mode_from_u8(v: u8) -> Mode {
    match v {
        0x00 => Mode::Base,
        0x01 => Mode::Psk,
        0x02 => Mode::Auth,
        0x03 => Mode::AuthPsk,
        _ => panic!("unknown mode {v:#04x}"),
    }
}

fn setup_sender_for(
    suite: &CipherSuite,
    mode: Mode,
    pk_r: &KemPublicKey,
    sk_s: Option<&KemPrivateKey>,
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<(Bytes, SenderContext)> {
    match mode {
        Mode::Base => setup_base_s(suite, &mut OsRng, pk_r, info),
        Mode::Psk => setup_psk_s(suite, &mut OsRng, pk_r, psk, psk_id, info),
        Mode::Auth => setup_auth_s(suite, &mut OsRng, pk_r, sk_s.expect("sender key"), info),
        Mode::AuthPsk => setup_auth_psk_s(
            suite,
            &mut OsRng,
            pk_r,
            sk_s.expect("sender key"),
            psk,
            psk_id,
            info,
        ),
    }
}

fn setup_receiver_for(
    suite: &CipherSuite,
    mode: Mode,
    sk_r: &KemPrivateKey,
    pk_s: Option<&KemPublicKey>,
    enc: &[u8],
    psk: &[u8],
    psk_id: &[u8],
    info: &[u8],
) -> Result<ReceiverContext> {
    match mode {
        Mode::Base => setup_base_r(suite, sk_r, enc, info),
        Mode::Psk => setup_psk_r(suite, sk_r, enc, psk, psk_id, info),
        Mode::Auth => setup_auth_r(suite, sk_r, pk_s.expect("sender key"), enc, info),
        Mode::AuthPsk => setup_auth_psk_r(
            suite,
            sk_r,
            pk_s.expect("sender key"),
            enc,
            psk,
            psk_id,
            info,
        ),
    }
}

fn generate_test_vector(mode: Mode, kem_id: KemId, kdf_id: KdfId, aead_id: AeadId) -> TestVector {
    let mut suite = CipherSuite::assemble(kem_id as u16, kdf_id as u16, aead_id as u16)
        .expect("error looking up ciphersuite");

    let (sk_r, pk_r) = suite.kem.generate_key_pair(&mut OsRng).expect("keygen");
    let (sk_e, pk_e) = suite.kem.generate_key_pair(&mut OsRng).expect("keygen");

    // The sender key share is only required for the Auth mode variants.
    let auth_mode = matches!(mode, Mode::Auth | Mode::AuthPsk);
    let sender_pair = if auth_mode {
        Some(suite.kem.generate_key_pair(&mut OsRng).expect("keygen"))
    } else {
        None
    };

    // A PSK is only required for the PSK mode variants.
    let (psk, psk_id): (&[u8], &[u8]) = if matches!(mode, Mode::Psk | Mode::AuthPsk) {
        (FIXED_PSK, FIXED_PSK_ID)
    } else {
        (&[], &[])
    };

    suite
        .kem
        .set_ephemeral_key_pair(sk_e.clone())
        .expect("ephemeral injection");

    let sk_s = sender_pair.as_ref().map(|(sk, _)| sk);
    let pk_s = sender_pair.as_ref().map(|(_, pk)| pk);

    let (enc, mut ctx_s) =
        setup_sender_for(&suite, mode, &pk_r, sk_s, psk, psk_id, INFO).expect("setup sender");
    let mut ctx_r = setup_receiver_for(&suite, mode, &sk_r, pk_s, &enc, psk, psk_id, INFO)
        .expect("setup receiver");

    let mut encryptions = Vec::with_capacity(VECTOR_ENCRYPTION_COUNT);
    for i in 0..VECTOR_ENCRYPTION_COUNT {
        let aad = format!("Count-{i}");
        let nonce = ctx_s.context.compute_nonce(i as u64);
        let encrypted = ctx_s.seal(aad.as_bytes(), ORIGINAL).expect("seal");
        let decrypted = ctx_r.open(aad.as_bytes(), &encrypted).expect("open");
        assert_eq!(decrypted.as_ref(), ORIGINAL, "incorrect decryption");

        encryptions.push(EncryptionVector {
            plaintext: ORIGINAL.to_vec(),
            aad: aad.into_bytes(),
            nonce,
            ciphertext: encrypted.to_vec(),
        });
    }

    let mut exports = Vec::with_capacity(VECTOR_EXPORT_COUNT);
    for i in 0..VECTOR_EXPORT_COUNT {
        let export_context = format!("Context-{i}").into_bytes();
        let export_s = ctx_s
            .export(&export_context, VECTOR_EXPORT_LENGTH)
            .expect("export");
        let export_r = ctx_r
            .export(&export_context, VECTOR_EXPORT_LENGTH)
            .expect("export");
        assert_eq!(export_s, export_r, "incorrect export");

        exports.push(ExportVector {
            export_context,
            export_length: VECTOR_EXPORT_LENGTH,
            export_value: export_s.to_vec(),
        });
    }

    TestVector {
        mode: mode as u8,
        kem_id: kem_id as u16,
        kdf_id: kdf_id as u16,
        aead_id: aead_id as u16,
        info: INFO.to_vec(),
        sk_r: suite.kem.marshal_private(&sk_r).expect("marshal").to_vec(),
        sk_s: sk_s
            .map(|sk| suite.kem.marshal_private(sk).expect("marshal").to_vec())
            .unwrap_or_default(),
        sk_e: suite.kem.marshal_private(&sk_e).expect("marshal").to_vec(),
        psk: psk.to_vec(),
        psk_id: psk_id.to_vec(),
        pk_r: suite.kem.marshal(&pk_r).expect("marshal").to_vec(),
        pk_s: pk_s
            .map(|pk| suite.kem.marshal(pk).expect("marshal").to_vec())
            .unwrap_or_default(),
        pk_e: suite.kem.marshal(&pk_e).expect("marshal").to_vec(),
        enc: enc.to_vec(),
        shared_secret: ctx_s.context.setup_params.shared_secret.clone(),
        key_schedule_context: ctx_s.context.context_params.key_schedule_context.clone(),
        secret: ctx_s.context.context_params.secret.clone(),
        key: ctx_s.context.key.clone(),
        base_nonce: ctx_s.context.base_nonce.clone(),
        exporter_secret: ctx_s.context.exporter_secret.clone(),
        encryptions,
        exports,
    }
}

fn verify_test_vector(tv: &TestVector) {
    let mode = mode_from_u8(tv.mode);
    let mut suite = CipherSuite::assemble(tv.kem_id, tv.kdf_id, tv.aead_id)
        .expect("error looking up ciphersuite");

    let sk_r = suite.kem.unmarshal_private(&tv.sk_r).expect("sk_r");
    let sk_e = suite.kem.unmarshal_private(&tv.sk_e).expect("sk_e");
    let pk_r = suite.kem.unmarshal(&tv.pk_r).expect("pk_r");
    let pk_e = suite.kem.unmarshal(&tv.pk_e).expect("pk_e");

    // The serialized private keys must reproduce the recorded public keys.
    assert_eq!(
        suite.kem.marshal(&sk_r.public_key()).expect("marshal"),
        suite.kem.marshal(&pk_r).expect("marshal")
    );
    assert_eq!(
        suite.kem.marshal(&sk_e.public_key()).expect("marshal"),
        suite.kem.marshal(&pk_e).expect("marshal")
    );

    let auth_mode = matches!(mode, Mode::Auth | Mode::AuthPsk);
    let sk_s = auth_mode.then(|| suite.kem.unmarshal_private(&tv.sk_s).expect("sk_s"));
    let pk_s = auth_mode.then(|| suite.kem.unmarshal(&tv.pk_s).expect("pk_s"));

    suite
        .kem
        .set_ephemeral_key_pair(sk_e)
        .expect("ephemeral injection");

    let (enc, mut ctx_s) = setup_sender_for(
        &suite,
        mode,
        &pk_r,
        sk_s.as_ref(),
        &tv.psk,
        &tv.psk_id,
        &tv.info,
    )
    .expect("setup sender");
    assert_eq!(enc.as_ref(), &tv.enc[..], "encapsulated key mismatch");

    let mut ctx_r = setup_receiver_for(
        &suite,
        mode,
        &sk_r,
        pk_s.as_ref(),
        &tv.enc,
        &tv.psk,
        &tv.psk_id,
        &tv.info,
    )
    .expect("setup receiver");

    for ctx in [&ctx_s.context, &ctx_r.context] {
        assert_eq!(ctx.setup_params.shared_secret, tv.shared_secret);
        assert_eq!(
            ctx.context_params.key_schedule_context,
            tv.key_schedule_context
        );
        assert_eq!(ctx.context_params.secret, tv.secret);
        assert_eq!(ctx.key, tv.key);
        assert_eq!(ctx.base_nonce, tv.base_nonce);
        assert_eq!(ctx.exporter_secret, tv.exporter_secret);
    }

    for data in &tv.encryptions {
        let encrypted = ctx_s.seal(&data.aad, &data.plaintext).expect("seal");
        assert_eq!(encrypted.as_ref(), &data.ciphertext[..], "incorrect encryption");
        let decrypted = ctx_r.open(&data.aad, &encrypted).expect("open");
        assert_eq!(decrypted.as_ref(), &data.plaintext[..], "incorrect decryption");
    }

    for data in &tv.exports {
        let exported = ctx_s
            .export(&data.export_context, data.export_length)
            .expect("export");
        assert_eq!(exported.as_ref(), &data.export_value[..], "incorrect export");
    }
}

// Vectors are only generated for the KEMs whose private keys have a wire
// form; the SIKE KEMs refuse both serialization and ephemeral injection.
const VECTOR_KEM_IDS: &[KemId] = &[
    KemId::DHKEM_X25519,
    KemId::DHKEM_X448,
    KemId::DHKEM_P256,
    KemId::DHKEM_P521,
];
const VECTOR_KDF_IDS: &[KdfId] = &[KdfId::HKDF_SHA256, KdfId::HKDF_SHA512, KdfId::HKDF_SHA3_256];
const VECTOR_AEAD_IDS: &[AeadId] = &[
    AeadId::AES128GCM,
    AeadId::AES256GCM,
    AeadId::ChaCha20Poly1305,
];
const VECTOR_MODES: &[Mode] = &[Mode::Base, Mode::Psk, Mode::Auth, Mode::AuthPsk];

#[test]
fn test_vector_generate() {
    let mut vectors = Vec::new();
    for kem_id in VECTOR_KEM_IDS {
        for kdf_id in VECTOR_KDF_IDS {
            for aead_id in VECTOR_AEAD_IDS {
                for mode in VECTOR_MODES {
                    vectors.push(generate_test_vector(*mode, *kem_id, *kdf_id, *aead_id));
                }
            }
        }
    }

    // Verify that we process our own vectors correctly.
    let encoded = serde_json::to_string(&vectors).expect("error producing test vectors");
    let decoded: Vec<TestVector> = serde_json::from_str(&encoded).expect("error decoding");
    for tv in &decoded {
        verify_test_vector(tv);
    }

    if let Ok(output_file) = std::env::var(OUTPUT_ENV_KEY) {
        if !output_file.is_empty() {
            std::fs::write(&output_file, &encoded).expect("error writing test vectors");
        }
    }
}

#[test]
fn test_vector_verify() {
    let input_file = match std::env::var(INPUT_ENV_KEY) {
        Ok(path) if !path.is_empty() => path,
        _ => return, // test vectors were not provided
    };

    for tv in &load_test_vectors(&input_file) {
        println!(
            "verifying kem={:04x}/kdf={:04x}/aead={:04x}/mode={:02x}",
            tv.kem_id, tv.kdf_id, tv.aead_id, tv.mode
        );
        verify_test_vector(tv);
    }
}
