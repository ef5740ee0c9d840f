use std::time::Duration;

use symmetric_engine::crypto::cancellation::CancellationToken;
use symmetric_engine::crypto::cipher_context::CipherContext;
use symmetric_engine::crypto::cipher_traits::BlockCipher;
use symmetric_engine::crypto::cipher_types::{CipherContextConfig, CipherMode, PaddingMode};
use symmetric_engine::crypto::des::Des;
use symmetric_engine::crypto::errors::CipherError;

const KEY: &[u8] = b"8bytekey";

const ALL_MODES: [CipherMode; 7] = [
    CipherMode::ECB,
    CipherMode::CBC,
    CipherMode::PCBC,
    CipherMode::CFB,
    CipherMode::OFB,
    CipherMode::CTR,
    CipherMode::RandomDelta,
];

const ALL_PADDINGS: [PaddingMode; 4] = [
    PaddingMode::Zeros,
    PaddingMode::AnsiX923,
    PaddingMode::Pkcs7,
    PaddingMode::Iso10126,
];

fn des_context(mode: CipherMode, padding: PaddingMode) -> CipherContext {
    CipherContext::new(
        Box::new(Des::new()),
        CipherContextConfig {
            key: KEY.to_vec(),
            mode,
            padding,
            iv: None,
        },
    )
    .unwrap()
}

// nonzero tail keeps the Zeros scheme unambiguous
fn sample_data(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(7))
        .collect()
}

#[tokio::test]
async fn roundtrip_every_mode_padding_and_length() {
    let token = CancellationToken::new();

    for mode in ALL_MODES {
        for padding in ALL_PADDINGS {
            for len in [0usize, 1, 7, 8, 9, 24] {
                let ctx = des_context(mode, padding);
                let data = sample_data(len);

                let encrypted = ctx.encrypt_bytes(&token, &data).await.unwrap();
                let decrypted = ctx.decrypt_bytes(&token, &encrypted).await.unwrap();

                assert_eq!(
                    decrypted, data,
                    "roundtrip failed for {mode:?}/{padding:?} at length {len}"
                );
            }
        }
    }
}

#[tokio::test]
async fn ecb_matches_the_raw_block_cipher() {
    let token = CancellationToken::new();
    let ctx = des_context(CipherMode::ECB, PaddingMode::Pkcs7);
    let data = sample_data(16);

    let encrypted = ctx.encrypt_bytes(&token, &data).await.unwrap();

    let mut des = Des::new();
    des.set_key(KEY).unwrap();
    assert_eq!(&encrypted[..8], &des.encrypt(&data[..8]).unwrap()[..]);
    assert_eq!(&encrypted[8..16], &des.encrypt(&data[8..16]).unwrap()[..]);
    // plus one trailing padding block
    assert_eq!(encrypted.len(), 24);
}

#[tokio::test]
async fn parallel_modes_are_deterministic_across_pool_sizes() {
    let token = CancellationToken::new();
    let data = sample_data(257);

    for mode in [CipherMode::ECB, CipherMode::CTR, CipherMode::CBC] {
        let ctx = des_context(mode, PaddingMode::Pkcs7);
        let serial = ctx.clone().with_max_workers(1);
        let pooled = ctx.clone().with_max_workers(8);

        let encrypted_serial = serial.encrypt_bytes(&token, &data).await.unwrap();
        let encrypted_pooled = pooled.encrypt_bytes(&token, &data).await.unwrap();
        assert_eq!(encrypted_serial, encrypted_pooled, "{mode:?} encrypt");

        let decrypted_serial = serial.decrypt_bytes(&token, &encrypted_pooled).await.unwrap();
        let decrypted_pooled = pooled.decrypt_bytes(&token, &encrypted_pooled).await.unwrap();
        assert_eq!(decrypted_serial, decrypted_pooled, "{mode:?} decrypt");
        assert_eq!(decrypted_pooled, data);
    }
}

#[tokio::test]
async fn random_delta_doubles_the_ciphertext() {
    let token = CancellationToken::new();
    let ctx = des_context(CipherMode::RandomDelta, PaddingMode::Pkcs7);
    let data = sample_data(8);

    // 8 data bytes pad to 16, and each block carries its delta
    let encrypted = ctx.encrypt_bytes(&token, &data).await.unwrap();
    assert_eq!(encrypted.len(), 32);

    assert_eq!(ctx.decrypt_bytes(&token, &encrypted).await.unwrap(), data);
}

#[tokio::test]
async fn random_delta_rejects_odd_ciphertext() {
    let token = CancellationToken::new();
    let ctx = des_context(CipherMode::RandomDelta, PaddingMode::Pkcs7);

    let err = ctx.decrypt_bytes(&token, &[0u8; 8]).await.unwrap_err();
    assert!(matches!(err, CipherError::Validation(_)));
}

#[tokio::test]
async fn iv_is_generated_when_omitted_and_validated_when_supplied() {
    let ctx = des_context(CipherMode::CBC, PaddingMode::Pkcs7);
    assert_eq!(ctx.iv().unwrap().len(), 8);

    let ctx = des_context(CipherMode::ECB, PaddingMode::Pkcs7);
    assert!(ctx.iv().is_none());

    let short_iv = CipherContext::new(
        Box::new(Des::new()),
        CipherContextConfig {
            key: KEY.to_vec(),
            mode: CipherMode::CBC,
            padding: PaddingMode::Pkcs7,
            iv: Some(vec![0u8; 4]),
        },
    );
    assert!(matches!(short_iv, Err(CipherError::Validation(_))));
}

#[tokio::test]
async fn same_iv_reproduces_the_ciphertext() {
    let token = CancellationToken::new();
    let config = || CipherContextConfig {
        key: KEY.to_vec(),
        mode: CipherMode::CBC,
        padding: PaddingMode::Pkcs7,
        iv: Some((1u8..=8).collect()),
    };

    let first = CipherContext::new(Box::new(Des::new()), config()).unwrap();
    let second = CipherContext::new(Box::new(Des::new()), config()).unwrap();
    let data = sample_data(20);

    assert_eq!(
        first.encrypt_bytes(&token, &data).await.unwrap(),
        second.encrypt_bytes(&token, &data).await.unwrap()
    );
}

#[tokio::test]
async fn wrong_key_length_fails_at_construction() {
    let result = CipherContext::new(
        Box::new(Des::new()),
        CipherContextConfig {
            key: vec![0u8; 5],
            mode: CipherMode::ECB,
            padding: PaddingMode::Pkcs7,
            iv: None,
        },
    );
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_roundtrip() {
    let token = CancellationToken::new();
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.bin");
    let encrypted = dir.path().join("encrypted.bin");
    let output = dir.path().join("decrypted.bin");

    let data = sample_data(1000);
    std::fs::write(&input, &data).unwrap();

    let ctx = des_context(CipherMode::CBC, PaddingMode::AnsiX923);
    ctx.encrypt_file(&token, &input, &encrypted).await.unwrap();
    ctx.decrypt_file(&token, &encrypted, &output).await.unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), data);
    assert_ne!(std::fs::read(&encrypted).unwrap(), data);
}

#[tokio::test]
async fn missing_input_file_surfaces_an_io_error() {
    let token = CancellationToken::new();
    let dir = tempfile::tempdir().unwrap();
    let ctx = des_context(CipherMode::ECB, PaddingMode::Pkcs7);

    let err = ctx
        .encrypt_file(&token, dir.path().join("absent"), dir.path().join("out"))
        .await
        .unwrap_err();
    assert!(matches!(err, CipherError::Io(_)));
}

/// Cipher that sleeps per block so a running operation can be cancelled
/// deterministically.
struct SlowCipher;

impl BlockCipher for SlowCipher {
    fn set_key(&mut self, _key: &[u8]) -> Result<(), CipherError> {
        Ok(())
    }

    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        std::thread::sleep(Duration::from_millis(5));
        Ok(block.to_vec())
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        Ok(block.to_vec())
    }

    fn block_size(&self) -> usize {
        8
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_mid_operation_discards_the_output() {
    let ctx = CipherContext::new(
        Box::new(SlowCipher),
        CipherContextConfig {
            key: Vec::new(),
            mode: CipherMode::ECB,
            padding: PaddingMode::Pkcs7,
            iv: None,
        },
    )
    .unwrap();

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    // 20_000 blocks at 5 ms each cannot finish before the cancel fires
    let data = vec![0x5Au8; 20_000 * 8];
    let err = ctx.encrypt_bytes(&token, &data).await.unwrap_err();
    assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
}

#[tokio::test]
async fn pre_cancelled_token_aborts_before_any_work() {
    let token = CancellationToken::new();
    token.cancel();

    let ctx = des_context(CipherMode::CBC, PaddingMode::Pkcs7);
    let err = ctx.encrypt_bytes(&token, &sample_data(64)).await.unwrap_err();
    assert!(matches!(err, CipherError::Cancelled));

    let err = ctx.decrypt_bytes(&token, &[0u8; 16]).await.unwrap_err();
    assert!(matches!(err, CipherError::Cancelled));
}

#[tokio::test]
async fn cancellation_error_is_distinguishable() {
    assert_eq!(CipherError::Cancelled.to_string(), "operation cancelled");
    assert!(!CipherError::Validation("x".into()).is_cancelled());
    assert!(CipherError::Cancelled.is_cancelled());
}
