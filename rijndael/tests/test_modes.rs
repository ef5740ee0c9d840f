use rijndael::rijndael::cipher::RijndaelCipher;
use symmetric_engine::crypto::cancellation::CancellationToken;
use symmetric_engine::crypto::cipher_context::CipherContext;
use symmetric_engine::crypto::cipher_types::{CipherContextConfig, CipherMode, PaddingMode};

const AES_MODULUS: u8 = 0x1B;

fn context(mode: CipherMode, padding: PaddingMode) -> CipherContext {
    CipherContext::new(
        Box::new(RijndaelCipher::new(16, 16, AES_MODULUS).unwrap()),
        CipherContextConfig {
            key: (0..16).collect(),
            mode,
            padding,
            iv: None,
        },
    )
    .unwrap()
}

#[tokio::test]
async fn rijndael_through_the_mode_engine() {
    let token = CancellationToken::new();
    let data: Vec<u8> = (0..70u8).map(|i| i.wrapping_mul(13) | 1).collect();

    for (mode, padding) in [
        (CipherMode::CBC, PaddingMode::Pkcs7),
        (CipherMode::CTR, PaddingMode::Zeros),
        (CipherMode::OFB, PaddingMode::AnsiX923),
    ] {
        let ctx = context(mode, padding);
        let encrypted = ctx.encrypt_bytes(&token, &data).await.unwrap();
        let decrypted = ctx.decrypt_bytes(&token, &encrypted).await.unwrap();
        assert_eq!(decrypted, data, "{mode:?}/{padding:?}");
    }
}

#[tokio::test]
async fn ecb_is_deterministic_across_pool_sizes() {
    let token = CancellationToken::new();
    let data: Vec<u8> = (0..200u8).collect();

    let ctx = context(CipherMode::ECB, PaddingMode::Pkcs7);
    let serial = ctx.clone().with_max_workers(1);

    let pooled_out = ctx.encrypt_bytes(&token, &data).await.unwrap();
    let serial_out = serial.encrypt_bytes(&token, &data).await.unwrap();
    assert_eq!(pooled_out, serial_out);
}

#[tokio::test]
async fn wide_block_rijndael_in_cbc() {
    let token = CancellationToken::new();
    let ctx = CipherContext::new(
        Box::new(RijndaelCipher::new(32, 24, AES_MODULUS).unwrap()),
        CipherContextConfig {
            key: (0..24).collect(),
            mode: CipherMode::CBC,
            padding: PaddingMode::Pkcs7,
            iv: Some(vec![0x31; 32]),
        },
    )
    .unwrap();

    let data = b"wide-state rijndael through the chained mode engine".to_vec();
    let encrypted = ctx.encrypt_bytes(&token, &data).await.unwrap();
    assert_eq!(encrypted.len() % 32, 0);
    assert_eq!(ctx.decrypt_bytes(&token, &encrypted).await.unwrap(), data);
}
