use rijndael::rijndael::cipher::RijndaelCipher;
use symmetric_engine::crypto::cancellation::CancellationToken;
use symmetric_engine::crypto::cipher_context::CipherContext;
use symmetric_engine::crypto::cipher_types::{CipherContextConfig, CipherMode, PaddingMode};
use symmetric_engine::crypto::errors::CipherError;

#[tokio::main]
async fn main() -> Result<(), CipherError> {
    let cipher = RijndaelCipher::new(16, 16, 0x1B)?;

    let ctx = CipherContext::new(
        Box::new(cipher),
        CipherContextConfig {
            key: b"0123456789abcdef".to_vec(),
            mode: CipherMode::CTR,
            padding: PaddingMode::Pkcs7,
            iv: None,
        },
    )?;

    let token = CancellationToken::new();
    let message = b"rijndael counter-mode demo";

    let encrypted = ctx.encrypt_bytes(&token, message).await?;
    let decrypted = ctx.decrypt_bytes(&token, &encrypted).await?;

    println!("ciphertext: {encrypted:02X?}");
    println!("plaintext : {}", String::from_utf8_lossy(&decrypted));

    Ok(())
}
