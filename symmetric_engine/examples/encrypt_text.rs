use symmetric_engine::crypto::cancellation::CancellationToken;
use symmetric_engine::crypto::cipher_context::CipherContext;
use symmetric_engine::crypto::cipher_types::{CipherContextConfig, CipherMode, PaddingMode};
use symmetric_engine::crypto::des::Des;
use symmetric_engine::crypto::errors::CipherError;

#[tokio::main]
async fn main() -> Result<(), CipherError> {
    env_logger::init();

    let text = "The quick brown fox jumps over the lazy dog. Symmetric engine demo.";

    let ctx = CipherContext::new(
        Box::new(Des::new()),
        CipherContextConfig {
            key: b"8bytekey".to_vec(),
            mode: CipherMode::CBC,
            padding: PaddingMode::Pkcs7,
            iv: None,
        },
    )?;

    let token = CancellationToken::new();
    let encrypted = ctx.encrypt_bytes(&token, text.as_bytes()).await?;
    let decrypted = ctx.decrypt_bytes(&token, &encrypted).await?;

    println!("plain     : {text}");
    println!("encrypted : {} bytes", encrypted.len());
    println!("decrypted : {}", String::from_utf8_lossy(&decrypted));

    Ok(())
}
