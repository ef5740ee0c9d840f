use crate::crypto::errors::CipherError;

/// A fixed-size keyed invertible byte transform. Implementations must return
/// exactly `block_size()` bytes from `encrypt`/`decrypt`, and the round-key
/// table cached by `set_key` must stay immutable afterwards so a keyed
/// instance can be shared across worker threads.
pub trait BlockCipher {
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError>;
    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError>;
    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError>;
    fn block_size(&self) -> usize;
}

/// Derives the ordered round-key sequence from a master key.
pub trait KeyExpander {
    fn expand_key(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, CipherError>;
}

/// The Feistel round function F.
pub trait RoundFunction {
    fn apply(&self, right_half: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError>;
    fn half_block_size(&self) -> usize;
}

/// Key expander that also fixes the round count of the network it feeds.
pub trait FeistelKeySchedule: KeyExpander {
    fn num_rounds(&self) -> usize;
}

/// A full-block round transform, the non-Feistel counterpart of
/// [`RoundFunction`].
pub trait RoundTransformer {
    fn transform(&self, block: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError>;
}
