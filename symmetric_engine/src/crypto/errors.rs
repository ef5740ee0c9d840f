use std::io;

use thiserror::Error;

/// Failure classes of the cipher engine. Cancellation is kept distinct from
/// every validation and cryptographic failure so callers can tell an aborted
/// operation from a broken one.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("{0}")]
    Validation(String),

    /// Encrypt/decrypt was called on an unkeyed cipher.
    #[error("round keys not set")]
    RoundKeysNotSet,

    #[error("modulus 0x{0:03X} is not irreducible")]
    ReducibleModulus(u16),

    #[error("element 0x{0:02X} has no inverse")]
    NotInvertible(u8),

    #[error("{0}")]
    Padding(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CipherError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CipherError::Cancelled)
    }
}
