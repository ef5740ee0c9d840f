use crate::crypto::cipher_traits::BlockCipher;
use crate::crypto::des::{Des, DES_BLOCK_SIZE};
use crate::crypto::errors::CipherError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripleDesMode {
    /// encrypt-decrypt-encrypt
    Ede,
    /// encrypt-encrypt-encrypt
    Eee,
}

/// Cascade of three independently keyed DES instances.
pub struct TripleDes {
    first: Des,
    second: Des,
    third: Des,
    mode: TripleDesMode,
}

impl TripleDes {
    pub fn new(mode: TripleDesMode) -> Self {
        TripleDes {
            first: Des::new(),
            second: Des::new(),
            third: Des::new(),
            mode,
        }
    }
}

impl BlockCipher for TripleDes {
    /// 8 bytes reuses one subkey for all three stages, 16 bytes sets
    /// k1 = k3, 24 bytes keys every stage independently.
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        let (k1, k2, k3) = match key.len() {
            8 => (key, key, key),
            16 => (&key[..8], &key[8..16], &key[..8]),
            24 => (&key[..8], &key[8..16], &key[16..24]),
            other => {
                return Err(CipherError::Validation(format!(
                    "set_key: invalid key length {other} (must be 8, 16, or 24 bytes)"
                )))
            }
        };

        self.first.set_key(k1)?;
        self.second.set_key(k2)?;
        self.third.set_key(k3)
    }

    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;

        match self.mode {
            TripleDesMode::Ede => {
                let stage = self.first.encrypt(block)?;
                let stage = self.second.decrypt(&stage)?;
                self.third.encrypt(&stage)
            }
            TripleDesMode::Eee => {
                let stage = self.first.encrypt(block)?;
                let stage = self.second.encrypt(&stage)?;
                self.third.encrypt(&stage)
            }
        }
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;

        match self.mode {
            TripleDesMode::Ede => {
                let stage = self.third.decrypt(block)?;
                let stage = self.second.encrypt(&stage)?;
                self.first.decrypt(&stage)
            }
            TripleDesMode::Eee => {
                let stage = self.third.decrypt(block)?;
                let stage = self.second.decrypt(&stage)?;
                self.first.decrypt(&stage)
            }
        }
    }

    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }
}

fn check_block(block: &[u8]) -> Result<(), CipherError> {
    if block.len() != DES_BLOCK_SIZE {
        return Err(CipherError::Validation(format!(
            "triple des: block must be {DES_BLOCK_SIZE} bytes"
        )));
    }
    Ok(())
}
