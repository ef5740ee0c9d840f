use std::sync::Arc;

use crate::crypto::cipher_traits::{BlockCipher, RoundFunction};
use crate::crypto::deal_key_expansion::DealKeyExpansion;
use crate::crypto::des::Des;
use crate::crypto::errors::CipherError;
use crate::crypto::feistel_network::FeistelNetwork;

pub const DEAL_BLOCK_SIZE: usize = 16;
pub const DEAL_DEFAULT_ROUNDS: usize = 6;

/// Round function that runs a full DES encryption of the 8-byte right half,
/// keyed by the first 8 bytes of the round key.
struct DealRoundFunction;

impl RoundFunction for DealRoundFunction {
    fn apply(&self, right_half: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError> {
        if right_half.len() != 8 {
            return Err(CipherError::Validation(format!(
                "deal round: right half must be 8 bytes (got {})",
                right_half.len()
            )));
        }
        if round_key.len() < 8 {
            return Err(CipherError::Validation(
                "deal round: round key must be at least 8 bytes".into(),
            ));
        }

        let mut des = Des::new();
        des.set_key(&round_key[..8])?;
        des.encrypt(right_half)
    }

    fn half_block_size(&self) -> usize {
        8
    }
}

/// Feistel composite over 16-byte blocks with DES as the round function.
pub struct Deal {
    network: FeistelNetwork,
}

impl Deal {
    pub fn new(num_rounds: usize) -> Self {
        Deal {
            network: FeistelNetwork::new(
                Arc::new(DealRoundFunction),
                Arc::new(DealKeyExpansion::new(num_rounds)),
            ),
        }
    }
}

impl Default for Deal {
    fn default() -> Self {
        Deal::new(DEAL_DEFAULT_ROUNDS)
    }
}

impl BlockCipher for Deal {
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        self.network.set_key(key)
    }

    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;
        self.network.encrypt(block)
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;
        self.network.decrypt(block)
    }

    fn block_size(&self) -> usize {
        DEAL_BLOCK_SIZE
    }
}

fn check_block(block: &[u8]) -> Result<(), CipherError> {
    if block.len() != DEAL_BLOCK_SIZE {
        return Err(CipherError::Validation(format!(
            "deal: block must be {DEAL_BLOCK_SIZE} bytes (got {})",
            block.len()
        )));
    }
    Ok(())
}
