use std::sync::Arc;

use crate::crypto::cipher_traits::BlockCipher;
use crate::crypto::des_key_expansion::DesKeyExpansion;
use crate::crypto::des_round_function::DesRoundFunction;
use crate::crypto::des_tables::{FP, IP};
use crate::crypto::errors::CipherError;
use crate::crypto::feistel_network::FeistelNetwork;
use crate::crypto::permutations::{permute, IndexMode, InitialBit};

pub const DES_BLOCK_SIZE: usize = 8;

/// DES over the generic Feistel network: initial permutation, 16 rounds,
/// half swap, final permutation.
pub struct Des {
    network: FeistelNetwork,
}

impl Des {
    pub fn new() -> Self {
        Des {
            network: FeistelNetwork::new(Arc::new(DesRoundFunction), Arc::new(DesKeyExpansion)),
        }
    }
}

impl Default for Des {
    fn default() -> Self {
        Des::new()
    }
}

impl BlockCipher for Des {
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        self.network.set_key(key)
    }

    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;

        let permuted = permute(block, &IP, IndexMode::HighToLow, InitialBit::One)?;
        let rounds_out = self.network.encrypt(&permuted)?;
        let swapped = swap_halves(&rounds_out);
        permute(&swapped, &FP, IndexMode::HighToLow, InitialBit::One)
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        check_block(block)?;

        let permuted = permute(block, &IP, IndexMode::HighToLow, InitialBit::One)?;
        let swapped = swap_halves(&permuted);
        let rounds_out = self.network.decrypt(&swapped)?;
        permute(&rounds_out, &FP, IndexMode::HighToLow, InitialBit::One)
    }

    fn block_size(&self) -> usize {
        DES_BLOCK_SIZE
    }
}

fn check_block(block: &[u8]) -> Result<(), CipherError> {
    if block.len() != DES_BLOCK_SIZE {
        return Err(CipherError::Validation(format!(
            "des: block must be {DES_BLOCK_SIZE} bytes"
        )));
    }
    Ok(())
}

fn swap_halves(block: &[u8]) -> Vec<u8> {
    let half = block.len() / 2;
    [&block[half..], &block[..half]].concat()
}
