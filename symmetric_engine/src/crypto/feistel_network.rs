use std::sync::Arc;

use crate::crypto::cipher_traits::{FeistelKeySchedule, RoundFunction};
use crate::crypto::errors::CipherError;

/// Generic N-round Feistel cipher over a pluggable round function and key
/// schedule. The block size is fixed at twice the round function's half-block
/// size for the lifetime of the instance.
pub struct FeistelNetwork {
    round_function: Arc<dyn RoundFunction + Send + Sync>,
    key_schedule: Arc<dyn FeistelKeySchedule + Send + Sync>,
    round_keys: Vec<Vec<u8>>,
    num_rounds: usize,
    half_block_size: usize,
}

impl FeistelNetwork {
    pub fn new(
        round_function: Arc<dyn RoundFunction + Send + Sync>,
        key_schedule: Arc<dyn FeistelKeySchedule + Send + Sync>,
    ) -> Self {
        let num_rounds = key_schedule.num_rounds();
        let half_block_size = round_function.half_block_size();
        FeistelNetwork {
            round_function,
            key_schedule,
            round_keys: Vec::new(),
            num_rounds,
            half_block_size,
        }
    }

    /// Expands and caches the round keys. Re-keying discards the previous
    /// schedule.
    pub fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        let round_keys = self.key_schedule.expand_key(key)?;
        if round_keys.len() != self.num_rounds {
            return Err(CipherError::Validation(format!(
                "set_key: key schedule produced {} round keys, expected {}",
                round_keys.len(),
                self.num_rounds
            )));
        }
        self.round_keys = round_keys;
        Ok(())
    }

    pub fn block_size(&self) -> usize {
        self.half_block_size * 2
    }

    pub fn num_rounds(&self) -> usize {
        self.num_rounds
    }

    pub fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        if self.round_keys.is_empty() {
            return Err(CipherError::RoundKeysNotSet);
        }

        let mut result = block.to_vec();
        for round_key in &self.round_keys {
            result = self.forward_round(&result, round_key)?;
        }
        Ok(result)
    }

    pub fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        if self.round_keys.is_empty() {
            return Err(CipherError::RoundKeysNotSet);
        }

        let mut result = block.to_vec();
        for round_key in self.round_keys.iter().rev() {
            result = self.reverse_round(&result, round_key)?;
        }
        Ok(result)
    }

    fn split<'a>(&self, block: &'a [u8]) -> Result<(&'a [u8], &'a [u8]), CipherError> {
        let expected = self.half_block_size * 2;
        if block.len() != expected {
            return Err(CipherError::Validation(format!(
                "feistel: input block must be {expected} bytes"
            )));
        }
        Ok(block.split_at(self.half_block_size))
    }

    // (L, R) -> (R, L xor F(R, k))
    fn forward_round(&self, block: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError> {
        let (left, right) = self.split(block)?;
        let f_out = self.round_function.apply(right, round_key)?;

        let mut result = Vec::with_capacity(block.len());
        result.extend_from_slice(right);
        result.extend(left.iter().zip(f_out.iter()).map(|(&a, &b)| a ^ b));
        Ok(result)
    }

    // (L, R) -> (R xor F(L, k), L): undoes one forward round
    fn reverse_round(&self, block: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError> {
        let (left, right) = self.split(block)?;
        let f_out = self.round_function.apply(left, round_key)?;

        let mut result = Vec::with_capacity(block.len());
        result.extend(right.iter().zip(f_out.iter()).map(|(&a, &b)| a ^ b));
        result.extend_from_slice(left);
        Ok(result)
    }
}
