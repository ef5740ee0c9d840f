use crate::crypto::cipher_traits::{FeistelKeySchedule, KeyExpander};
use crate::crypto::errors::CipherError;

pub const DEAL_KEY_SIZE: usize = 16;

/// Per-round DES subkeys derived from the 16-byte master key by XOR mixing.
/// A deliberately simple teaching schedule, not an independently vetted one.
pub struct DealKeyExpansion {
    num_rounds: usize,
}

impl DealKeyExpansion {
    pub fn new(num_rounds: usize) -> Self {
        DealKeyExpansion { num_rounds }
    }
}

impl KeyExpander for DealKeyExpansion {
    fn expand_key(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, CipherError> {
        if key.len() != DEAL_KEY_SIZE {
            return Err(CipherError::Validation(format!(
                "expand_key: DEAL key must be {DEAL_KEY_SIZE} bytes (got {})",
                key.len()
            )));
        }

        let mut round_keys = Vec::with_capacity(self.num_rounds);
        for i in 0..self.num_rounds {
            let mut round_key = vec![0u8; 8];
            for (j, slot) in round_key.iter_mut().enumerate() {
                let idx = (i * 2 + j) % key.len();
                *slot = key[idx] ^ (i as u8 + 1) ^ ((j as u8) << 1);
            }
            round_keys.push(round_key);
        }

        Ok(round_keys)
    }
}

impl FeistelKeySchedule for DealKeyExpansion {
    fn num_rounds(&self) -> usize {
        self.num_rounds
    }
}
