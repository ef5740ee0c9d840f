use symmetric_engine::crypto::cipher_traits::KeyExpander;
use symmetric_engine::crypto::errors::CipherError;

use crate::gf::arithmetic::multiply;
use crate::gf::irreducible::is_irreducible_degree8;

pub(crate) fn validate_block_size(block_size: usize) -> Result<(), CipherError> {
    match block_size {
        16 | 24 | 32 => Ok(()),
        other => Err(CipherError::Validation(format!(
            "rijndael: invalid block size {other} (must be 16, 24 or 32 bytes)"
        ))),
    }
}

pub(crate) fn validate_key_size(key_size: usize) -> Result<(), CipherError> {
    match key_size {
        16 | 24 | 32 => Ok(()),
        other => Err(CipherError::Validation(format!(
            "rijndael: invalid key size {other} (must be 16, 24 or 32 bytes)"
        ))),
    }
}

pub(crate) fn ensure_irreducible_modulus(modulus: u8) -> Result<(), CipherError> {
    let poly = 0x100 | modulus as u16;
    if !is_irreducible_degree8(poly)? {
        return Err(CipherError::ReducibleModulus(poly));
    }
    Ok(())
}

pub(crate) fn num_rounds(block_size: usize, key_size: usize) -> usize {
    (block_size / 4).max(key_size / 4) + 6
}

/// Word-oriented Rijndael key expansion under a caller-supplied field
/// modulus.
pub struct RijndaelKeyExpander {
    block_size: usize,
    key_size: usize,
    modulus: u8,
    num_rounds: usize,
    sbox: [u8; 256],
}

impl RijndaelKeyExpander {
    pub fn new(
        block_size: usize,
        key_size: usize,
        modulus: u8,
        sbox: [u8; 256],
    ) -> Result<Self, CipherError> {
        validate_block_size(block_size)?;
        validate_key_size(key_size)?;
        ensure_irreducible_modulus(modulus)?;

        Ok(RijndaelKeyExpander {
            block_size,
            key_size,
            modulus,
            num_rounds: num_rounds(block_size, key_size),
            sbox,
        })
    }

    // Round constants are successive powers of the field generator x,
    // starting from x^0 for the first expanded word group.
    fn round_constants(&self, count: usize) -> Result<Vec<u8>, CipherError> {
        let mut rcon = vec![0u8; count];
        let mut value = 1u8;
        for slot in rcon.iter_mut().skip(1) {
            *slot = value;
            value = multiply(value, 0x02, self.modulus)?;
        }
        Ok(rcon)
    }
}

impl KeyExpander for RijndaelKeyExpander {
    fn expand_key(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, CipherError> {
        if key.len() != self.key_size {
            return Err(CipherError::Validation(format!(
                "expand_key: key must be {} bytes (got {})",
                self.key_size,
                key.len()
            )));
        }

        let nk = self.key_size / 4;
        let nb = self.block_size / 4;
        let total_words = nb * (self.num_rounds + 1);
        let rcon = self.round_constants(total_words / nk + 2)?;

        let mut words: Vec<[u8; 4]> = Vec::with_capacity(total_words);
        for chunk in key.chunks_exact(4) {
            words.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        for i in nk..total_words {
            let mut temp = words[i - 1];

            if i % nk == 0 {
                temp = [temp[1], temp[2], temp[3], temp[0]];
                for byte in temp.iter_mut() {
                    *byte = self.sbox[*byte as usize];
                }
                temp[0] ^= rcon[i / nk];
            } else if nk > 6 && i % nk == 4 {
                for byte in temp.iter_mut() {
                    *byte = self.sbox[*byte as usize];
                }
            }

            let prev = words[i - nk];
            words.push([
                prev[0] ^ temp[0],
                prev[1] ^ temp[1],
                prev[2] ^ temp[2],
                prev[3] ^ temp[3],
            ]);
        }

        let mut round_keys = Vec::with_capacity(self.num_rounds + 1);
        for round in 0..=self.num_rounds {
            let mut round_key = Vec::with_capacity(self.block_size);
            for word in &words[round * nb..(round + 1) * nb] {
                round_key.extend_from_slice(word);
            }
            round_keys.push(round_key);
        }

        Ok(round_keys)
    }
}
