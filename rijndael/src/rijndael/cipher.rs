use std::sync::Arc;

use symmetric_engine::crypto::cipher_traits::{BlockCipher, KeyExpander, RoundTransformer};
use symmetric_engine::crypto::errors::CipherError;

use crate::gf::arithmetic::multiply;
use crate::rijndael::key_schedule::{
    ensure_irreducible_modulus, num_rounds, validate_block_size, validate_key_size,
    RijndaelKeyExpander,
};
use crate::rijndael::sbox::compute_sboxes;

pub const BLOCK_SIZE_128: usize = 16;
pub const BLOCK_SIZE_192: usize = 24;
pub const BLOCK_SIZE_256: usize = 32;

// Column-major state: 4 rows of Nb bytes, state[row][col] = data[row + 4*col].
type State = Vec<Vec<u8>>;

fn bytes_to_state(data: &[u8]) -> State {
    let nb = data.len() / 4;
    let mut state = vec![vec![0u8; nb]; 4];
    for col in 0..nb {
        for row in 0..4 {
            state[row][col] = data[row + col * 4];
        }
    }
    state
}

fn state_to_bytes(state: &State) -> Vec<u8> {
    let nb = state[0].len();
    let mut result = vec![0u8; 4 * nb];
    for col in 0..nb {
        for row in 0..4 {
            result[row + col * 4] = state[row][col];
        }
    }
    result
}

fn add_round_key(state: &mut State, round_key: &[u8]) {
    let nb = state[0].len();
    for col in 0..nb {
        for row in 0..4 {
            state[row][col] ^= round_key[row + col * 4];
        }
    }
}

// Row r rotates left by a size-dependent offset; the 8-column state skips
// offset 2 per the Rijndael definition.
fn shift_rows(state: &mut State, inverse: bool) {
    let nb = state[0].len();
    let shifts: [usize; 4] = if nb == 4 || nb == 6 {
        [0, 1, 2, 3]
    } else {
        [0, 1, 3, 4]
    };

    for row in 1..4 {
        let mut shift = shifts[row];
        if inverse {
            shift = nb - shift;
        }
        let original = state[row].clone();
        for col in 0..nb {
            state[row][col] = original[(col + shift) % nb];
        }
    }
}

/// One full middle round of the encrypt direction, exposed through the
/// shared [`RoundTransformer`] abstraction.
pub struct RijndaelRoundTransformer {
    block_size: usize,
    modulus: u8,
    sbox: [u8; 256],
    inv_sbox: [u8; 256],
}

impl RijndaelRoundTransformer {
    pub fn new(
        block_size: usize,
        modulus: u8,
        sbox: [u8; 256],
        inv_sbox: [u8; 256],
    ) -> Result<Self, CipherError> {
        validate_block_size(block_size)?;
        ensure_irreducible_modulus(modulus)?;

        Ok(RijndaelRoundTransformer {
            block_size,
            modulus,
            sbox,
            inv_sbox,
        })
    }

    fn sub_bytes(&self, state: &mut State, inverse: bool) {
        let sbox = if inverse { &self.inv_sbox } else { &self.sbox };
        for row in state.iter_mut() {
            for byte in row.iter_mut() {
                *byte = sbox[*byte as usize];
            }
        }
    }

    fn mix_columns(&self, state: &mut State, inverse: bool) -> Result<(), CipherError> {
        let nb = state[0].len();
        for col in 0..nb {
            let column = [state[0][col], state[1][col], state[2][col], state[3][col]];
            let mixed = if inverse {
                self.inv_mix_column(&column)?
            } else {
                self.mix_column(&column)?
            };
            for row in 0..4 {
                state[row][col] = mixed[row];
            }
        }
        Ok(())
    }

    fn mul_column(&self, coefficient: u8, column: &[u8; 4]) -> Result<[u8; 4], CipherError> {
        let mut result = [0u8; 4];
        for (slot, &byte) in result.iter_mut().zip(column.iter()) {
            *slot = multiply(coefficient, byte, self.modulus)?;
        }
        Ok(result)
    }

    fn mix_column(&self, column: &[u8; 4]) -> Result<[u8; 4], CipherError> {
        let mul2 = self.mul_column(0x02, column)?;
        let mul3 = self.mul_column(0x03, column)?;

        Ok([
            mul2[0] ^ mul3[1] ^ column[2] ^ column[3],
            column[0] ^ mul2[1] ^ mul3[2] ^ column[3],
            column[0] ^ column[1] ^ mul2[2] ^ mul3[3],
            mul3[0] ^ column[1] ^ column[2] ^ mul2[3],
        ])
    }

    fn inv_mix_column(&self, column: &[u8; 4]) -> Result<[u8; 4], CipherError> {
        let mul9 = self.mul_column(0x09, column)?;
        let mul11 = self.mul_column(0x0B, column)?;
        let mul13 = self.mul_column(0x0D, column)?;
        let mul14 = self.mul_column(0x0E, column)?;

        Ok([
            mul14[0] ^ mul11[1] ^ mul13[2] ^ mul9[3],
            mul9[0] ^ mul14[1] ^ mul11[2] ^ mul13[3],
            mul13[0] ^ mul9[1] ^ mul14[2] ^ mul11[3],
            mul11[0] ^ mul13[1] ^ mul9[2] ^ mul14[3],
        ])
    }
}

impl RoundTransformer for RijndaelRoundTransformer {
    fn transform(&self, block: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError> {
        if block.len() != self.block_size {
            return Err(CipherError::Validation(format!(
                "transform: block must be {} bytes",
                self.block_size
            )));
        }

        let mut state = bytes_to_state(block);
        self.sub_bytes(&mut state, false);
        shift_rows(&mut state, false);
        self.mix_columns(&mut state, false)?;
        add_round_key(&mut state, round_key);
        Ok(state_to_bytes(&state))
    }
}

/// Rijndael parameterized by block size, key size and field modulus. The
/// canonical AES field corresponds to modulus `0x1B`.
pub struct RijndaelCipher {
    block_size: usize,
    key_expander: RijndaelKeyExpander,
    transformer: Arc<dyn RoundTransformer + Send + Sync>,
    concrete: Arc<RijndaelRoundTransformer>,
    round_keys: Vec<Vec<u8>>,
    num_rounds: usize,
}

impl RijndaelCipher {
    pub fn new(block_size: usize, key_size: usize, modulus: u8) -> Result<Self, CipherError> {
        validate_block_size(block_size)?;
        validate_key_size(key_size)?;
        ensure_irreducible_modulus(modulus)?;

        let (sbox, inv_sbox) = compute_sboxes(modulus)?;
        log::debug!(
            "rijndael: {block_size}-byte block, {key_size}-byte key, modulus 0x{:03X}",
            0x100 | modulus as u16
        );
        let key_expander = RijndaelKeyExpander::new(block_size, key_size, modulus, sbox)?;
        let concrete = Arc::new(RijndaelRoundTransformer::new(
            block_size, modulus, sbox, inv_sbox,
        )?);

        Ok(RijndaelCipher {
            block_size,
            key_expander,
            transformer: concrete.clone(),
            concrete,
            round_keys: Vec::new(),
            num_rounds: num_rounds(block_size, key_size),
        })
    }

    fn check_block(&self, block: &[u8]) -> Result<(), CipherError> {
        if block.len() != self.block_size {
            return Err(CipherError::Validation(format!(
                "rijndael: block must be {} bytes (got {})",
                self.block_size,
                block.len()
            )));
        }
        if self.round_keys.is_empty() {
            return Err(CipherError::RoundKeysNotSet);
        }
        Ok(())
    }
}

impl BlockCipher for RijndaelCipher {
    fn set_key(&mut self, key: &[u8]) -> Result<(), CipherError> {
        self.round_keys = self.key_expander.expand_key(key)?;
        Ok(())
    }

    fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.check_block(block)?;

        // round 0 only whitens with the first round key
        let mut result: Vec<u8> = block
            .iter()
            .zip(self.round_keys[0].iter())
            .map(|(&a, &b)| a ^ b)
            .collect();

        for round in 1..self.num_rounds {
            result = self.transformer.transform(&result, &self.round_keys[round])?;
        }

        // final round has no MixColumns
        let mut state = bytes_to_state(&result);
        self.concrete.sub_bytes(&mut state, false);
        shift_rows(&mut state, false);
        add_round_key(&mut state, &self.round_keys[self.num_rounds]);

        Ok(state_to_bytes(&state))
    }

    fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.check_block(block)?;

        let mut state = bytes_to_state(block);
        add_round_key(&mut state, &self.round_keys[self.num_rounds]);

        for round in (1..self.num_rounds).rev() {
            shift_rows(&mut state, true);
            self.concrete.sub_bytes(&mut state, true);
            add_round_key(&mut state, &self.round_keys[round]);
            self.concrete.mix_columns(&mut state, true)?;
        }

        shift_rows(&mut state, true);
        self.concrete.sub_bytes(&mut state, true);
        add_round_key(&mut state, &self.round_keys[0]);

        Ok(state_to_bytes(&state))
    }

    fn block_size(&self) -> usize {
        self.block_size
    }
}
