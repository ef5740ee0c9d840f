use crate::crypto::cipher_traits::RoundFunction;
use crate::crypto::des_tables::{E, P, S_BOXES};
use crate::crypto::errors::CipherError;
use crate::crypto::permutations::{permute, IndexMode, InitialBit};

/// The DES F-function: expand, mix with the round key, substitute through
/// the eight S-boxes, permute.
pub struct DesRoundFunction;

impl RoundFunction for DesRoundFunction {
    fn apply(&self, right_half: &[u8], round_key: &[u8]) -> Result<Vec<u8>, CipherError> {
        if right_half.len() != 4 {
            return Err(CipherError::Validation(
                "des round: right half must be 4 bytes".into(),
            ));
        }
        if round_key.len() != 6 {
            return Err(CipherError::Validation(
                "des round: round key must be 6 bytes".into(),
            ));
        }

        let expanded = permute(right_half, &E, IndexMode::HighToLow, InitialBit::One)?;
        let mixed: Vec<u8> = expanded
            .iter()
            .zip(round_key.iter())
            .map(|(&a, &b)| a ^ b)
            .collect();

        let mut substituted = [0u8; 4];
        for box_index in 0..8 {
            let six = extract_six_bits(&mixed, box_index * 6);
            // outer bits pick the row, inner four the column
            let row = ((six & 0x20) >> 4) | (six & 0x01);
            let col = (six & 0x1E) >> 1;
            let value = S_BOXES[box_index][row as usize][col as usize];
            set_four_bits(&mut substituted, box_index, value);
        }

        permute(&substituted, &P, IndexMode::HighToLow, InitialBit::One)
    }

    fn half_block_size(&self) -> usize {
        4
    }
}

fn extract_six_bits(data: &[u8], start_bit: usize) -> u8 {
    let mut result = 0u8;
    for i in 0..6 {
        let bit_index = start_bit + i;
        let bit = (data[bit_index / 8] >> (7 - bit_index % 8)) & 1;
        result = (result << 1) | bit;
    }
    result
}

fn set_four_bits(data: &mut [u8; 4], position: usize, value: u8) {
    for i in 0..4 {
        let bit_index = position * 4 + i;
        let mask = 1u8 << (7 - bit_index % 8);
        if (value >> (3 - i)) & 1 != 0 {
            data[bit_index / 8] |= mask;
        } else {
            data[bit_index / 8] &= !mask;
        }
    }
}
