use bitvec::prelude::*;

use crate::crypto::cipher_traits::{FeistelKeySchedule, KeyExpander};
use crate::crypto::des_tables::{PC1, PC2, ROTATION_SCHEDULE};
use crate::crypto::errors::CipherError;

pub const DES_KEY_SIZE: usize = 8;
pub const DES_ROUNDS: usize = 16;

pub struct DesKeyExpansion;

impl KeyExpander for DesKeyExpansion {
    fn expand_key(&self, key: &[u8]) -> Result<Vec<Vec<u8>>, CipherError> {
        if key.len() != DES_KEY_SIZE {
            return Err(CipherError::Validation(format!(
                "expand_key: DES key must be {DES_KEY_SIZE} bytes"
            )));
        }

        let permuted = select_bits(key, &PC1);
        let bits = permuted.view_bits::<Msb0>();

        let mut c: BitVec<u8, Msb0> = bits[..28].to_bitvec();
        let mut d: BitVec<u8, Msb0> = bits[28..56].to_bitvec();

        let mut round_keys = Vec::with_capacity(DES_ROUNDS);
        for &shift in ROTATION_SCHEDULE.iter() {
            c.rotate_left(shift);
            d.rotate_left(shift);

            let mut cd = c.clone();
            cd.extend_from_bitslice(&d);

            round_keys.push(select_bits(cd.as_raw_slice(), &PC2));
        }

        Ok(round_keys)
    }
}

impl FeistelKeySchedule for DesKeyExpansion {
    fn num_rounds(&self) -> usize {
        DES_ROUNDS
    }
}

// PC-1 and PC-2 select from a source wider than their own output, which the
// general permutation engine rejects, so the schedule does its own 1-based
// MSB-first bit selection.
fn select_bits(data: &[u8], table: &[usize]) -> Vec<u8> {
    let bits = data.view_bits::<Msb0>();
    let mut out: BitVec<u8, Msb0> = BitVec::with_capacity(table.len());
    for &pos in table {
        out.push(bits.get(pos - 1).map(|b| *b).unwrap_or(false));
    }
    out.set_uninitialized(false);
    out.into_vec()
}
