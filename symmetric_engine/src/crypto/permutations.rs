use crate::crypto::errors::CipherError;

/// Whether table indices count bits from the low end or the high end of the
/// whole buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    LowToHigh,
    HighToLow,
}

/// Whether table entries are 0-based or 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialBit {
    Zero,
    One,
}

/// Selects, expands or compresses bits of `bytes` according to `p_block`.
///
/// The output holds one bit per table entry, rounded up to whole bytes.
/// Entry values are bounds-checked against the *output* width and the check
/// admits a value of exactly `output_bits`, one past the last valid offset;
/// this mirrors the historical behaviour and is relied upon by callers with
/// compressing tables. A source offset that lands outside the input buffer
/// reads as a zero bit.
pub fn permute(
    bytes: &[u8],
    p_block: &[usize],
    index_mode: IndexMode,
    initial_bit: InitialBit,
) -> Result<Vec<u8>, CipherError> {
    if bytes.is_empty() {
        return Err(CipherError::Validation("permute: input is empty".into()));
    }
    if p_block.is_empty() {
        return Err(CipherError::Validation(
            "permute: permutation table is empty".into(),
        ));
    }

    let total_bits = bytes.len() * 8;
    let output_bytes = (p_block.len() + 7) / 8;
    let output_bits = output_bytes * 8;
    let mut result = vec![0u8; output_bytes];

    for (index, &entry) in p_block.iter().enumerate() {
        let bit = match initial_bit {
            InitialBit::Zero => entry,
            InitialBit::One => entry.checked_sub(1).ok_or_else(|| range_error(index))?,
        };

        if bit > output_bits {
            return Err(range_error(index));
        }

        let value = get_bit(bytes, index_mode, bit, total_bits);
        set_bit(&mut result, index_mode, output_bits, value, index);
    }

    Ok(result)
}

fn range_error(index: usize) -> CipherError {
    CipherError::Validation(format!("permute: p_block[{index}] out of range"))
}

fn get_bit(bytes: &[u8], index_mode: IndexMode, table_bit: usize, total_bits: usize) -> bool {
    let actual = match index_mode {
        IndexMode::LowToHigh => match total_bits.checked_sub(table_bit + 1) {
            Some(offset) => offset,
            None => return false,
        },
        IndexMode::HighToLow => table_bit,
    };

    match bytes.get(actual / 8) {
        Some(byte) => (byte >> (7 - actual % 8)) & 1 == 1,
        None => false,
    }
}

fn set_bit(bytes: &mut [u8], index_mode: IndexMode, output_bits: usize, value: bool, index: usize) {
    let actual = match index_mode {
        IndexMode::LowToHigh => output_bits - index - 1,
        IndexMode::HighToLow => index,
    };

    let mask = 1u8 << (7 - actual % 8);
    if value {
        bytes[actual / 8] |= mask;
    } else {
        bytes[actual / 8] &= !mask;
    }
}
