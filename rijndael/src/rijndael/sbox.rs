use symmetric_engine::crypto::errors::CipherError;

use crate::gf::arithmetic::inverse;

/// The fixed AES affine bit transform, `b -> A*b xor 0x63`.
pub fn affine_transform(b: u8) -> u8 {
    let mut result = 0x63u8;
    for i in 0..8 {
        let bit = ((b >> i) & 1)
            ^ ((b >> ((i + 4) % 8)) & 1)
            ^ ((b >> ((i + 5) % 8)) & 1)
            ^ ((b >> ((i + 6) % 8)) & 1)
            ^ ((b >> ((i + 7) % 8)) & 1);
        result ^= bit << i;
    }
    result
}

pub fn inverse_affine_transform(b: u8) -> u8 {
    let mut result = 0u8;
    for i in 0..8 {
        let bit =
            ((b >> ((i + 2) % 8)) & 1) ^ ((b >> ((i + 5) % 8)) & 1) ^ ((b >> ((i + 7) % 8)) & 1);
        result ^= bit << i;
    }
    result ^ 0x05
}

/// Derives the substitution boxes for the given field modulus instead of
/// hard-coding them: forward box is the affine transform of the field
/// inverse (zero, having no inverse, maps through the transform of zero),
/// inverse box undoes the affine step first and then inverts.
pub fn compute_sboxes(modulus: u8) -> Result<([u8; 256], [u8; 256]), CipherError> {
    let mut sbox = [0u8; 256];
    let mut inv_sbox = [0u8; 256];

    for (i, slot) in sbox.iter_mut().enumerate() {
        let inverted = if i == 0 { 0 } else { inverse(i as u8, modulus)? };
        *slot = affine_transform(inverted);
    }

    for (i, slot) in inv_sbox.iter_mut().enumerate() {
        let preimage = inverse_affine_transform(i as u8);
        *slot = if preimage == 0 {
            0
        } else {
            inverse(preimage, modulus)?
        };
    }

    Ok((sbox, inv_sbox))
}
