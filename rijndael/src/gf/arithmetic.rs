//! GF(2^8) arithmetic. A byte is a polynomial of degree <= 7 over GF(2);
//! the modulus is the low byte of a degree-8 polynomial (bit 8 implied).

use symmetric_engine::crypto::errors::CipherError;

use crate::gf::irreducible::is_irreducible_degree8;

/// Addition and subtraction coincide: plain XOR.
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Shift-and-conditional-XOR carry-less multiplication, reduced by the
/// modulus whenever a carry leaves bit 7. The modulus is re-verified
/// irreducible on every call.
pub fn multiply(a: u8, b: u8, modulus: u8) -> Result<u8, CipherError> {
    ensure_irreducible(modulus)?;

    let mut result = 0u8;
    let mut temp_a = a;
    let mut temp_b = b;

    for _ in 0..8 {
        if temp_b & 1 != 0 {
            result ^= temp_a;
        }
        let high_bit_set = temp_a & 0x80 != 0;
        temp_a <<= 1;
        if high_bit_set {
            temp_a ^= modulus;
        }
        temp_b >>= 1;
    }

    Ok(result)
}

/// Multiplicative inverse via the extended Euclidean algorithm over
/// GF(2)[x], with XOR standing in for both ring operations in the Bezout
/// coefficient updates.
pub fn inverse(a: u8, modulus: u8) -> Result<u8, CipherError> {
    if a == 0 {
        return Err(CipherError::NotInvertible(0));
    }
    ensure_irreducible(modulus)?;

    let mut r0: u16 = 0x100 | modulus as u16;
    let mut r1: u16 = a as u16;
    let mut t0: u16 = 0;
    let mut t1: u16 = 1;

    while r1 != 0 {
        let q = poly_div(r0, r1)?;
        let r2 = poly_mod(r0, r1)?;
        let t2 = t0 ^ poly_mul(q, t1);

        r0 = r1;
        r1 = r2;
        t0 = t1;
        t1 = t2;
    }

    if r0 != 1 {
        return Err(CipherError::NotInvertible(a));
    }

    Ok((t0 & 0xFF) as u8)
}

fn ensure_irreducible(modulus: u8) -> Result<(), CipherError> {
    let poly = 0x100 | modulus as u16;
    if !is_irreducible_degree8(poly)? {
        return Err(CipherError::ReducibleModulus(poly));
    }
    Ok(())
}

pub(crate) fn poly_degree(poly: u16) -> i32 {
    if poly == 0 {
        return -1;
    }
    15 - poly.leading_zeros() as i32
}

pub(crate) fn poly_mod(a: u16, b: u16) -> Result<u16, CipherError> {
    if b == 0 {
        return Err(CipherError::Validation("poly_mod: division by zero".into()));
    }

    let divisor_degree = poly_degree(b);
    let mut remainder = a;
    while poly_degree(remainder) >= divisor_degree {
        let shift = (poly_degree(remainder) - divisor_degree) as u16;
        remainder ^= b << shift;
    }
    Ok(remainder)
}

pub(crate) fn poly_div(a: u16, b: u16) -> Result<u16, CipherError> {
    if b == 0 {
        return Err(CipherError::Validation("poly_div: division by zero".into()));
    }

    let divisor_degree = poly_degree(b);
    let mut quotient = 0u16;
    let mut remainder = a;
    while poly_degree(remainder) >= divisor_degree {
        let shift = poly_degree(remainder) - divisor_degree;
        quotient |= 1 << shift;
        remainder ^= b << shift;
    }
    Ok(quotient)
}

// 16-bit carry-less product; bits past 15 fall off, which the Bezout
// coefficients of degree-8 moduli never reach.
pub(crate) fn poly_mul(a: u16, b: u16) -> u16 {
    let mut result = 0u16;
    for i in 0..16 {
        if b & (1 << i) != 0 {
            result ^= a << i;
        }
    }
    result
}
