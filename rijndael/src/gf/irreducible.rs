use symmetric_engine::crypto::errors::CipherError;

use crate::gf::arithmetic::{poly_degree, poly_div, poly_mod};

/// Irreducibility over GF(2) by recursive trial division: a polynomial is
/// reducible iff some irreducible of at most half its degree divides it.
/// Even polynomials are divisible by x; the only irreducible of degree 1
/// is x + 1 (`0x3`).
pub fn is_irreducible(poly: u16) -> Result<bool, CipherError> {
    if poly == 0 {
        return Err(CipherError::Validation(
            "is_irreducible: polynomial must not be zero".into(),
        ));
    }

    let degree = poly_degree(poly);
    if degree <= 0 {
        return Ok(false);
    }
    if poly & 1 == 0 {
        return Ok(false);
    }
    if degree == 1 {
        return Ok(poly == 0x3);
    }

    let max_divisor_degree = degree / 2;
    let mut divisor: u16 = 0x3;
    while poly_degree(divisor) <= max_divisor_degree {
        if is_irreducible(divisor)? && poly_mod(poly, divisor)? == 0 {
            return Ok(false);
        }
        divisor += 2;
    }

    Ok(true)
}

/// Same check restricted to the 9-bit form `0x100..=0x1FF` a field modulus
/// must take.
pub fn is_irreducible_degree8(poly: u16) -> Result<bool, CipherError> {
    if !(0x100..=0x1FF).contains(&poly) {
        return Err(CipherError::Validation(format!(
            "is_irreducible_degree8: polynomial 0x{poly:03X} must be of degree 8"
        )));
    }
    is_irreducible(poly)
}

/// All irreducible degree-8 polynomials; there are exactly 30.
pub fn list_irreducible_degree8() -> Result<Vec<u16>, CipherError> {
    let mut result = Vec::with_capacity(30);
    let mut poly = 0x101u16;
    while poly < 0x200 {
        if is_irreducible(poly)? {
            result.push(poly);
        }
        poly += 2;
    }
    Ok(result)
}

/// Splits `poly` into irreducible factors by repeated trial division.
pub fn factorize(poly: u16) -> Result<Vec<u16>, CipherError> {
    if poly == 0 {
        return Err(CipherError::Validation(
            "factorize: cannot factorize the zero polynomial".into(),
        ));
    }

    let mut factors = Vec::new();
    let mut current = poly;
    let mut divisor = 0x3u16;

    while divisor <= current && current > 1 {
        if is_irreducible(divisor)? && poly_mod(current, divisor)? == 0 {
            factors.push(divisor);
            current = poly_div(current, divisor)?;
            continue;
        }
        divisor = if divisor == 0x3 { 0x7 } else { divisor + 2 };
    }

    if current > 1 {
        factors.push(current);
    }

    Ok(factors)
}
