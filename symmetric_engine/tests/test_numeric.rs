use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use symmetric_engine::numeric::{extended_gcd, gcd, mod_pow};

fn big(n: u64) -> BigUint {
    BigUint::from(n)
}

#[test]
fn gcd_basics() {
    assert_eq!(gcd(&big(48), &big(18)), big(6));
    assert_eq!(gcd(&big(17), &big(31)), big(1));
    assert_eq!(gcd(&big(0), &big(5)), big(5));
    assert_eq!(gcd(&big(12), &big(0)), big(12));
}

#[test]
fn extended_gcd_satisfies_bezout() {
    let a = BigInt::from(240);
    let b = BigInt::from(46);

    let (g, x, y) = extended_gcd(&a, &b);
    assert_eq!(g, BigInt::from(2));
    assert_eq!(&a * &x + &b * &y, g);
}

#[test]
fn mod_pow_matches_known_values() {
    assert_eq!(mod_pow(&big(4), &big(13), &big(497)), big(445));
    assert_eq!(mod_pow(&big(2), &big(10), &big(1000)), big(24));
    assert_eq!(mod_pow(&big(7), &big(0), &big(13)), BigUint::one());
    assert_eq!(mod_pow(&big(7), &big(5), &big(0)), BigUint::zero());
}

#[test]
fn mod_pow_fermat_little_theorem() {
    // a^(p-1) = 1 mod p for prime p and a not divisible by p
    let p = big(104_729);
    for a in [2u64, 3, 65_537] {
        assert_eq!(mod_pow(&big(a), &(&p - 1u32), &p), BigUint::one());
    }
}
