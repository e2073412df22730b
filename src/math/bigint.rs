// Big Integer Operations
// Exact signed arithmetic on num-bigint plus the modular helpers every primitive builds on

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Num, One, Signed, Zero};

use crate::error::{CryptoError, CryptoResult};

/// Arbitrary-precision signed integer with value semantics
pub type BigInteger = BigInt;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> BigInteger {
    BigInteger::from(n)
}

/// Create a non-negative big integer from big-endian bytes
pub fn from_bytes(bytes: &[u8]) -> BigInteger {
    BigInteger::from_bytes_be(Sign::Plus, bytes)
}

/// Big-endian bytes of the magnitude
pub fn to_bytes(n: &BigInteger) -> Vec<u8> {
    n.magnitude().to_bytes_be()
}

/// Parse decimal or `0x`-prefixed hexadecimal text, with an optional sign
pub fn parse(text: &str) -> CryptoResult<BigInteger> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let (radix, digits) = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, unsigned),
    };

    // from_str_radix tolerates leading signs and `_` separators
    if digits.is_empty()
        || digits.starts_with(|c: char| c == '+' || c == '-')
        || digits.contains('_')
    {
        return Err(CryptoError::invalid(format!("not an integer: {:?}", text)));
    }

    let magnitude = BigUint::from_str_radix(digits, radix)
        .map_err(|_| CryptoError::invalid(format!("not an integer: {:?}", text)))?;
    let value = BigInteger::from(magnitude);

    Ok(if negative { -value } else { value })
}

/// Lower-case hexadecimal rendering (no prefix)
pub fn to_hex(n: &BigInteger) -> String {
    n.to_str_radix(16)
}

/// True when `low <= value < high`
pub fn in_range(value: &BigInteger, low: &BigInteger, high: &BigInteger) -> bool {
    value >= low && value < high
}

/// a + b
pub fn add(a: &BigInteger, b: &BigInteger) -> BigInteger {
    a + b
}

/// a - b
pub fn sub(a: &BigInteger, b: &BigInteger) -> BigInteger {
    a - b
}

/// a * b
pub fn mul(a: &BigInteger, b: &BigInteger) -> BigInteger {
    a * b
}

/// Floored division: returns (q, r) with a = q*b + r and r carrying the sign of b
pub fn divmod(a: &BigInteger, b: &BigInteger) -> CryptoResult<(BigInteger, BigInteger)> {
    if b.is_zero() {
        return Err(CryptoError::invalid("division by zero"));
    }
    Ok(a.div_mod_floor(b))
}

fn check_modulus(modulus: &BigInteger) -> CryptoResult<()> {
    if !modulus.is_positive() {
        return Err(CryptoError::invalid(format!(
            "modulus must be positive, got {}",
            modulus
        )));
    }
    Ok(())
}

/// Modular exponentiation: base^exponent mod modulus
/// Square-and-multiply, O(log exponent) multiplications. Result lies in [0, modulus).
pub fn mod_pow(
    base: &BigInteger,
    exponent: &BigInteger,
    modulus: &BigInteger,
) -> CryptoResult<BigInteger> {
    check_modulus(modulus)?;
    if exponent.is_negative() {
        return Err(CryptoError::invalid("exponent must be non-negative"));
    }
    Ok(mod_pow_unchecked(base, exponent, modulus))
}

/// Square-and-multiply without argument checks.
/// Callers guarantee `modulus > 0` and `exponent >= 0`.
pub(crate) fn mod_pow_unchecked(
    base: &BigInteger,
    exponent: &BigInteger,
    modulus: &BigInteger,
) -> BigInteger {
    if modulus.is_one() {
        return BigInteger::zero();
    }

    let mut result = BigInteger::one();
    let mut base = base.mod_floor(modulus);
    let mut exp = exponent.clone();

    while !exp.is_zero() {
        if exp.is_odd() {
            result = (&result * &base) % modulus;
        }
        base = (&base * &base) % modulus;
        exp >>= 1;
    }

    result
}

/// Extended Euclidean Algorithm
/// Returns (gcd, x, y) such that a*x + b*y = gcd, with gcd >= 0
pub fn extended_gcd(a: &BigInteger, b: &BigInteger) -> (BigInteger, BigInteger, BigInteger) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_x, mut x) = (BigInteger::one(), BigInteger::zero());
    let (mut old_y, mut y) = (BigInteger::zero(), BigInteger::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;

        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_x = &old_x - &quotient * &x;
        old_x = std::mem::replace(&mut x, next_x);

        let next_y = &old_y - &quotient * &y;
        old_y = std::mem::replace(&mut y, next_y);
    }

    if old_r.is_negative() {
        (-old_r, -old_x, -old_y)
    } else {
        (old_r, old_x, old_y)
    }
}

/// Compute modular inverse: value^(-1) mod modulus, in [0, modulus)
/// Fails with `NotInvertible` when gcd(value, modulus) != 1
pub fn mod_inverse(value: &BigInteger, modulus: &BigInteger) -> CryptoResult<BigInteger> {
    check_modulus(modulus)?;

    let (gcd, x, _) = extended_gcd(&value.mod_floor(modulus), modulus);
    if !gcd.is_one() {
        return Err(CryptoError::NotInvertible {
            value: value.clone(),
            modulus: modulus.clone(),
        });
    }

    Ok(x.mod_floor(modulus))
}

/// Greatest common divisor (Euclid), always non-negative
pub fn gcd(a: &BigInteger, b: &BigInteger) -> BigInteger {
    let mut a = a.abs();
    let mut b = b.abs();
    while !b.is_zero() {
        let r = &a % &b;
        a = std::mem::replace(&mut b, r);
    }
    a
}

/// Least common multiple, always non-negative
pub fn lcm(a: &BigInteger, b: &BigInteger) -> BigInteger {
    if a.is_zero() || b.is_zero() {
        return BigInteger::zero();
    }
    (a * b).abs() / gcd(a, b)
}
