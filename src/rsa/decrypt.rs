// RSA Decryption Implementation
// Implements RSA decryption with Chinese Remainder Theorem (CRT) optimization

use num_integer::Integer;

use super::encrypt::check_below_modulus;
use super::keygen::{CrtComponents, RsaPrivateKey};
use crate::error::CryptoResult;
use crate::math::bigint::{mod_pow, BigInteger};

/// Decrypt an integer ciphertext with the private key
/// Requires 0 <= ciphertext < n; returns ciphertext^d mod n
pub fn decrypt(ciphertext: &BigInteger, private_key: &RsaPrivateKey) -> CryptoResult<BigInteger> {
    check_below_modulus(ciphertext, &private_key.n)?;
    private_op(ciphertext, private_key)
}

/// value^d mod n, through CRT when the factors are known
pub(crate) fn private_op(value: &BigInteger, key: &RsaPrivateKey) -> CryptoResult<BigInteger> {
    match &key.crt {
        Some(crt) => decrypt_crt(value, crt),
        None => mod_pow(value, &key.d, &key.n),
    }
}

/// Decrypt using Chinese Remainder Theorem (CRT)
/// This is faster than regular decryption because we work with smaller numbers
fn decrypt_crt(c: &BigInteger, key: &CrtComponents) -> CryptoResult<BigInteger> {
    // m1 = c^d_p mod p
    let m1 = mod_pow(c, &key.d_p, &key.p)?;

    // m2 = c^d_q mod q
    let m2 = mod_pow(c, &key.d_q, &key.q)?;

    // h = (m1 - m2) * q_inv mod p
    let h = ((m1 - &m2) * &key.q_inv).mod_floor(&key.p);

    // m = m2 + q * h, already below n = p * q
    Ok(m2 + &key.q * h)
}
