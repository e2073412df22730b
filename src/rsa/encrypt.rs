// RSA Encryption Implementation
// Textbook RSA: c = m^e mod n with no padding

use super::keygen::RsaPublicKey;
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{in_range, mod_pow, BigInteger};

/// Reject values outside [0, n)
pub(crate) fn check_below_modulus(value: &BigInteger, n: &BigInteger) -> CryptoResult<()> {
    if !in_range(value, &BigInteger::from(0u8), n) {
        return Err(CryptoError::MessageTooLarge);
    }
    Ok(())
}

/// Encrypt an integer message with the public key
/// Requires 0 <= message < n; returns message^e mod n
pub fn encrypt(message: &BigInteger, public_key: &RsaPublicKey) -> CryptoResult<BigInteger> {
    check_below_modulus(message, &public_key.n)?;
    mod_pow(message, &public_key.e, &public_key.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Totient;
    use crate::rsa::keygen::RsaKeyPair;

    fn big(n: u64) -> BigInteger {
        BigInteger::from(n)
    }

    fn textbook_key() -> RsaPublicKey {
        RsaKeyPair::from_primes(big(61), big(53), big(17), Totient::Euler)
            .unwrap()
            .public_key
    }

    #[test]
    fn test_encrypt_textbook() {
        let key = textbook_key();
        assert_eq!(encrypt(&big(65), &key).unwrap(), big(2790));
        assert_eq!(key.encrypt(&big(65)).unwrap(), big(2790));
    }

    #[test]
    fn test_encrypt_fixed_points() {
        // 0, 1 and n-1 encrypt to themselves for odd e
        let key = textbook_key();
        for m in [0u64, 1, 3232] {
            assert_eq!(encrypt(&big(m), &key).unwrap(), big(m));
        }
    }

    #[test]
    fn test_encrypt_out_of_range() {
        let key = textbook_key();
        assert_eq!(encrypt(&big(3233), &key), Err(CryptoError::MessageTooLarge));
        assert_eq!(encrypt(&big(100_000), &key), Err(CryptoError::MessageTooLarge));
        assert_eq!(
            encrypt(&BigInteger::from(-1), &key),
            Err(CryptoError::MessageTooLarge)
        );
    }
}
