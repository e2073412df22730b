// Message Hashing
// Signatures sign integers; a MessageHasher turns message bytes into one below a bound

use num_integer::Integer;
use num_traits::Signed;
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{from_bytes, BigInteger};

/// Maps a byte message to an integer in [0, bound)
pub trait MessageHasher {
    fn hash_to_integer(&self, message: &[u8], bound: &BigInteger) -> CryptoResult<BigInteger>;
}

/// Any closure with the right shape can stand in for a hash, which keeps tests simple
impl<F> MessageHasher for F
where
    F: Fn(&[u8], &BigInteger) -> CryptoResult<BigInteger>,
{
    fn hash_to_integer(&self, message: &[u8], bound: &BigInteger) -> CryptoResult<BigInteger> {
        self(message, bound)
    }
}

/// SHA-256 digest read as a big-endian integer and reduced below the bound
///
/// Reduction discards the high bits whenever the bound is smaller than 2^256, which
/// weakens collision resistance for toy moduli.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl MessageHasher for Sha256Hasher {
    fn hash_to_integer(&self, message: &[u8], bound: &BigInteger) -> CryptoResult<BigInteger> {
        if !bound.is_positive() {
            return Err(CryptoError::invalid("hash bound must be positive"));
        }
        let digest = Sha256::digest(message);
        Ok(from_bytes(&digest).mod_floor(bound))
    }
}
