// Diffie-Hellman Group Parameters
// A prime modulus p, a generator g, and (when known) the order q of the subgroup g spans

use num_traits::One;
use rand::RngCore;
use tracing::debug;

use crate::config::PrimeConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{mod_pow_unchecked, parse, BigInteger};
use crate::math::prime::{generate_safe_prime, is_probably_prime};

/// RFC 3526 MODP Group 14 prime (2048 bits)
const MODP_2048_PRIME: &str = "0xFFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

/// Group parameters for key exchange and the discrete-log schemes built on it
///
/// `new` only checks the bounds `p >= 5` and `1 < g < p - 1`. Primality of `p` is the
/// caller's claim; use [`GroupParameters::is_prime`] to re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParameters {
    p: BigInteger,
    g: BigInteger,
    order: Option<BigInteger>,
}

impl GroupParameters {
    /// Check the bounds p >= 5 and 1 < g < p - 1
    pub fn new(p: BigInteger, g: BigInteger) -> CryptoResult<Self> {
        if p < BigInteger::from(5u8) {
            return Err(CryptoError::invalid("group modulus must be at least 5"));
        }
        let p_minus_one = &p - 1u8;
        if g <= BigInteger::one() || g >= p_minus_one {
            return Err(CryptoError::invalid("generator must satisfy 1 < g < p - 1"));
        }
        Ok(Self { p, g, order: None })
    }

    /// Record the order of the subgroup generated by `g`, enabling membership checks
    pub fn with_order(mut self, order: BigInteger) -> CryptoResult<Self> {
        if order <= BigInteger::one() || order >= self.p {
            return Err(CryptoError::invalid("subgroup order must satisfy 1 < q < p"));
        }
        if !mod_pow_unchecked(&self.g, &order, &self.p).is_one() {
            return Err(CryptoError::invalid("g^q mod p != 1 for the claimed order"));
        }
        self.order = Some(order);
        Ok(self)
    }

    /// The textbook group p = 23, g = 5. Only for demonstrations.
    pub fn toy() -> Self {
        Self {
            p: BigInteger::from(23u8),
            g: BigInteger::from(5u8),
            order: None,
        }
    }

    /// RFC 3526 group 14: a 2048-bit safe prime with g = 2 spanning the order-(p-1)/2 subgroup
    pub fn modp_2048() -> CryptoResult<Self> {
        let p = parse(MODP_2048_PRIME)?;
        let q = (&p - 1u8) >> 1u8;
        Self::new(p, BigInteger::from(2u8))?.with_order(q)
    }

    /// Fresh safe-prime group of `bits` bits
    ///
    /// The generator is the smallest g >= 2 of order q = (p-1)/2, so every public value
    /// lives in the prime-order subgroup.
    pub fn generate<R: RngCore + ?Sized>(
        bits: u64,
        config: &PrimeConfig,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        if bits < 4 {
            return Err(CryptoError::invalid("group modulus needs at least 4 bits"));
        }
        let p = generate_safe_prime(bits, config, rng)?;
        let q: BigInteger = (&p - 1u8) >> 1u8;

        // 4 = 2^2 always has order q, so the search stops there at the latest
        let g = (2u8..=4)
            .map(BigInteger::from)
            .find(|g| mod_pow_unchecked(g, &q, &p).is_one())
            .ok_or_else(|| CryptoError::invalid("no generator of the order-q subgroup"))?;

        debug!("generated {}-bit group with g = {}", bits, g);
        Self::new(p, g)?.with_order(q)
    }

    /// Prime modulus
    pub fn p(&self) -> &BigInteger {
        &self.p
    }

    /// Generator
    pub fn g(&self) -> &BigInteger {
        &self.g
    }

    /// Order of the subgroup g spans, when known
    pub fn order(&self) -> Option<&BigInteger> {
        self.order.as_ref()
    }

    /// p - 1, the exponent modulus for the full group
    pub fn p_minus_one(&self) -> BigInteger {
        &self.p - 1u8
    }

    /// Re-run Miller-Rabin on the modulus
    pub fn is_prime<R: RngCore + ?Sized>(&self, rounds: u32, rng: &mut R) -> bool {
        is_probably_prime(&self.p, rounds, rng)
    }
}
