// Pedersen Commitments
// C = g^v * h^r mod p in a subgroup of prime order q, with log_g(h) unknown to everyone

use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dh::GroupParameters;
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{from_bytes, mod_pow, BigInteger};
use crate::math::prime::random_range;

/// Counter values tried per base before giving up
const HASH_TO_GROUP_ATTEMPTS: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedersenParams {
    p: BigInteger,
    q: BigInteger,
    g: BigInteger,
    h: BigInteger,
}

/// Hash a label into the order-q subgroup: SHA-256(label || counter) raised to (p-1)/q
fn hash_to_subgroup(
    label: &[u8],
    p: &BigInteger,
    cofactor: &BigInteger,
    avoid: Option<&BigInteger>,
) -> CryptoResult<BigInteger> {
    for counter in 0..HASH_TO_GROUP_ATTEMPTS {
        let mut hasher = Sha256::new();
        hasher.update(label);
        hasher.update(counter.to_be_bytes());
        let seed = from_bytes(&hasher.finalize()).mod_floor(p);

        let element = mod_pow(&seed, cofactor, p)?;
        if element > BigInteger::one() && Some(&element) != avoid {
            debug!(
                "derived base from {:?} after {} attempt(s)",
                String::from_utf8_lossy(label),
                counter + 1
            );
            return Ok(element);
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "hash to subgroup",
        attempts: HASH_TO_GROUP_ATTEMPTS,
    })
}

impl PedersenParams {
    /// Derive independent bases g and h from a group of known prime order
    pub fn derive(group: &GroupParameters) -> CryptoResult<Self> {
        let q = group
            .order()
            .ok_or_else(|| CryptoError::invalid("Pedersen commitments need a group of known order"))?
            .clone();
        let p = group.p().clone();

        let (cofactor, remainder) = (&p - 1u8).div_rem(&q);
        if !remainder.is_zero() {
            return Err(CryptoError::invalid("subgroup order must divide p - 1"));
        }

        let g = hash_to_subgroup(b"pedersen-g", &p, &cofactor, None)?;
        let h = hash_to_subgroup(b"pedersen-h", &p, &cofactor, Some(&g))?;

        Ok(Self { p, q, g, h })
    }

    /// Prime modulus
    pub fn p(&self) -> &BigInteger {
        &self.p
    }

    /// Prime order of the commitment subgroup
    pub fn q(&self) -> &BigInteger {
        &self.q
    }

    /// Commit to a value with a fresh blinding factor r in [1, q)
    /// Returns (commitment, r); both are needed to open the commitment later.
    pub fn commit<R: RngCore + ?Sized>(
        &self,
        value: &BigInteger,
        rng: &mut R,
    ) -> CryptoResult<(BigInteger, BigInteger)> {
        let r = random_range(&BigInteger::one(), &self.q, rng)?;
        let commitment = self.commit_with_blinding(value, &r)?;
        Ok((commitment, r))
    }

    /// g^(v mod q) * h^(r mod q) mod p
    pub fn commit_with_blinding(
        &self,
        value: &BigInteger,
        blinding: &BigInteger,
    ) -> CryptoResult<BigInteger> {
        let g_v = mod_pow(&self.g, &value.mod_floor(&self.q), &self.p)?;
        let h_r = mod_pow(&self.h, &blinding.mod_floor(&self.q), &self.p)?;
        Ok((g_v * h_r) % &self.p)
    }

    /// Check that (value, blinding) opens the commitment
    pub fn verify(&self, commitment: &BigInteger, value: &BigInteger, blinding: &BigInteger) -> bool {
        matches!(self.commit_with_blinding(value, blinding), Ok(expected) if &expected == commitment)
    }

    /// Product of two commitments: opens to (v1 + v2, r1 + r2)
    pub fn combine(&self, c1: &BigInteger, c2: &BigInteger) -> BigInteger {
        (c1 * c2) % &self.p
    }
}
