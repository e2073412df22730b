// Paillier Encryption
// Additively homomorphic: multiplying ciphertexts adds the plaintexts mod n

use std::fmt;

use num_traits::One;
use rand::RngCore;
use tracing::{debug, trace};

use crate::config::PrimeConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{gcd, in_range, lcm, mod_inverse, mod_pow, BigInteger};
use crate::math::prime::{generate_prime, random_range};

/// Prime pairs drawn before key generation gives up
const KEY_ATTEMPTS: u32 = 16;
/// Nonces drawn before encryption gives up
const NONCE_ATTEMPTS: u32 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaillierPublicKey {
    pub n: BigInteger,
    pub n_squared: BigInteger,
    pub g: BigInteger, // n + 1
}

#[derive(Clone, PartialEq, Eq)]
pub struct PaillierPrivateKey {
    lambda: BigInteger, // lcm(p-1, q-1)
    mu: BigInteger,     // L(g^lambda mod n^2)^(-1) mod n
    n: BigInteger,
    n_squared: BigInteger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaillierKeyPair {
    pub public_key: PaillierPublicKey,
    pub private_key: PaillierPrivateKey,
}

impl fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}

/// L(x) = (x - 1) / n
fn l_function(x: &BigInteger, n: &BigInteger) -> BigInteger {
    (x - 1u8) / n
}

impl PaillierKeyPair {
    /// Build keys from two distinct primes with gcd(pq, (p-1)(q-1)) = 1
    pub fn from_primes(p: &BigInteger, q: &BigInteger) -> CryptoResult<Self> {
        if p == q {
            return Err(CryptoError::invalid("Paillier primes must be distinct"));
        }
        let p_minus_1 = p - 1u8;
        let q_minus_1 = q - 1u8;
        let n = p * q;
        if !gcd(&n, &(&p_minus_1 * &q_minus_1)).is_one() {
            return Err(CryptoError::invalid("gcd(n, (p-1)(q-1)) must be 1"));
        }

        let n_squared = &n * &n;
        let g = &n + 1u8;
        let lambda = lcm(&p_minus_1, &q_minus_1);
        let u = mod_pow(&g, &lambda, &n_squared)?;
        let mu = mod_inverse(&l_function(&u, &n), &n)?;

        Ok(Self {
            public_key: PaillierPublicKey {
                n: n.clone(),
                n_squared: n_squared.clone(),
                g,
            },
            private_key: PaillierPrivateKey {
                lambda,
                mu,
                n,
                n_squared,
            },
        })
    }
}

/// Generate a key pair whose modulus is the product of two `prime_bits`-bit primes
pub fn generate_keypair<R: RngCore + ?Sized>(
    prime_bits: u64,
    config: &PrimeConfig,
    rng: &mut R,
) -> CryptoResult<PaillierKeyPair> {
    for attempt in 1..=KEY_ATTEMPTS {
        let p = generate_prime(prime_bits, config, rng)?;
        let q = generate_prime(prime_bits, config, rng)?;
        match PaillierKeyPair::from_primes(&p, &q) {
            Ok(keypair) => {
                debug!("generated Paillier key after {} attempt(s)", attempt);
                return Ok(keypair);
            }
            Err(CryptoError::InvalidArgument(reason)) => {
                trace!("rejected Paillier primes: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "Paillier key generation",
        attempts: KEY_ATTEMPTS,
    })
}

/// Encrypt m in [0, n) as g^m * r^n mod n^2 with a random r in [2, n) coprime to n
///
/// r = 1 is never drawn: it makes the ciphertext 1 + m*n, readable without the key.
pub fn encrypt<R: RngCore + ?Sized>(
    message: &BigInteger,
    public_key: &PaillierPublicKey,
    rng: &mut R,
) -> CryptoResult<BigInteger> {
    let two = BigInteger::from(2u8);
    for _ in 0..NONCE_ATTEMPTS {
        let r = random_range(&two, &public_key.n, rng)?;
        if gcd(&r, &public_key.n).is_one() {
            return encrypt_with_nonce(message, public_key, &r);
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "Paillier nonce search",
        attempts: NONCE_ATTEMPTS,
    })
}

pub(crate) fn encrypt_with_nonce(
    message: &BigInteger,
    public_key: &PaillierPublicKey,
    r: &BigInteger,
) -> CryptoResult<BigInteger> {
    if !in_range(message, &BigInteger::from(0u8), &public_key.n) {
        return Err(CryptoError::MessageTooLarge);
    }
    let n_squared = &public_key.n_squared;
    let term1 = mod_pow(&public_key.g, message, n_squared)?;
    let term2 = mod_pow(r, &public_key.n, n_squared)?;
    Ok((term1 * term2) % n_squared)
}

/// m = L(c^lambda mod n^2) * mu mod n
pub fn decrypt(ciphertext: &BigInteger, private_key: &PaillierPrivateKey) -> CryptoResult<BigInteger> {
    if !in_range(ciphertext, &BigInteger::one(), &private_key.n_squared) {
        return Err(CryptoError::invalid("ciphertext out of range"));
    }
    let x = mod_pow(ciphertext, &private_key.lambda, &private_key.n_squared)?;
    Ok((l_function(&x, &private_key.n) * &private_key.mu) % &private_key.n)
}

/// Ciphertext of m1 + m2 mod n
pub fn add(c1: &BigInteger, c2: &BigInteger, public_key: &PaillierPublicKey) -> BigInteger {
    (c1 * c2) % &public_key.n_squared
}

/// Ciphertext of k * m mod n
pub fn mul_plain(
    ciphertext: &BigInteger,
    k: &BigInteger,
    public_key: &PaillierPublicKey,
) -> CryptoResult<BigInteger> {
    mod_pow(ciphertext, k, &public_key.n_squared)
}
