// RSA Key Generation
// Implements RSA key pair generation (public and private keys)

use std::fmt;

use num_traits::One;
use rand::RngCore;
use tracing::{debug, trace};

use crate::config::{RsaConfig, Totient};
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{gcd, lcm, mod_inverse, BigInteger};
use crate::math::prime::generate_prime;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: BigInteger, // Modulus
    pub e: BigInteger, // Public exponent
}

/// Pre-computed values for faster decryption
#[derive(Clone, PartialEq, Eq)]
pub struct CrtComponents {
    pub p: BigInteger,     // First prime factor
    pub q: BigInteger,     // Second prime factor
    pub d_p: BigInteger,   // d mod (p-1)
    pub d_q: BigInteger,   // d mod (q-1)
    pub q_inv: BigInteger, // q^(-1) mod p
}

/// RSA Private Key
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: BigInteger, // Modulus (same as public)
    pub d: BigInteger, // Private exponent
    pub crt: Option<CrtComponents>,
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
}

fn check_key_parts(n: &BigInteger, exponent: &BigInteger) -> CryptoResult<()> {
    if n < &BigInteger::from(3u8) {
        return Err(CryptoError::invalid("RSA modulus must be at least 3"));
    }
    if exponent <= &BigInteger::one() {
        return Err(CryptoError::invalid("RSA exponent must be greater than 1"));
    }
    Ok(())
}

impl RsaPublicKey {
    pub fn new(n: BigInteger, e: BigInteger) -> CryptoResult<Self> {
        check_key_parts(&n, &e)?;
        Ok(Self { n, e })
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt an integer message in [0, n)
    pub fn encrypt(&self, message: &BigInteger) -> CryptoResult<BigInteger> {
        super::encrypt::encrypt(message, self)
    }

    /// Check a signature over an integer hash
    pub fn verify(&self, hash: &BigInteger, signature: &BigInteger) -> bool {
        super::sign::verify(hash, signature, self)
    }
}

impl RsaPrivateKey {
    /// Private key from (d, n) alone; decryption uses plain exponentiation
    pub fn new(n: BigInteger, d: BigInteger) -> CryptoResult<Self> {
        check_key_parts(&n, &d)?;
        Ok(Self { n, d, crt: None })
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt an integer ciphertext in [0, n)
    pub fn decrypt(&self, ciphertext: &BigInteger) -> CryptoResult<BigInteger> {
        super::decrypt::decrypt(ciphertext, self)
    }

    /// Sign an integer hash in [0, n)
    pub fn sign(&self, hash: &BigInteger) -> CryptoResult<BigInteger> {
        super::sign::sign(hash, self)
    }

    /// Copy of this key without the CRT components
    pub fn without_crt(&self) -> Self {
        Self {
            n: self.n.clone(),
            d: self.d.clone(),
            crt: None,
        }
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("n", &self.n)
            .field("crt", &self.crt.is_some())
            .finish_non_exhaustive()
    }
}

/// Order of the group the exponents live in: lcm(p-1, q-1) or (p-1)(q-1)
pub fn totient(p: &BigInteger, q: &BigInteger, variant: Totient) -> BigInteger {
    let p_minus_1 = p - 1u8;
    let q_minus_1 = q - 1u8;
    match variant {
        Totient::Carmichael => lcm(&p_minus_1, &q_minus_1),
        Totient::Euler => p_minus_1 * q_minus_1,
    }
}

impl RsaKeyPair {
    /// Assemble a key pair from two known distinct primes and a public exponent
    ///
    /// The primes are trusted; nothing here re-checks their primality.
    pub fn from_primes(
        p: BigInteger,
        q: BigInteger,
        e: BigInteger,
        variant: Totient,
    ) -> CryptoResult<Self> {
        if p == q {
            return Err(CryptoError::invalid("RSA primes must be distinct"));
        }
        if p <= BigInteger::one() || q <= BigInteger::one() {
            return Err(CryptoError::invalid("RSA primes must be greater than 1"));
        }

        // Step 1: n = p * q
        let n = &p * &q;
        check_key_parts(&n, &e)?;

        // Step 2: d = e^(-1) mod λ, which fails unless gcd(e, λ) = 1
        let lambda = totient(&p, &q, variant);
        let d = mod_inverse(&e, &lambda)?;

        // Step 3: CRT parameters for faster decryption
        let d_p = &d % (&p - 1u8);
        let d_q = &d % (&q - 1u8);
        let q_inv = mod_inverse(&q, &p)?;

        let public_key = RsaPublicKey { n: n.clone(), e };
        let private_key = RsaPrivateKey {
            n,
            d,
            crt: Some(CrtComponents {
                p,
                q,
                d_p,
                d_q,
                q_inv,
            }),
        };

        Ok(RsaKeyPair {
            public_key,
            private_key,
        })
    }

    /// Get the bit length of the key
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }
}

/// Generate an RSA key pair
///
/// Draws two primes of `config.prime_bits` bits and uses the first exponent from
/// `config.exponent_candidates()` that is coprime to the totient. A pair of equal primes,
/// or a totient that shares a factor with every candidate, triggers a redraw;
/// after `config.max_key_attempts` draws the search gives up.
pub fn generate_keypair<R: RngCore + ?Sized>(
    config: &RsaConfig,
    rng: &mut R,
) -> CryptoResult<RsaKeyPair> {
    for attempt in 1..=config.max_key_attempts {
        let p = generate_prime(config.prime_bits, &config.prime, rng)?;
        let q = generate_prime(config.prime_bits, &config.prime, rng)?;

        if p == q {
            trace!("drew the same prime twice, redrawing");
            continue;
        }

        let lambda = totient(&p, &q, config.totient);
        let e = config
            .exponent_candidates()
            .filter(|&e| e > 1)
            .map(BigInteger::from)
            .find(|e| gcd(e, &lambda).is_one());

        let e = match e {
            Some(e) => e,
            None => {
                debug!("no public exponent candidate is coprime to the totient, redrawing");
                continue;
            }
        };
        if e != BigInteger::from(config.public_exponent) {
            debug!("e = {} shares a factor with the totient, using e = {}", config.public_exponent, e);
        }

        let keypair = RsaKeyPair::from_primes(p, q, e, config.totient)?;
        debug!(
            "generated {}-bit RSA key after {} attempt(s)",
            keypair.bit_length(),
            attempt
        );
        return Ok(keypair);
    }

    Err(CryptoError::GenerationTimeout {
        what: "RSA key generation",
        attempts: config.max_key_attempts,
    })
}
