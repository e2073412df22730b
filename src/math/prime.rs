// Primality testing and random key material
// All randomness comes from the caller's RNG; nothing here touches thread-local state.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;
use tracing::{debug, trace};

use super::bigint::{mod_pow_unchecked, BigInteger};
use crate::config::PrimeConfig;
use crate::error::{CryptoError, CryptoResult};

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Uniform random integer in [low, high)
pub fn random_range<R: RngCore + ?Sized>(
    low: &BigInteger,
    high: &BigInteger,
    rng: &mut R,
) -> CryptoResult<BigInteger> {
    if low >= high {
        return Err(CryptoError::invalid(format!(
            "empty range [{}, {})",
            low, high
        )));
    }
    Ok(rng.gen_bigint_range(low, high))
}

/// Random odd integer with exactly `bits` bits (top bit forced on)
fn random_candidate<R: RngCore + ?Sized>(bits: u64, rng: &mut R) -> BigInteger {
    let top = BigUint::one() << (bits - 1);
    let candidate = rng.gen_biguint(bits) | top | BigUint::one();
    BigInteger::from(candidate)
}

/// Miller-Rabin primality test
///
/// Runs `rounds` independent random witnesses from [2, n-2] after trial division
/// by the primes below 100. A `false` answer is certain; a `true` answer is only
/// probable: a composite passes with probability at most 4^(-rounds). A `rounds`
/// value of zero is treated as one round.
pub fn is_probably_prime<R: RngCore + ?Sized>(n: &BigInteger, rounds: u32, rng: &mut R) -> bool {
    if n < &BigInteger::from(2u8) {
        return false;
    }
    for &small in SMALL_PRIMES.iter() {
        let small = BigInteger::from(small);
        if n == &small {
            return true;
        }
        if (n % &small).is_zero() {
            return false;
        }
    }

    // Write n-1 as d * 2^s with d odd
    let n_minus_one = n - 1u8;
    let mut d = n_minus_one.clone();
    let mut s = 0u32;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    let two = BigInteger::from(2u8);

    'witness: for _ in 0..rounds.max(1) {
        // a in [2, n-2]
        let a = rng.gen_bigint_range(&two, &n_minus_one);
        let mut x = mod_pow_unchecked(&a, &d, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
            if x.is_one() {
                return false;
            }
        }

        // a is a witness for compositeness
        return false;
    }

    true
}

/// Generate a random probable prime with exactly `bits` bits
///
/// Gives up with `GenerationTimeout` after `config.max_attempts` candidates, which is
/// what happens for degenerate lengths such as 1 bit.
pub fn generate_prime<R: RngCore + ?Sized>(
    bits: u64,
    config: &PrimeConfig,
    rng: &mut R,
) -> CryptoResult<BigInteger> {
    if bits == 0 {
        return Err(CryptoError::invalid("prime bit length must be positive"));
    }

    for attempt in 1..=config.max_attempts {
        let candidate = random_candidate(bits, rng);
        if is_probably_prime(&candidate, config.rounds, rng) {
            debug!("found {}-bit probable prime after {} candidates", bits, attempt);
            return Ok(candidate);
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "prime search",
        attempts: config.max_attempts,
    })
}

/// Generate a safe prime p = 2q + 1 (q also prime) with exactly `bits` bits
pub fn generate_safe_prime<R: RngCore + ?Sized>(
    bits: u64,
    config: &PrimeConfig,
    rng: &mut R,
) -> CryptoResult<BigInteger> {
    if bits < 3 {
        return Err(CryptoError::invalid("safe primes need at least 3 bits"));
    }

    for attempt in 1..=config.max_attempts {
        let q = random_candidate(bits - 1, rng);
        let p: BigInteger = (&q << 1u8) + 1u8;

        // cheap single-round screens before the full test on both halves
        if !is_probably_prime(&q, 1, rng) || !is_probably_prime(&p, 1, rng) {
            trace!("safe prime candidate {} rejected", attempt);
            continue;
        }
        if is_probably_prime(&q, config.rounds, rng) && is_probably_prime(&p, config.rounds, rng) {
            debug!("found {}-bit safe prime after {} candidates", bits, attempt);
            return Ok(p);
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "safe prime search",
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_is_probable_prime() {
        let mut rng = rng();
        for p in [2u64, 3, 5, 7, 97, 101, 7919, 65537, 2_147_483_647] {
            assert!(is_probably_prime(&BigInteger::from(p), 10, &mut rng), "{}", p);
        }
        for c in [0u64, 1, 4, 9, 91, 561, 7917, 10403, 4_294_967_297] {
            assert!(!is_probably_prime(&BigInteger::from(c), 10, &mut rng), "{}", c);
        }
        assert!(!is_probably_prime(&BigInteger::from(-7), 10, &mut rng));
    }

    #[test]
    fn test_carmichael_numbers_rejected() {
        let mut rng = rng();
        // 151 * 751 * 28351, no factor below 100 so it reaches the witness loop
        let carmichael = BigInteger::from(3_215_031_751u64);
        assert!(!is_probably_prime(&carmichael, 20, &mut rng));
    }

    #[test]
    fn test_large_primes() {
        let mut rng = rng();
        let m89 = (BigInteger::one() << 89u32) - 1u8;
        assert!(is_probably_prime(&m89, 20, &mut rng));

        let m61 = (BigInteger::one() << 61u32) - 1u8;
        assert!(!is_probably_prime(&(&m89 * &m61), 20, &mut rng));
    }

    #[test]
    fn test_zero_rounds_still_tests() {
        let mut rng = rng();
        let m61 = (BigInteger::one() << 61u32) - 1u8;
        let m31 = (BigInteger::one() << 31u32) - 1u8;
        assert!(!is_probably_prime(&(m61 * m31), 0, &mut rng));
    }

    #[test]
    fn test_generate_prime() {
        let mut rng = rng();
        let config = PrimeConfig::default();
        for bits in [2u64, 8, 16, 64, 128] {
            let p = generate_prime(bits, &config, &mut rng).unwrap();
            assert_eq!(p.bits(), bits);
            assert!(is_probably_prime(&p, 20, &mut rng));
        }
    }

    #[test]
    fn test_generate_prime_degenerate_lengths() {
        let mut rng = rng();
        let config = PrimeConfig::default().with_max_attempts(50);

        assert!(matches!(
            generate_prime(0, &config, &mut rng),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert_eq!(
            generate_prime(1, &config, &mut rng),
            Err(CryptoError::GenerationTimeout {
                what: "prime search",
                attempts: 50
            })
        );
    }

    #[test]
    fn test_generate_safe_prime() {
        let mut rng = rng();
        let config = PrimeConfig::default();
        let p = generate_safe_prime(48, &config, &mut rng).unwrap();
        assert_eq!(p.bits(), 48);
        let q: BigInteger = (&p - 1u8) >> 1u8;
        assert!(is_probably_prime(&p, 20, &mut rng));
        assert!(is_probably_prime(&q, 20, &mut rng));

        assert_eq!(generate_safe_prime(3, &config, &mut rng).unwrap(), BigInteger::from(7));
        assert!(generate_safe_prime(2, &config, &mut rng).is_err());
    }

    #[test]
    fn test_generate_safe_prime_gives_up() {
        // an all-zero source always proposes q = 2^14 + 1 = 5 * 29 * 113
        let config = PrimeConfig::default().with_max_attempts(5);
        assert_eq!(
            generate_safe_prime(16, &config, &mut StepRng::new(0, 0)),
            Err(CryptoError::GenerationTimeout {
                what: "safe prime search",
                attempts: 5
            })
        );
    }

    #[test]
    fn test_random_range() {
        let mut rng = rng();
        let low = BigInteger::from(10);
        let high = BigInteger::from(13);
        for _ in 0..100 {
            let x = random_range(&low, &high, &mut rng).unwrap();
            assert!(x >= low && x < high);
        }
        assert!(matches!(
            random_range(&high, &low, &mut rng),
            Err(CryptoError::InvalidArgument(_))
        ));
        assert!(random_range(&low, &low, &mut rng).is_err());
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let config = PrimeConfig::default();
        let a = generate_prime(64, &config, &mut rng()).unwrap();
        let b = generate_prime(64, &config, &mut rng()).unwrap();
        assert_eq!(a, b);
    }
}
