// ElGamal Encryption and Signatures
// Both reuse a Diffie-Hellman key pair: x private, y = g^x mod p public

use num_integer::Integer;
use num_traits::{One, Zero};
use rand::RngCore;

use crate::dh::{validate_public_value, DhKeyPair, GroupParameters};
use crate::error::{CryptoError, CryptoResult};
use crate::hash::MessageHasher;
use crate::math::bigint::{from_bytes, gcd, in_range, mod_inverse, mod_pow, to_bytes, BigInteger};
use crate::math::prime::random_range;

/// Nonces drawn before signing gives up
const NONCE_ATTEMPTS: u32 = 1_000;
/// Leading byte of an encoded byte message; keeps leading zeros and makes m >= 1
const BYTES_MARKER: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalCiphertext {
    pub c1: BigInteger, // g^k
    pub c2: BigInteger, // m * y^k
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElGamalSignature {
    pub r: BigInteger,
    pub s: BigInteger,
}

/// Encrypt m in [1, p) to the holder of `recipient`
///
/// A fresh k in [2, p-2] makes encryption randomized, unlike textbook RSA.
pub fn encrypt<R: RngCore + ?Sized>(
    message: &BigInteger,
    recipient: &BigInteger,
    params: &GroupParameters,
    rng: &mut R,
) -> CryptoResult<ElGamalCiphertext> {
    let k = random_range(&BigInteger::from(2u8), &params.p_minus_one(), rng)?;
    encrypt_with_nonce(message, recipient, params, &k)
}

pub(crate) fn encrypt_with_nonce(
    message: &BigInteger,
    recipient: &BigInteger,
    params: &GroupParameters,
    k: &BigInteger,
) -> CryptoResult<ElGamalCiphertext> {
    let p = params.p();
    if !in_range(message, &BigInteger::one(), p) {
        return Err(CryptoError::MessageTooLarge);
    }
    validate_public_value(params, recipient)?;

    let c1 = mod_pow(params.g(), k, p)?;
    let mask = mod_pow(recipient, k, p)?;
    let c2 = (message * mask) % p;

    Ok(ElGamalCiphertext { c1, c2 })
}

/// Recover m = c2 * (c1^x)^(-1) mod p
pub fn decrypt(ciphertext: &ElGamalCiphertext, keypair: &DhKeyPair) -> CryptoResult<BigInteger> {
    let p = keypair.params().p();
    let one = BigInteger::one();
    if !in_range(&ciphertext.c1, &one, p) || !in_range(&ciphertext.c2, &one, p) {
        return Err(CryptoError::invalid("ciphertext component out of range"));
    }

    let mask = mod_pow(&ciphertext.c1, keypair.private_exponent(), p)?;
    let mask_inv = mod_inverse(&mask, p)?;
    Ok((&ciphertext.c2 * mask_inv) % p)
}

/// Encrypt a byte string, encoded as the integer 0x01 || bytes
///
/// Fails with `MessageTooLarge` when the encoding does not fit below p.
pub fn encrypt_bytes<R: RngCore + ?Sized>(
    message: &[u8],
    recipient: &BigInteger,
    params: &GroupParameters,
    rng: &mut R,
) -> CryptoResult<ElGamalCiphertext> {
    encrypt(&encode_bytes(message), recipient, params, rng)
}

/// Inverse of [`encrypt_bytes`]
pub fn decrypt_bytes(ciphertext: &ElGamalCiphertext, keypair: &DhKeyPair) -> CryptoResult<Vec<u8>> {
    decode_bytes(&decrypt(ciphertext, keypair)?)
}

fn encode_bytes(message: &[u8]) -> BigInteger {
    let mut encoded = Vec::with_capacity(message.len() + 1);
    encoded.push(BYTES_MARKER);
    encoded.extend_from_slice(message);
    from_bytes(&encoded)
}

fn decode_bytes(m: &BigInteger) -> CryptoResult<Vec<u8>> {
    let mut encoded = to_bytes(m);
    if encoded.first() != Some(&BYTES_MARKER) {
        return Err(CryptoError::invalid("plaintext is not an encoded byte message"));
    }
    encoded.remove(0);
    Ok(encoded)
}

/// Sign a hash; it is reduced mod p-1 first
///
/// The nonce k must be coprime to p-1 and must never repeat across signatures:
/// two signatures sharing k reveal x.
pub fn sign<R: RngCore + ?Sized>(
    hash: &BigInteger,
    keypair: &DhKeyPair,
    rng: &mut R,
) -> CryptoResult<ElGamalSignature> {
    let p_minus_one = keypair.params().p_minus_one();
    let two = BigInteger::from(2u8);

    for _ in 0..NONCE_ATTEMPTS {
        let k = random_range(&two, &p_minus_one, rng)?;
        if !gcd(&k, &p_minus_one).is_one() {
            continue;
        }
        if let Some(signature) = sign_with_nonce(hash, keypair, &k)? {
            return Ok(signature);
        }
    }

    Err(CryptoError::GenerationTimeout {
        what: "ElGamal nonce search",
        attempts: NONCE_ATTEMPTS,
    })
}

/// r = g^k, s = (h - x*r) * k^(-1) mod (p-1); `None` when s comes out as zero
pub(crate) fn sign_with_nonce(
    hash: &BigInteger,
    keypair: &DhKeyPair,
    k: &BigInteger,
) -> CryptoResult<Option<ElGamalSignature>> {
    let params = keypair.params();
    let p_minus_one = params.p_minus_one();

    let h = hash.mod_floor(&p_minus_one);
    let r = mod_pow(params.g(), k, params.p())?;
    let k_inv = mod_inverse(k, &p_minus_one)?;
    let s = ((h - keypair.private_exponent() * &r) * k_inv).mod_floor(&p_minus_one);

    if s.is_zero() {
        return Ok(None);
    }
    Ok(Some(ElGamalSignature { r, s }))
}

/// Check g^h == y^r * r^s (mod p) with 0 < r < p and 0 < s < p-1
pub fn verify(
    hash: &BigInteger,
    signature: &ElGamalSignature,
    public: &BigInteger,
    params: &GroupParameters,
) -> bool {
    check_signature(hash, signature, public, params).unwrap_or(false)
}

fn check_signature(
    hash: &BigInteger,
    signature: &ElGamalSignature,
    public: &BigInteger,
    params: &GroupParameters,
) -> CryptoResult<bool> {
    let p = params.p();
    let p_minus_one = params.p_minus_one();
    let one = BigInteger::one();
    if !in_range(&signature.r, &one, p) || !in_range(&signature.s, &one, &p_minus_one) {
        return Ok(false);
    }

    let h = hash.mod_floor(&p_minus_one);
    let left = mod_pow(params.g(), &h, p)?;
    let right = (mod_pow(public, &signature.r, p)? * mod_pow(&signature.r, &signature.s, p)?) % p;

    Ok(left == right)
}

/// Hash the message below p-1, then sign
pub fn sign_message<H: MessageHasher + ?Sized, R: RngCore + ?Sized>(
    message: &[u8],
    keypair: &DhKeyPair,
    hasher: &H,
    rng: &mut R,
) -> CryptoResult<ElGamalSignature> {
    let hash = hasher.hash_to_integer(message, &keypair.params().p_minus_one())?;
    sign(&hash, keypair, rng)
}

/// Hash the message below p-1, then verify
pub fn verify_message<H: MessageHasher + ?Sized>(
    message: &[u8],
    signature: &ElGamalSignature,
    public: &BigInteger,
    params: &GroupParameters,
    hasher: &H,
) -> bool {
    match hasher.hash_to_integer(message, &params.p_minus_one()) {
        Ok(hash) => verify(&hash, signature, public, params),
        Err(_) => false,
    }
}
