// RSA Signatures
// s = h^d mod n over a hash supplied by the caller; verification recomputes s^e mod n

use super::decrypt::private_op;
use super::encrypt::check_below_modulus;
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::error::CryptoResult;
use crate::hash::MessageHasher;
use crate::math::bigint::{in_range, mod_pow, BigInteger};

/// Sign an integer hash in [0, n)
pub fn sign(hash: &BigInteger, private_key: &RsaPrivateKey) -> CryptoResult<BigInteger> {
    check_below_modulus(hash, &private_key.n)?;
    private_op(hash, private_key)
}

/// True when signature^e mod n equals the hash; out-of-range inputs never verify
pub fn verify(hash: &BigInteger, signature: &BigInteger, public_key: &RsaPublicKey) -> bool {
    let zero = BigInteger::from(0u8);
    if !in_range(hash, &zero, &public_key.n) || !in_range(signature, &zero, &public_key.n) {
        return false;
    }
    matches!(mod_pow(signature, &public_key.e, &public_key.n), Ok(recovered) if &recovered == hash)
}

/// Hash the message below n, then sign
pub fn sign_message<H: MessageHasher + ?Sized>(
    message: &[u8],
    private_key: &RsaPrivateKey,
    hasher: &H,
) -> CryptoResult<BigInteger> {
    let hash = hasher.hash_to_integer(message, &private_key.n)?;
    sign(&hash, private_key)
}

/// Hash the message below n, then verify
pub fn verify_message<H: MessageHasher + ?Sized>(
    message: &[u8],
    signature: &BigInteger,
    public_key: &RsaPublicKey,
    hasher: &H,
) -> bool {
    match hasher.hash_to_integer(message, &public_key.n) {
        Ok(hash) => verify(&hash, signature, public_key),
        Err(_) => false,
    }
}
