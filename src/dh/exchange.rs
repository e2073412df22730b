// Diffie-Hellman Key Exchange
// Each party keeps x private, publishes g^x mod p, and raises the peer's value to x

use std::fmt;

use num_traits::One;
use rand::RngCore;

use super::group::GroupParameters;
use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{mod_pow, to_bytes, BigInteger};
use crate::math::prime::random_range;

/// One party's key pair for a single protocol run
#[derive(Clone, PartialEq, Eq)]
pub struct DhKeyPair {
    params: GroupParameters,
    private: BigInteger,
    public: BigInteger,
}

impl DhKeyPair {
    /// Draw a private exponent uniformly from [2, p-2]
    pub fn generate<R: RngCore + ?Sized>(
        params: &GroupParameters,
        rng: &mut R,
    ) -> CryptoResult<Self> {
        let private = random_range(&BigInteger::from(2u8), &params.p_minus_one(), rng)?;
        Self::from_private(params, private)
    }

    /// Build a key pair from a known private exponent, which must satisfy 1 < x < p-1
    pub fn from_private(params: &GroupParameters, private: BigInteger) -> CryptoResult<Self> {
        if private <= BigInteger::one() || private >= params.p_minus_one() {
            return Err(CryptoError::invalid(
                "private exponent must satisfy 1 < x < p - 1",
            ));
        }
        let public = mod_pow(params.g(), &private, params.p())?;

        Ok(Self {
            params: params.clone(),
            private,
            public,
        })
    }

    /// The value to send to the peer
    pub fn public_value(&self) -> &BigInteger {
        &self.public
    }

    /// Group this key pair lives in
    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    pub(crate) fn private_exponent(&self) -> &BigInteger {
        &self.private
    }

    /// Derive the shared secret peer^x mod p after validating the peer's value
    pub fn shared_secret(&self, peer_public: &BigInteger) -> CryptoResult<BigInteger> {
        validate_public_value(&self.params, peer_public)?;
        mod_pow(peer_public, &self.private, self.params.p())
    }

    /// Shared secret as big-endian bytes, ready for a key derivation function
    pub fn shared_secret_bytes(&self, peer_public: &BigInteger) -> CryptoResult<Vec<u8>> {
        Ok(to_bytes(&self.shared_secret(peer_public)?))
    }
}

impl fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("public", &self.public)
            .field("p_bits", &self.params.p().bits())
            .finish_non_exhaustive()
    }
}

/// Reject degenerate peer values
///
/// Values outside (1, p-1) cover 0, 1 and p-1, which pin the shared secret to a
/// two-element subgroup. When the group order q is known, the value must also
/// satisfy y^q = 1. This is a toy defence, not a full validation.
pub fn validate_public_value(params: &GroupParameters, value: &BigInteger) -> CryptoResult<()> {
    if value <= &BigInteger::one() || value >= &params.p_minus_one() {
        return Err(CryptoError::InvalidPublicValue);
    }
    if let Some(order) = params.order() {
        if !mod_pow(value, order, params.p())?.is_one() {
            return Err(CryptoError::InvalidPublicValue);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrimeConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn big(n: u64) -> BigInteger {
        BigInteger::from(n)
    }

    #[test]
    fn test_textbook_exchange() {
        let group = GroupParameters::toy();
        let alice = DhKeyPair::from_private(&group, big(6)).unwrap();
        let bob = DhKeyPair::from_private(&group, big(15)).unwrap();

        assert_eq!(alice.public_value(), &big(8));
        assert_eq!(bob.public_value(), &big(19));

        let alice_secret = alice.shared_secret(bob.public_value()).unwrap();
        let bob_secret = bob.shared_secret(alice.public_value()).unwrap();
        assert_eq!(alice_secret, big(2));
        assert_eq!(bob_secret, big(2));
        assert_eq!(alice.shared_secret_bytes(bob.public_value()).unwrap(), vec![2u8]);
    }

    #[test]
    fn test_random_exchange_agrees() {
        let mut rng = StdRng::seed_from_u64(7);
        let group = GroupParameters::generate(96, &PrimeConfig::default(), &mut rng).unwrap();

        for _ in 0..5 {
            let alice = DhKeyPair::generate(&group, &mut rng).unwrap();
            let bob = DhKeyPair::generate(&group, &mut rng).unwrap();
            assert_eq!(
                alice.shared_secret(bob.public_value()).unwrap(),
                bob.shared_secret(alice.public_value()).unwrap()
            );
        }
    }

    #[test]
    fn test_private_exponent_bounds() {
        let group = GroupParameters::toy();
        for x in [0u64, 1, 22, 23, 100] {
            assert!(matches!(
                DhKeyPair::from_private(&group, big(x)),
                Err(CryptoError::InvalidArgument(_))
            ));
        }
        assert!(DhKeyPair::from_private(&group, big(21)).is_ok());

        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..50 {
            let pair = DhKeyPair::generate(&group, &mut rng).unwrap();
            let x = pair.private_exponent();
            assert!(x > &big(1) && x < &big(22));
        }
    }

    #[test]
    fn test_degenerate_peer_values_rejected() {
        let group = GroupParameters::toy();
        let alice = DhKeyPair::from_private(&group, big(6)).unwrap();
        for bad in [0u64, 1, 22, 23, 1000] {
            assert_eq!(
                alice.shared_secret(&big(bad)),
                Err(CryptoError::InvalidPublicValue)
            );
        }
        assert_eq!(
            alice.shared_secret(&BigInteger::from(-5)),
            Err(CryptoError::InvalidPublicValue)
        );
    }

    #[test]
    fn test_subgroup_membership_check() {
        let group = GroupParameters::new(big(23), big(4)).unwrap().with_order(big(11)).unwrap();
        // 5 is a non-residue mod 23, so it lies outside the order-11 subgroup
        assert_eq!(
            validate_public_value(&group, &big(5)),
            Err(CryptoError::InvalidPublicValue)
        );
        assert!(validate_public_value(&group, &big(4)).is_ok());
        // without a known order only the range is checked
        assert!(validate_public_value(&GroupParameters::toy(), &big(5)).is_ok());
    }

    #[test]
    fn test_debug_hides_private_exponent() {
        let group = GroupParameters::toy();
        let pair = DhKeyPair::from_private(&group, big(13)).unwrap();
        let rendered = format!("{:?}", pair);
        assert!(rendered.contains("public"));
        assert!(!rendered.contains("private"));
    }
}
