use toy_pkc::config::PrimeConfig;
use toy_pkc::dh::{CurveParams, DhKeyPair, EcdhKeyPair, GroupParameters, Point};
use toy_pkc::math::BigInteger;
use toy_pkc::CryptoError;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn big(n: u64) -> BigInteger {
    BigInteger::from(n)
}

#[test]
fn textbook_scenario() {
    let group = GroupParameters::new(big(23), big(5)).unwrap();
    let alice = DhKeyPair::from_private(&group, big(6)).unwrap();
    let bob = DhKeyPair::from_private(&group, big(15)).unwrap();

    assert_eq!(alice.public_value(), &big(8));
    assert_eq!(bob.public_value(), &big(19));
    assert_eq!(alice.shared_secret(&big(19)).unwrap(), big(2));
    assert_eq!(bob.shared_secret(&big(8)).unwrap(), big(2));
}

#[test]
fn every_private_pair_agrees_in_toy_group() {
    let group = GroupParameters::toy();
    for x_a in 2..22u64 {
        for x_b in 2..22u64 {
            let alice = DhKeyPair::from_private(&group, big(x_a)).unwrap();
            let bob = DhKeyPair::from_private(&group, big(x_b)).unwrap();
            let from_alice = alice.shared_secret(bob.public_value());
            let from_bob = bob.shared_secret(alice.public_value());

            // 5^11 = 22 = p-1, which the peer check refuses
            if x_b == 11 {
                assert_eq!(from_alice, Err(CryptoError::InvalidPublicValue));
            }
            if x_a == 11 {
                assert_eq!(from_bob, Err(CryptoError::InvalidPublicValue));
            }
            if x_a != 11 && x_b != 11 {
                assert_eq!(from_alice.unwrap(), from_bob.unwrap());
            }
        }
    }
}

#[test]
fn generated_group_exchange() {
    let mut rng = StdRng::seed_from_u64(2001);
    let group = GroupParameters::generate(128, &PrimeConfig::default(), &mut rng).unwrap();

    let alice = DhKeyPair::generate(&group, &mut rng).unwrap();
    let bob = DhKeyPair::generate(&group, &mut rng).unwrap();
    assert_eq!(
        alice.shared_secret_bytes(bob.public_value()).unwrap(),
        bob.shared_secret_bytes(alice.public_value()).unwrap()
    );
}

#[test]
fn modp_group_rejects_values_outside_subgroup() {
    let group = GroupParameters::modp_2048().unwrap();
    let mut rng = StdRng::seed_from_u64(2002);
    let alice = DhKeyPair::generate(&group, &mut rng).unwrap();

    let p_minus_one = group.p_minus_one();
    for bad in [big(0), big(1), p_minus_one.clone(), group.p().clone()] {
        assert_eq!(alice.shared_secret(&bad), Err(CryptoError::InvalidPublicValue));
    }
}

#[test]
fn generator_bounds_are_enforced() {
    for g in [0u64, 1, 23] {
        assert!(matches!(
            GroupParameters::new(big(23), big(g)),
            Err(CryptoError::InvalidArgument(_))
        ));
    }
}

#[test]
fn every_scalar_pair_agrees_on_toy_curve() {
    let curve = CurveParams::toy();
    for d_a in 1..19u64 {
        for d_b in 1..19u64 {
            let alice = EcdhKeyPair::from_private(&curve, big(d_a)).unwrap();
            let bob = EcdhKeyPair::from_private(&curve, big(d_b)).unwrap();
            assert_eq!(
                alice.shared_secret_bytes(bob.public_point()).unwrap(),
                bob.shared_secret_bytes(alice.public_point()).unwrap(),
                "d_a = {}, d_b = {}",
                d_a,
                d_b
            );
        }
    }
}

#[test]
fn ecdh_rejects_points_off_the_curve() {
    let curve = CurveParams::p256().unwrap();
    let alice = EcdhKeyPair::generate(&curve, &mut StdRng::seed_from_u64(11)).unwrap();

    // nudge a valid public point off the curve
    let (x, y) = match alice.public_point() {
        Point::Affine { x, y } => (x.clone(), y.clone()),
        Point::Infinity => unreachable!(),
    };
    let off_curve = Point::new(x, (y + 1u8) % curve.p());
    assert!(!curve.is_on_curve(&off_curve));
    assert_eq!(alice.shared_secret(&off_curve), Err(CryptoError::InvalidPublicValue));
    assert_eq!(alice.shared_secret(&Point::Infinity), Err(CryptoError::InvalidPublicValue));
}
