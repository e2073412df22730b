use std::env;
use std::process;

use anyhow::{Context, Result};
use rand::thread_rng;
use tracing::info;

use toy_pkc::config::{PrimeConfig, RsaConfig, Totient};
use toy_pkc::dh::{CurveParams, DhKeyPair, EcdhKeyPair, GroupParameters};
use toy_pkc::hash::Sha256Hasher;
use toy_pkc::math::{parse, to_bytes, BigInteger};
use toy_pkc::pedersen::PedersenParams;
use toy_pkc::rsa::{self, RsaKeyPair};
use toy_pkc::{elgamal, paillier};

/// Walk through every primitive once
///
/// Usage: toy_pkc [RSA_PRIME_BITS] [GROUP_BITS]
fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let prime_bits: u64 = match args.get(1) {
        Some(arg) => arg.parse().context("RSA_PRIME_BITS must be a number")?,
        None => 256,
    };
    let group_bits: u64 = match args.get(2) {
        Some(arg) => arg.parse().context("GROUP_BITS must be a number")?,
        None => 128,
    };

    let mut rng = thread_rng();

    // Textbook Diffie-Hellman
    let toy = GroupParameters::toy();
    let alice = DhKeyPair::from_private(&toy, BigInteger::from(6u8))?;
    let bob = DhKeyPair::from_private(&toy, BigInteger::from(15u8))?;
    info!(
        "toy DH: A = {}, B = {}, secret = {}",
        alice.public_value(),
        bob.public_value(),
        alice.shared_secret(bob.public_value())?
    );

    // Diffie-Hellman over a fresh safe-prime group
    let group = GroupParameters::generate(group_bits, &PrimeConfig::default(), &mut rng)
        .context("group generation failed")?;
    let alice = DhKeyPair::generate(&group, &mut rng)?;
    let bob = DhKeyPair::generate(&group, &mut rng)?;
    let alice_key = alice.shared_secret_bytes(bob.public_value())?;
    let bob_key = bob.shared_secret_bytes(alice.public_value())?;
    anyhow::ensure!(alice_key == bob_key, "shared secrets differ");
    info!("{}-bit DH shared secret: {}", group_bits, hex::encode(&alice_key));

    // Elliptic-curve Diffie-Hellman over P-256
    let curve = CurveParams::p256()?;
    let ec_alice = EcdhKeyPair::generate(&curve, &mut rng)?;
    let ec_bob = EcdhKeyPair::generate(&curve, &mut rng)?;
    let ec_key = ec_alice.shared_secret_bytes(ec_bob.public_point())?;
    anyhow::ensure!(
        ec_key == ec_bob.shared_secret_bytes(ec_alice.public_point())?,
        "ECDH shared secrets differ"
    );
    info!("P-256 ECDH shared secret: {}", hex::encode(&ec_key));

    // Textbook RSA
    let textbook = RsaKeyPair::from_primes(
        BigInteger::from(61u8),
        BigInteger::from(53u8),
        BigInteger::from(17u8),
        Totient::Euler,
    )?;
    let c = textbook.public_key.encrypt(&BigInteger::from(65u8))?;
    info!(
        "textbook RSA: n = {}, d = {}, encrypt(65) = {}, decrypt = {}",
        textbook.public_key.n,
        textbook.private_key.d,
        c,
        textbook.private_key.decrypt(&c)?
    );

    // Generated RSA key, signing a hashed message
    let keypair = rsa::generate_keypair(&RsaConfig::default().with_prime_bits(prime_bits), &mut rng)
        .context("RSA key generation failed")?;
    let message = b"Hello, RSA!";
    let signature = rsa::sign_message(message, &keypair.private_key, &Sha256Hasher)?;
    let valid = rsa::verify_message(message, &signature, &keypair.public_key, &Sha256Hasher);
    info!(
        "{}-bit RSA signature: {} (valid: {})",
        keypair.bit_length(),
        hex::encode(to_bytes(&signature)),
        valid
    );

    // ElGamal over the same group as the DH run
    let m = parse("0x48656c6c6f")?;
    let ciphertext = elgamal::encrypt(&m, alice.public_value(), &group, &mut rng)?;
    info!("ElGamal round trip: {} -> {}", m, elgamal::decrypt(&ciphertext, &alice)?);

    // Paillier addition under encryption
    let paillier_keys = paillier::generate_keypair(prime_bits / 2, &PrimeConfig::default(), &mut rng)?;
    let public = &paillier_keys.public_key;
    let sum = paillier::add(
        &paillier::encrypt(&BigInteger::from(24u8), public, &mut rng)?,
        &paillier::encrypt(&BigInteger::from(18u8), public, &mut rng)?,
        public,
    );
    info!(
        "Paillier: decrypt(E(24) * E(18)) = {}",
        paillier::decrypt(&sum, &paillier_keys.private_key)?
    );

    // Pedersen commitment in the prime-order subgroup
    let pedersen = PedersenParams::derive(&group)?;
    let (commitment, blinding) = pedersen.commit(&BigInteger::from(42u8), &mut rng)?;
    info!(
        "Pedersen: commitment opens to 42: {}",
        pedersen.verify(&commitment, &BigInteger::from(42u8), &blinding)
    );

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
