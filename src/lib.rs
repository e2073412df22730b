//! Minimal public-key primitives for learning how they work.
//!
//! Everything rests on [`math`]: exact big-integer arithmetic, modular
//! exponentiation and inverses, and Miller-Rabin primality. On top of it sit
//! Diffie-Hellman over finite fields and elliptic curves ([`dh`]), textbook
//! RSA ([`rsa`]), ElGamal ([`elgamal`]), Paillier ([`paillier`]) and Pedersen
//! commitments ([`pedersen`]).
//!
//! Nothing here is constant-time, padded, or sized for real use. Every generation
//! routine takes its randomness as an explicit `&mut impl RngCore`, so a seeded
//! RNG reproduces any run exactly.

pub mod config;
pub mod dh;
pub mod elgamal;
pub mod error;
pub mod hash;
pub mod math;
pub mod paillier;
pub mod pedersen;
pub mod rsa;

pub use config::{PrimeConfig, RsaConfig, Totient};
pub use dh::{CurveParams, DhKeyPair, EcdhKeyPair, GroupParameters};
pub use error::{CryptoError, CryptoResult};
pub use hash::{MessageHasher, Sha256Hasher};
pub use math::BigInteger;
