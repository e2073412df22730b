// Diffie-Hellman Module
// Finite-field and elliptic-curve groups and the two-party shared-secret exchange

pub mod ecdh;
pub mod exchange;
pub mod group;

pub use ecdh::{validate_public_point, CurveParams, EcdhKeyPair, Point};
pub use exchange::{validate_public_value, DhKeyPair};
pub use group::GroupParameters;
