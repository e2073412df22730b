// RSA Module
// Textbook RSA over integers: key generation, encrypt/decrypt, sign/verify
//
// There is no padding. Textbook RSA is deterministic, so equal messages give equal
// ciphertexts and nothing is semantically hidden. It is also malleable:
// encrypt(a) * encrypt(b) mod n == encrypt(a * b mod n), and signatures combine the
// same way. Both weaknesses are demonstrated in `tests/rsa.rs`.

pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod sign;

pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use keygen::{generate_keypair, totient, CrtComponents, RsaKeyPair, RsaPrivateKey, RsaPublicKey};
pub use sign::{sign, sign_message, verify, verify_message};
