// Math Module
// Big-integer arithmetic and primality, the core every primitive builds on

pub mod bigint;
pub mod prime;

pub use bigint::{
    add, divmod, extended_gcd, from_bytes, from_u64, gcd, in_range, lcm, mod_inverse, mod_pow,
    mul, parse, sub, to_bytes, to_hex, BigInteger,
};
pub use prime::{generate_prime, generate_safe_prime, is_probably_prime, random_range};
