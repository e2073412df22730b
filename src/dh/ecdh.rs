// Elliptic-Curve Diffie-Hellman
// Short Weierstrass curves y^2 = x^3 + ax + b over F_p, built on the same modular core as the
// finite-field exchange

use std::fmt;

use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::RngCore;
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::math::bigint::{in_range, mod_inverse, mod_pow_unchecked, parse, to_bytes, BigInteger};
use crate::math::prime::random_range;

/// NIST P-256 domain parameters (FIPS 186-4, D.1.2.3)
const P256_P: &str = "0xFFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFF";
const P256_A: &str = "0xFFFFFFFF00000001000000000000000000000000FFFFFFFFFFFFFFFFFFFFFFFC";
const P256_B: &str = "0x5AC635D8AA3A93E7B3EBBD55769886BC651D06B0CC53B0F63BCE3C3E27D2604B";
const P256_GX: &str = "0x6B17D1F2E12C4247F8BCE6E563A440F277037D812DEB33A0F4A13945D898C296";
const P256_GY: &str = "0x4FE342E2FE1A7F9B8EE7EB4A7C0F9E162BCE33576B315ECECBB6406837BF51F5";
const P256_N: &str = "0xFFFFFFFF00000000FFFFFFFFFFFFFFFFBCE6FAADA7179E84F3B9CAC2FC632551";

/// A curve point in affine coordinates, or the identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigInteger, y: BigInteger },
}

impl Point {
    /// Affine point; not checked against any curve
    pub fn new(x: BigInteger, y: BigInteger) -> Self {
        Point::Affine { x, y }
    }

    /// True for the identity element
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    /// The x-coordinate; `None` for the point at infinity
    pub fn x(&self) -> Option<&BigInteger> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, .. } => Some(x),
        }
    }
}

/// Curve y^2 = x^3 + ax + b over F_p with a base point of prime order n
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveParams {
    p: BigInteger,
    a: BigInteger,
    b: BigInteger,
    g: Point,
    n: BigInteger,
}

impl CurveParams {
    /// Checks that the curve is non-singular and that `g` is an on-curve point with n*g = O
    pub fn new(
        p: BigInteger,
        a: BigInteger,
        b: BigInteger,
        g: Point,
        n: BigInteger,
    ) -> CryptoResult<Self> {
        if p < BigInteger::from(5u8) {
            return Err(CryptoError::invalid("field modulus must be at least 5"));
        }
        if n <= BigInteger::one() {
            return Err(CryptoError::invalid("base point order must exceed 1"));
        }
        let a = a.mod_floor(&p);
        let b = b.mod_floor(&p);

        // 4a^3 + 27b^2 != 0 (mod p)
        let discriminant = BigInteger::from(4u8) * mod_pow_unchecked(&a, &BigInteger::from(3u8), &p)
            + BigInteger::from(27u8) * &b * &b;
        if discriminant.mod_floor(&p).is_zero() {
            return Err(CryptoError::invalid("curve is singular"));
        }

        let curve = Self { p, a, b, g, n };
        if curve.g.is_infinity() || !curve.is_on_curve(&curve.g) {
            return Err(CryptoError::invalid("base point is not on the curve"));
        }
        if !curve.scalar_mul(&curve.n, &curve.g)?.is_infinity() {
            return Err(CryptoError::invalid("n * g is not the identity for the claimed order"));
        }
        Ok(curve)
    }

    /// The textbook curve y^2 = x^3 + 2x + 2 over F_17, G = (5, 1) of order 19. Only for demonstrations.
    pub fn toy() -> Self {
        Self {
            p: BigInteger::from(17u8),
            a: BigInteger::from(2u8),
            b: BigInteger::from(2u8),
            g: Point::new(BigInteger::from(5u8), BigInteger::one()),
            n: BigInteger::from(19u8),
        }
    }

    /// NIST P-256; the base point has prime order and the cofactor is 1
    pub fn p256() -> CryptoResult<Self> {
        Ok(Self {
            p: parse(P256_P)?,
            a: parse(P256_A)?,
            b: parse(P256_B)?,
            g: Point::new(parse(P256_GX)?, parse(P256_GY)?),
            n: parse(P256_N)?,
        })
    }

    /// Field modulus
    pub fn p(&self) -> &BigInteger {
        &self.p
    }

    /// Base point
    pub fn generator(&self) -> &Point {
        &self.g
    }

    /// Order of the base point
    pub fn order(&self) -> &BigInteger {
        &self.n
    }

    /// Length of a field element in bytes
    pub fn field_bytes(&self) -> usize {
        ((self.p.bits() + 7) / 8) as usize
    }

    /// True for the identity and for affine points with coordinates in [0, p) satisfying the curve equation
    pub fn is_on_curve(&self, point: &Point) -> bool {
        let (x, y) = match point {
            Point::Infinity => return true,
            Point::Affine { x, y } => (x, y),
        };
        let zero = BigInteger::zero();
        if !in_range(x, &zero, &self.p) || !in_range(y, &zero, &self.p) {
            return false;
        }

        let lhs = (y * y).mod_floor(&self.p);
        let x_cubed = mod_pow_unchecked(x, &BigInteger::from(3u8), &self.p);
        let rhs = (x_cubed + &self.a * x + &self.b).mod_floor(&self.p);
        lhs == rhs
    }

    /// P + Q under the chord-and-tangent law
    pub fn add(&self, lhs: &Point, rhs: &Point) -> CryptoResult<Point> {
        let (x1, y1, x2, y2) = match (lhs, rhs) {
            (Point::Infinity, _) => return Ok(rhs.clone()),
            (_, Point::Infinity) => return Ok(lhs.clone()),
            (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
        };

        if x1 == x2 {
            // Q = -P
            if (y1 + y2).mod_floor(&self.p).is_zero() {
                return Ok(Point::Infinity);
            }
            return self.double(lhs);
        }

        let slope = ((y2 - y1) * mod_inverse(&(x2 - x1), &self.p)?).mod_floor(&self.p);
        Ok(self.third_point(&slope, x1, y1, x2))
    }

    /// 2P, using the tangent slope (3x^2 + a) / 2y
    pub fn double(&self, point: &Point) -> CryptoResult<Point> {
        let (x, y) = match point {
            Point::Infinity => return Ok(Point::Infinity),
            Point::Affine { x, y } => (x, y),
        };
        if y.is_zero() {
            return Ok(Point::Infinity);
        }

        let numerator = BigInteger::from(3u8) * x * x + &self.a;
        let slope = (numerator * mod_inverse(&(y * 2u8), &self.p)?).mod_floor(&self.p);
        Ok(self.third_point(&slope, x, y, x))
    }

    fn third_point(
        &self,
        slope: &BigInteger,
        x1: &BigInteger,
        y1: &BigInteger,
        x2: &BigInteger,
    ) -> Point {
        let x3 = (slope * slope - x1 - x2).mod_floor(&self.p);
        let y3 = (slope * (x1 - &x3) - y1).mod_floor(&self.p);
        Point::Affine { x: x3, y: y3 }
    }

    /// k * P by double-and-add over the bits of k, most significant first
    pub fn scalar_mul(&self, k: &BigInteger, point: &Point) -> CryptoResult<Point> {
        if k.is_negative() {
            return Err(CryptoError::invalid("scalar must be non-negative"));
        }

        let mut result = Point::Infinity;
        for byte in to_bytes(k) {
            for i in (0..8).rev() {
                result = self.double(&result)?;
                if (byte >> i) & 1 == 1 {
                    result = self.add(&result, point)?;
                }
            }
        }
        Ok(result)
    }
}

/// One party's ECDH key pair: private scalar d, public point d*G
#[derive(Clone, PartialEq, Eq)]
pub struct EcdhKeyPair {
    curve: CurveParams,
    private: BigInteger,
    public: Point,
}

impl EcdhKeyPair {
    /// Draw d uniformly from [1, n)
    pub fn generate<R: RngCore + ?Sized>(curve: &CurveParams, rng: &mut R) -> CryptoResult<Self> {
        let private = random_range(&BigInteger::one(), curve.order(), rng)?;
        Self::from_private(curve, private)
    }

    /// Build a key pair from a known scalar, which must satisfy 1 <= d < n
    pub fn from_private(curve: &CurveParams, private: BigInteger) -> CryptoResult<Self> {
        if !in_range(&private, &BigInteger::one(), curve.order()) {
            return Err(CryptoError::invalid("private scalar must satisfy 1 <= d < n"));
        }
        let public = curve.scalar_mul(&private, curve.generator())?;
        debug!("built ECDH key pair over a {}-bit field", curve.p().bits());

        Ok(Self {
            curve: curve.clone(),
            private,
            public,
        })
    }

    /// The point to send to the peer
    pub fn public_point(&self) -> &Point {
        &self.public
    }

    /// Curve this key pair lives on
    pub fn curve(&self) -> &CurveParams {
        &self.curve
    }

    /// Derive d * peer after validating the peer's point
    pub fn shared_secret(&self, peer_public: &Point) -> CryptoResult<Point> {
        validate_public_point(&self.curve, peer_public)?;
        let shared = self.curve.scalar_mul(&self.private, peer_public)?;
        if shared.is_infinity() {
            return Err(CryptoError::InvalidPublicValue);
        }
        Ok(shared)
    }

    /// x-coordinate of the shared point as fixed-width big-endian bytes
    pub fn shared_secret_bytes(&self, peer_public: &Point) -> CryptoResult<Vec<u8>> {
        let shared = self.shared_secret(peer_public)?;
        let x = shared.x().ok_or(CryptoError::InvalidPublicValue)?;

        let digits = to_bytes(x);
        let mut out = vec![0u8; self.curve.field_bytes().saturating_sub(digits.len())];
        out.extend_from_slice(&digits);
        Ok(out)
    }
}

impl fmt::Debug for EcdhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhKeyPair")
            .field("public", &self.public)
            .field("p_bits", &self.curve.p().bits())
            .finish_non_exhaustive()
    }
}

/// Reject the identity, off-curve points, and points outside the order-n subgroup
pub fn validate_public_point(curve: &CurveParams, point: &Point) -> CryptoResult<()> {
    if point.is_infinity() || !curve.is_on_curve(point) {
        return Err(CryptoError::InvalidPublicValue);
    }
    if !curve.scalar_mul(curve.order(), point)?.is_infinity() {
        return Err(CryptoError::InvalidPublicValue);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn big(n: u64) -> BigInteger {
        BigInteger::from(n)
    }

    fn point(x: u64, y: u64) -> Point {
        Point::new(big(x), big(y))
    }

    #[test]
    fn test_toy_group_law() {
        let curve = CurveParams::toy();
        let g = curve.generator();

        assert_eq!(curve.double(g).unwrap(), point(6, 3));
        assert_eq!(curve.add(g, &point(6, 3)).unwrap(), point(10, 6));
        assert_eq!(curve.scalar_mul(&big(7), g).unwrap(), point(0, 6));
        // G + (-G) = O
        assert_eq!(curve.add(g, &point(5, 16)).unwrap(), Point::Infinity);
        assert_eq!(curve.add(&Point::Infinity, g).unwrap(), g.clone());
        assert!(curve.scalar_mul(&big(19), g).unwrap().is_infinity());
        assert!(curve.scalar_mul(&big(0), g).unwrap().is_infinity());
    }

    #[test]
    fn test_every_multiple_is_on_curve() {
        let curve = CurveParams::toy();
        for k in 1..19u64 {
            let kg = curve.scalar_mul(&big(k), curve.generator()).unwrap();
            assert!(!kg.is_infinity(), "{}G", k);
            assert!(curve.is_on_curve(&kg), "{}G", k);
        }
    }

    #[test]
    fn test_toy_exchange() {
        let curve = CurveParams::toy();
        let alice = EcdhKeyPair::from_private(&curve, big(3)).unwrap();
        let bob = EcdhKeyPair::from_private(&curve, big(7)).unwrap();
        assert_eq!(alice.public_point(), &point(10, 6));
        assert_eq!(bob.public_point(), &point(0, 6));

        // 3 * 7 = 21 = 2 (mod 19)
        assert_eq!(alice.shared_secret(bob.public_point()).unwrap(), point(6, 3));
        assert_eq!(bob.shared_secret(alice.public_point()).unwrap(), point(6, 3));
        assert_eq!(alice.shared_secret_bytes(bob.public_point()).unwrap(), vec![6u8]);
    }

    #[test]
    fn test_private_scalar_bounds() {
        let curve = CurveParams::toy();
        for d in [0u64, 19, 20] {
            assert!(matches!(
                EcdhKeyPair::from_private(&curve, big(d)),
                Err(CryptoError::InvalidArgument(_))
            ));
        }
        assert!(EcdhKeyPair::from_private(&curve, big(18)).is_ok());
        assert!(EcdhKeyPair::from_private(&curve, BigInteger::from(-3)).is_err());
    }

    #[test]
    fn test_invalid_peer_points_rejected() {
        let curve = CurveParams::toy();
        let alice = EcdhKeyPair::from_private(&curve, big(3)).unwrap();

        // 2^2 = 4, but 5^3 + 2*5 + 2 = 137 = 1 (mod 17)
        for bad in [point(5, 2), point(22, 1), Point::Infinity] {
            assert_eq!(alice.shared_secret(&bad), Err(CryptoError::InvalidPublicValue));
        }
        assert_eq!(
            alice.shared_secret(&Point::new(BigInteger::from(-12), big(1))),
            Err(CryptoError::InvalidPublicValue)
        );
    }

    #[test]
    fn test_curve_validation() {
        let g = point(5, 1);
        assert!(CurveParams::new(big(17), big(2), big(2), g.clone(), big(19)).is_ok());
        // wrong order
        assert!(CurveParams::new(big(17), big(2), big(2), g.clone(), big(18)).is_err());
        // base point off the curve
        assert!(CurveParams::new(big(17), big(2), big(3), g, big(19)).is_err());
        // y^2 = x^3 is singular
        assert!(CurveParams::new(big(17), big(0), big(0), point(1, 1), big(19)).is_err());
    }

    #[test]
    fn test_p256_generator() {
        let curve = CurveParams::p256().unwrap();
        let g = curve.generator();
        assert!(curve.is_on_curve(g));
        assert_eq!(curve.field_bytes(), 32);

        let doubled = curve.double(g).unwrap();
        let expected = Point::new(
            parse("0x7CF27B188D034F7E8A52380304B51AC3C08969E277F21B35A60B48FC47669978").unwrap(),
            parse("0x07775510DB8ED040293D9AC69F7430DBBA7DADE63CE982299E04B79D227873D1").unwrap(),
        );
        assert_eq!(doubled, expected);
        assert_eq!(curve.add(g, g).unwrap(), doubled);
        assert_eq!(curve.scalar_mul(&big(2), g).unwrap(), doubled);
        assert!(curve.is_on_curve(&doubled));

        assert!(curve.scalar_mul(curve.order(), g).unwrap().is_infinity());
    }

    #[test]
    fn test_p256_exchange_agrees() {
        let curve = CurveParams::p256().unwrap();
        let mut rng = StdRng::seed_from_u64(256);
        let alice = EcdhKeyPair::generate(&curve, &mut rng).unwrap();
        let bob = EcdhKeyPair::generate(&curve, &mut rng).unwrap();

        let alice_key = alice.shared_secret_bytes(bob.public_point()).unwrap();
        let bob_key = bob.shared_secret_bytes(alice.public_point()).unwrap();
        assert_eq!(alice_key, bob_key);
        assert_eq!(alice_key.len(), 32);
    }

    #[test]
    fn test_debug_hides_private_scalar() {
        let pair = EcdhKeyPair::from_private(&CurveParams::toy(), big(5)).unwrap();
        let rendered = format!("{:?}", pair);
        assert!(rendered.contains("public"));
        assert!(!rendered.contains("private"));
    }
}
