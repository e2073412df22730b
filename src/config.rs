// Generation parameters
// Defaults are deliberately small: fast enough for teaching and tests, far too weak for real use.

/// Configuration for probabilistic prime search
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimeConfig {
    /// Miller-Rabin rounds per candidate; a composite survives with probability <= 4^-rounds
    pub rounds: u32,
    /// Candidates sampled before giving up with `GenerationTimeout`
    pub max_attempts: u32,
}

impl Default for PrimeConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            max_attempts: 20_000,
        }
    }
}

impl PrimeConfig {
    /// Set the Miller-Rabin rounds per candidate
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Set the candidate budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Which group order the RSA private exponent is inverted against
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Totient {
    /// lambda(n) = lcm(p-1, q-1)
    #[default]
    Carmichael,
    /// phi(n) = (p-1)(q-1), the simplified textbook variant
    Euler,
}

/// Configuration for RSA key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaConfig {
    /// Bit length of each prime factor; the modulus has about twice as many bits
    pub prime_bits: u64,
    pub public_exponent: u64,
    /// Tried in order when `public_exponent` shares a factor with the totient
    pub fallback_exponents: Vec<u64>,
    pub totient: Totient,
    /// How many prime pairs may be drawn before giving up
    pub max_key_attempts: u32,
    pub prime: PrimeConfig,
}

impl Default for RsaConfig {
    fn default() -> Self {
        Self {
            prime_bits: 512,
            public_exponent: 65537,
            fallback_exponents: vec![3, 5, 17, 257],
            totient: Totient::Carmichael,
            max_key_attempts: 16,
            prime: PrimeConfig::default(),
        }
    }
}

impl RsaConfig {
    /// Set the bit length of each prime factor
    pub fn with_prime_bits(mut self, bits: u64) -> Self {
        self.prime_bits = bits;
        self
    }

    /// Set the preferred public exponent
    pub fn with_public_exponent(mut self, e: u64) -> Self {
        self.public_exponent = e;
        self
    }

    /// Replace the exponents tried after the preferred one
    pub fn with_fallback_exponents(mut self, exponents: Vec<u64>) -> Self {
        self.fallback_exponents = exponents;
        self
    }

    /// Choose the group order d is inverted against
    pub fn with_totient(mut self, totient: Totient) -> Self {
        self.totient = totient;
        self
    }

    /// Set how many prime pairs may be drawn
    pub fn with_max_key_attempts(mut self, attempts: u32) -> Self {
        self.max_key_attempts = attempts;
        self
    }

    /// Set the prime search configuration
    pub fn with_prime_config(mut self, prime: PrimeConfig) -> Self {
        self.prime = prime;
        self
    }

    /// Public exponent candidates in the order they are tried
    pub fn exponent_candidates(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.public_exponent).chain(self.fallback_exponents.iter().copied())
    }
}
