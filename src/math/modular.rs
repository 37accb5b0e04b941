//! Scalar arithmetic in Z_q for moduli below 2^63

/// Namespace for modular helpers; all inputs are expected in [0, q)
pub struct ModQ;

impl ModQ {
    #[inline]
    pub fn add(a: u64, b: u64, q: u64) -> u64 {
        let s = a + b;
        if s >= q {
            s - q
        } else {
            s
        }
    }

    #[inline]
    pub fn sub(a: u64, b: u64, q: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            a + (q - b)
        }
    }

    #[inline]
    pub fn mul(a: u64, b: u64, q: u64) -> u64 {
        ((a as u128 * b as u128) % q as u128) as u64
    }

    #[inline]
    pub fn negate(a: u64, q: u64) -> u64 {
        Self::sub(0, a, q)
    }

    /// Map a signed value into [0, q)
    #[inline]
    pub fn from_signed(val: i64, q: u64) -> u64 {
        let r = val.unsigned_abs() % q;
        if val >= 0 || r == 0 {
            r
        } else {
            q - r
        }
    }

    /// Centered representative in (-q/2, q/2]
    #[inline]
    pub fn to_signed(val: u64, q: u64) -> i64 {
        if val <= q / 2 {
            val as i64
        } else {
            -((q - val) as i64)
        }
    }

    /// Modular exponentiation by squaring
    pub fn pow(mut base: u64, mut exp: u64, q: u64) -> u64 {
        let mut result = 1u64 % q;
        base %= q;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Self::mul(result, base, q);
            }
            exp >>= 1;
            base = Self::mul(base, base, q);
        }
        result
    }

    /// Multiplicative inverse modulo q via extended Euclid.
    ///
    /// Returns `None` when `a` is not invertible.
    pub fn inverse(a: u64, q: u64) -> Option<u64> {
        let mut t: i128 = 0;
        let mut new_t: i128 = 1;
        let mut r: i128 = q as i128;
        let mut new_r: i128 = (a % q) as i128;

        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }

        if r != 1 {
            return None;
        }
        if t < 0 {
            t += q as i128;
        }
        Some(t as u64)
    }

    /// Deterministic Miller-Rabin primality test, exact for all u64.
    pub fn is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
        for &p in &WITNESSES {
            if n % p == 0 {
                return n == p;
            }
        }

        let mut d = n - 1;
        let mut s = 0;
        while d % 2 == 0 {
            d /= 2;
            s += 1;
        }

        'witness: for &a in &WITNESSES {
            let mut x = Self::pow(a, d, n);
            if x == 1 || x == n - 1 {
                continue;
            }
            for _ in 1..s {
                x = Self::mul(x, x, n);
                if x == n - 1 {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }
}
