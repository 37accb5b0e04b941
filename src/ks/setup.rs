//! Key-switching matrix generation

use crate::math::{GaussianSampler, NttContext, Poly};
use crate::rlwe::{apply_automorphism, RlweCiphertext, RlweSecretKey};
use serde::{Deserialize, Serialize};

use super::gadget::GadgetVector;

/// Key-switching matrix from a source key to secret key s'
///
/// The matrix consists of ℓ RLWE ciphertexts encrypting `from·z^i` under s':
/// ```text
/// K[i] = (a_i, -a_i·s' + e_i + from·z^i)
/// ```
///
/// Rows are stored in NTT domain so switching needs no transforms of the key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySwitchingMatrix {
    /// ℓ RLWE ciphertexts
    pub rows: Vec<RlweCiphertext>,
    /// Gadget parameters
    pub gadget: GadgetVector,
}

impl KeySwitchingMatrix {
    /// Get the ring dimension
    pub fn ring_dim(&self) -> usize {
        self.rows.first().map_or(0, |r| r.ring_dim())
    }

    /// Get the modulus
    pub fn modulus(&self) -> u64 {
        self.gadget.q
    }

    /// Get the number of rows (same as gadget length)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the matrix is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the matrix is usable for ring dimension `n` and modulus `q`
    pub fn is_well_formed(&self, n: usize, q: u64) -> bool {
        self.gadget.q == q
            && self.rows.len() == self.gadget.len
            && self.rows.iter().all(|r| {
                r.a.dimension() == n
                    && r.b.dimension() == n
                    && r.a.modulus() == q
                    && r.b.modulus() == q
                    && r.a.is_ntt()
                    && r.b.is_ntt()
                    && r.a.coeffs().iter().chain(r.b.coeffs()).all(|&c| c < q)
            })
    }
}

/// Generate a key-switching matrix from the polynomial `from` to secret key s'
///
/// `from` is usually a transformed secret: s² for relinearization,
/// τ_g(s) for rotations.
///
/// # Arguments
/// * `from` - Source key polynomial (coefficient domain)
/// * `to_key` - Target secret key s'
/// * `gadget` - Gadget vector parameters
/// * `sampler` - Gaussian sampler for error and uniform randomness
/// * `ctx` - NTT context
pub fn generate_ks_matrix(
    from: &Poly,
    to_key: &RlweSecretKey,
    gadget: &GadgetVector,
    sampler: &mut GaussianSampler,
    ctx: &NttContext,
) -> KeySwitchingMatrix {
    let d = to_key.ring_dim();
    let q = to_key.modulus();

    debug_assert_eq!(from.dimension(), d, "Keys must have same ring dimension");
    debug_assert_eq!(from.modulus(), q, "Keys must have same modulus");

    let s_ntt = RlweSecretKey::from_poly(to_key.poly.to_ntt_new(ctx));

    let rows = gadget
        .powers()
        .into_iter()
        .map(|power| {
            let mut a = Poly::random_with_rng(d, q, sampler.rng_mut());
            let error = Poly::sample_gaussian(d, q, sampler);

            a.to_ntt(ctx);
            let neg_a_s = -&a.mul_ntt_domain(&s_ntt.poly, ctx);

            // b = -a·s' + e + from·z^i
            let mut b = &error + &from.scalar_mul(power);
            b.to_ntt(ctx);
            b += &neg_a_s;

            RlweCiphertext::from_parts(a, b)
        })
        .collect();

    KeySwitchingMatrix {
        rows,
        gadget: gadget.clone(),
    }
}

/// Generate the relinearization matrix: switches s² to s
pub fn generate_relin_matrix(
    sk: &RlweSecretKey,
    gadget: &GadgetVector,
    sampler: &mut GaussianSampler,
    ctx: &NttContext,
) -> KeySwitchingMatrix {
    let s_squared = RlweSecretKey::from_poly(sk.poly.mul_ntt(&sk.poly, ctx));
    generate_ks_matrix(&s_squared.poly, sk, gadget, sampler, ctx)
}

/// Generate a key-switching matrix for automorphism τ_g: switches τ_g(s) to s
pub fn generate_automorphism_ks_matrix(
    sk: &RlweSecretKey,
    g: usize,
    gadget: &GadgetVector,
    sampler: &mut GaussianSampler,
    ctx: &NttContext,
) -> KeySwitchingMatrix {
    let auto_s = RlweSecretKey::from_poly(apply_automorphism(&sk.poly, g));
    generate_ks_matrix(&auto_s.poly, sk, gadget, sampler, ctx)
}
