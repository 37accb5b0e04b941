//! Key-switching operation

use crate::math::{NttContext, Poly};
use crate::rlwe::RlweCiphertext;

use super::gadget::gadget_decompose;
use super::setup::KeySwitchingMatrix;

/// Switch a single polynomial multiplier of the source key
///
/// For `c` multiplying the source key `from`, returns (a', b') with
/// `b' + a'·s' ≈ c·from`. Accumulates Σᵢ g⁻¹(c)ᵢ · K[i] in NTT domain.
pub fn key_switch_poly(c: &Poly, ks_matrix: &KeySwitchingMatrix, ctx: &NttContext) -> RlweCiphertext {
    let d = c.dimension();
    let q = c.modulus();

    let mut result_a = Poly::zero(d, q);
    let mut result_b = Poly::zero(d, q);
    result_a.to_ntt(ctx);
    result_b.to_ntt(ctx);

    for (mut digit, row) in gadget_decompose(c, &ks_matrix.gadget)
        .into_iter()
        .zip(ks_matrix.rows.iter())
    {
        digit.to_ntt(ctx);
        result_a += &digit.mul_ntt_domain(&row.a, ctx);
        result_b += &digit.mul_ntt_domain(&row.b, ctx);
    }

    result_a.from_ntt(ctx);
    result_b.from_ntt(ctx);

    RlweCiphertext::from_parts(result_a, result_b)
}

/// Apply key-switching to transform a ciphertext from key s to key s'
///
/// Given ciphertext (a, b) under key s and key-switching matrix K from s to s':
///
/// 1. Decompose a using gadget: g⁻¹(a) = [a₀, a₁, ..., a_{ℓ-1}]
/// 2. Compute: (a', b') = (0, b) + Σᵢ aᵢ · K[i]
///
/// The result satisfies: a'·s' + b' ≈ a·s + b (the same decrypted message)
pub fn key_switch(
    ct: &RlweCiphertext,
    ks_matrix: &KeySwitchingMatrix,
    ctx: &NttContext,
) -> RlweCiphertext {
    let switched = key_switch_poly(&ct.a, ks_matrix, ctx);
    RlweCiphertext::from_parts(switched.a, &switched.b + &ct.b)
}
