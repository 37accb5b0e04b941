//! Key-switching module
//!
//! Key-switching transforms a ciphertext valid under one key into one valid
//! under secret key s. The scheme uses it for relinearization (s² → s) and
//! for Galois rotations (τ_g(s) → s).
//!
//! # Key-Switching Matrix
//!
//! A key-switching matrix K from `from` to s consists of ℓ RLWE ciphertexts:
//! ```text
//! K = [RLWE_s(from·z^0), RLWE_s(from·z^1), ..., RLWE_s(from·z^(ℓ-1))]
//! ```
//!
//! # Algorithm
//!
//! To switch (a, b) from key `from` to key s:
//! 1. Decompose a using gadget: g⁻¹(a) = [a₀, a₁, ..., a_{ℓ-1}]
//! 2. Compute: (a', b') = (0, b) + Σᵢ aᵢ · K[i]

mod gadget;
mod setup;
mod switch;

pub use gadget::{gadget_decompose, GadgetVector};
pub use setup::{
    generate_automorphism_ks_matrix, generate_ks_matrix, generate_relin_matrix,
    KeySwitchingMatrix,
};
pub use switch::{key_switch, key_switch_poly};
