//! RLWE (Ring Learning With Errors) encryption module
//!
//! This module implements RLWE encryption over the ring R_q = Z_q[X]/(X^n + 1).
//!
//! # Overview
//!
//! - Secret key s is a polynomial sampled from the error distribution
//! - Public key is an encryption of zero, (a, -a·s + e)
//! - Ciphertext (a, b) encrypts message m as b = -a·s + e + Δ·m
//! - Δ = ⌊q/t⌋ is the scaling factor
//!
//! # Example
//!
//! ```
//! use fhe_doc_search::math::{GaussianSampler, NttContext, Poly};
//! use fhe_doc_search::params::SchemeParams;
//! use fhe_doc_search::rlwe::{RlweCiphertext, RlwePublicKey, RlweSecretKey};
//!
//! let params = SchemeParams::insecure_testing(256);
//! let ctx = NttContext::new(params.ring_dim, params.q);
//! let mut sampler = GaussianSampler::new(params.sigma);
//!
//! let sk = RlweSecretKey::generate(&params, &mut sampler);
//! let pk = RlwePublicKey::generate(&sk, &params, &mut sampler, &ctx);
//!
//! let message = Poly::constant(42, params.ring_dim, params.q);
//! let ct = RlweCiphertext::encrypt_public(&pk, &message, params.delta(), &mut sampler, &ctx);
//!
//! let decrypted = ct.decrypt(&sk, params.t, &ctx);
//! assert_eq!(decrypted.coeff(0), 42);
//! ```

mod enc;
mod galois;
mod types;

pub use galois::{
    apply_automorphism, automorphism_ciphertext, galois_elements, is_valid_galois_element,
};
pub use types::{RlweCiphertext, RlwePublicKey, RlweSecretKey};
