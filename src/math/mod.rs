//! Mathematical primitives for the homomorphic scheme.
//!
//! - **Modular arithmetic** over Z_q
//! - **Number-Theoretic Transform (NTT)** for fast polynomial multiplication
//!   and for slot batching modulo the plaintext prime
//! - **Polynomial operations** over R_q = Z_q[X]/(X^n + 1)
//! - **Sampling** of Gaussian errors and ternary secrets
//!
//! # Example
//!
//! ```
//! use fhe_doc_search::math::{NttContext, Poly};
//! use fhe_doc_search::params::DEFAULT_Q;
//!
//! let ctx = NttContext::new(256, DEFAULT_Q);
//! let mut poly = Poly::constant(5, 256, DEFAULT_Q);
//! poly.to_ntt(&ctx);
//! assert!(poly.is_ntt());
//! ```

pub mod gaussian;
pub mod modular;
pub mod ntt;
pub mod poly;

pub use gaussian::GaussianSampler;
pub use modular::ModQ;
pub use ntt::NttContext;
pub use poly::Poly;
