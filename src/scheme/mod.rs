//! BFV-style batching scheme on top of the RLWE layer
//!
//! [`SchemeContext`] owns the parameters and key set and hands out the
//! engines:
//!
//! - [`BatchEncoder`]: slot vectors ↔ plaintext polynomials mod t
//! - [`Encryptor`]: public-key encryption
//! - [`Decryptor`]: secret-key decryption and noise budget
//! - [`Evaluator`]: add, sub, relinearize, Galois rotations
//!
//! Ciphertexts cross process boundaries as blobs, see [`serialize`].

mod context;
mod decryptor;
mod encoder;
mod encryptor;
mod evaluator;
pub mod keys;
pub mod serialize;

pub use context::SchemeContext;
pub use decryptor::Decryptor;
pub use encoder::{BatchEncoder, Plaintext};
pub use encryptor::Encryptor;
pub use evaluator::{Evaluator, ExtendedCiphertext};
pub use keys::{KeyId, KeyMaterial, KeySet};
pub use serialize::{deserialize_ciphertext, serialize_ciphertext};
