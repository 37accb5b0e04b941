//! Batch encryption and decryption under a scheme context

use tracing::debug;

use crate::error::Result;
use crate::scheme::{deserialize_ciphertext, serialize_ciphertext, SchemeContext};

use super::tokenizer::TokenBatch;

/// Encrypt each batch under the public key and serialize it to a blob
///
/// `progress` receives the completed percentage in [0, 100] after every
/// batch. Values must be below the plaintext modulus.
pub fn encrypt_batches(
    ctx: &SchemeContext,
    batches: &[TokenBatch],
    progress: &mut dyn FnMut(f64),
) -> Result<Vec<Vec<u8>>> {
    let encoder = ctx.encoder()?;
    let encryptor = ctx.encryptor()?;
    let key_id = ctx.key_id()?;

    let total = batches.len();
    let mut blobs = Vec::with_capacity(total);
    for (i, batch) in batches.iter().enumerate() {
        let plaintext = encoder.encode(batch)?;
        let ciphertext = encryptor.encrypt(&plaintext);
        blobs.push(serialize_ciphertext(&ciphertext, &key_id));
        progress(percent(i + 1, total));
    }

    debug!(batches = total, "encrypted batches");
    Ok(blobs)
}

/// Deserialize, decrypt and decode each blob to `slot_count` values
pub fn decrypt_batches(ctx: &SchemeContext, blobs: &[Vec<u8>]) -> Result<Vec<Vec<u64>>> {
    let params = ctx.params()?;
    let encoder = ctx.encoder()?;
    let decryptor = ctx.decryptor()?;
    let key_id = ctx.key_id()?;

    blobs
        .iter()
        .map(|blob| {
            let ciphertext = deserialize_ciphertext(blob, params, &key_id)?;
            Ok(encoder.decode(&decryptor.decrypt(&ciphertext)))
        })
        .collect()
}

pub(crate) fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    }
}
