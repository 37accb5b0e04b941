//! Ciphertext blob format
//!
//! Little-endian layout:
//!
//! | Field     | Size      |
//! |-----------|-----------|
//! | magic     | 4 (`FSCT`)|
//! | version   | 1         |
//! | key id    | 16        |
//! | ring dim  | 4 (u32)   |
//! | modulus   | 8 (u64)   |
//! | a         | 8·n       |
//! | b         | 8·n       |
//!
//! The key id binds a blob to the key set that produced it, so a blob from
//! another context is rejected instead of decrypting to garbage.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, SearchError};
use crate::math::Poly;
use crate::params::SchemeParams;
use crate::rlwe::RlweCiphertext;

use super::keys::{KeyId, KEY_ID_LEN};

pub const MAGIC: [u8; 4] = *b"FSCT";
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = 4 + 1 + KEY_ID_LEN + 4 + 8;

/// Exact blob size for ring dimension `n`
pub fn blob_len(n: usize) -> usize {
    HEADER_LEN + 16 * n
}

pub fn serialize_ciphertext(ct: &RlweCiphertext, key_id: &KeyId) -> Vec<u8> {
    let n = ct.ring_dim();
    let mut out = Vec::with_capacity(blob_len(n));
    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(key_id);

    out.extend_from_slice(&(n as u32).to_le_bytes());
    out.extend_from_slice(&ct.modulus().to_le_bytes());
    for &c in ct.a.coeffs().iter().chain(ct.b.coeffs()) {
        out.extend_from_slice(&c.to_le_bytes());
    }
    out
}

/// Parse a blob produced under `key_id` and `params`
///
/// Fails with `Deserialization` on a foreign key id, foreign parameters,
/// truncated or oversized input, or coefficients outside [0, q).
pub fn deserialize_ciphertext(
    bytes: &[u8],
    params: &SchemeParams,
    key_id: &KeyId,
) -> Result<RlweCiphertext> {
    let n = params.ring_dim;
    if bytes.len() != blob_len(n) {
        return Err(invalid(format!(
            "expected {} bytes, got {}",
            blob_len(n),
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(io_invalid)?;
    if magic != MAGIC {
        return Err(invalid("bad magic".to_string()));
    }
    let version = cursor.read_u8().map_err(io_invalid)?;
    if version != FORMAT_VERSION {
        return Err(invalid(format!("unsupported version {}", version)));
    }

    let mut blob_key = [0u8; KEY_ID_LEN];
    cursor.read_exact(&mut blob_key).map_err(io_invalid)?;
    if &blob_key != key_id {
        return Err(invalid(format!(
            "produced under key {}, context key is {}",
            hex::encode(blob_key),
            hex::encode(key_id)
        )));
    }

    let ring_dim = cursor.read_u32::<LittleEndian>().map_err(io_invalid)? as usize;
    let q = cursor.read_u64::<LittleEndian>().map_err(io_invalid)?;
    if ring_dim != n || q != params.q {
        return Err(invalid(format!(
            "parameters (n={}, q={}) do not match (n={}, q={})",
            ring_dim, q, n, params.q
        )));
    }

    let mut read_poly = || -> Result<Poly> {
        let mut coeffs = vec![0u64; n];
        cursor
            .read_u64_into::<LittleEndian>(&mut coeffs)
            .map_err(io_invalid)?;
        if coeffs.iter().any(|&c| c >= q) {
            return Err(invalid("coefficient out of range".to_string()));
        }
        Ok(Poly::from_coeffs(coeffs, q))
    };
    let a = read_poly()?;
    let b = read_poly()?;

    Ok(RlweCiphertext::from_parts(a, b))
}

fn invalid(msg: String) -> SearchError {
    SearchError::Deserialization(msg)
}

fn io_invalid(e: std::io::Error) -> SearchError {
    SearchError::Deserialization(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::GaussianSampler;

    fn sample_ct(params: &SchemeParams) -> RlweCiphertext {
        let mut sampler = GaussianSampler::with_seed(params.sigma, 1);
        let a = Poly::random_with_rng(params.ring_dim, params.q, sampler.rng_mut());
        let b = Poly::random_with_rng(params.ring_dim, params.q, sampler.rng_mut());
        RlweCiphertext::from_parts(a, b)
    }

    #[test]
    fn test_blob_roundtrip() {
        let params = SchemeParams::insecure_testing(64);
        let ct = sample_ct(&params);
        let key_id = [7u8; KEY_ID_LEN];

        let blob = serialize_ciphertext(&ct, &key_id);
        assert_eq!(blob.len(), blob_len(64));
        assert_eq!(&blob[..4], b"FSCT");

        let parsed = deserialize_ciphertext(&blob, &params, &key_id).unwrap();
        assert_eq!(parsed, ct);
    }

    #[test]
    fn test_header_and_coefficients_little_endian() {
        let params = SchemeParams::insecure_testing(64);
        let ct = sample_ct(&params);
        let key_id = [9u8; KEY_ID_LEN];

        let blob = serialize_ciphertext(&ct, &key_id);

        assert_eq!(blob[4], FORMAT_VERSION);
        assert_eq!(&blob[5..5 + KEY_ID_LEN], &key_id);
        let mut at = 5 + KEY_ID_LEN;
        assert_eq!(blob[at..at + 4], 64u32.to_le_bytes());
        at += 4;
        assert_eq!(blob[at..at + 8], params.q.to_le_bytes());
        at += 8;
        assert_eq!(blob[at..at + 8], ct.a.coeff(0).to_le_bytes());
        let b0 = HEADER_LEN + 8 * 64;
        assert_eq!(blob[b0..b0 + 8], ct.b.coeff(0).to_le_bytes());
    }

    #[test]
    fn test_rejects_foreign_key_id() {
        let params = SchemeParams::insecure_testing(64);
        let blob = serialize_ciphertext(&sample_ct(&params), &[1u8; KEY_ID_LEN]);

        let err = deserialize_ciphertext(&blob, &params, &[2u8; KEY_ID_LEN]).unwrap_err();
        assert!(matches!(err, SearchError::Deserialization(_)));
    }

    #[test]
    fn test_rejects_truncated_and_foreign_params() {
        let params = SchemeParams::insecure_testing(64);
        let key_id = [3u8; KEY_ID_LEN];
        let blob = serialize_ciphertext(&sample_ct(&params), &key_id);

        assert!(deserialize_ciphertext(&blob[..blob.len() - 1], &params, &key_id).is_err());
        assert!(deserialize_ciphertext(&[], &params, &key_id).is_err());

        let other = SchemeParams::insecure_testing(128);
        assert!(matches!(
            deserialize_ciphertext(&blob, &other, &key_id),
            Err(SearchError::Deserialization(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_coefficient() {
        let params = SchemeParams::insecure_testing(64);
        let key_id = [4u8; KEY_ID_LEN];
        let mut blob = serialize_ciphertext(&sample_ct(&params), &key_id);

        let last = blob.len() - 8;
        blob[last..].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            deserialize_ciphertext(&blob, &params, &key_id),
            Err(SearchError::Deserialization(_))
        ));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let params = SchemeParams::insecure_testing(64);
        let key_id = [5u8; KEY_ID_LEN];
        let mut blob = serialize_ciphertext(&sample_ct(&params), &key_id);
        blob[0] = b'X';

        assert!(deserialize_ciphertext(&blob, &params, &key_id).is_err());
    }
}
