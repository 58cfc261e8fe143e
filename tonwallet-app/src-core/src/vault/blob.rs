//! Wire framing of encrypted blobs.
//!
//! Versioned frame (what `encrypt` writes):
//!
//! ```text
//! offset 0   version   1 byte   (0x01 PBKDF2-SHA256, 0x02 Argon2id)
//! offset 1   salt     16 bytes
//! offset 17  nonce    12 bytes
//! offset 29  ciphertext || tag (16 bytes)
//! ```
//!
//! Legacy frame (unversioned, written by the browser wallet, PBKDF2 only):
//!
//! ```text
//! offset 0   salt     16 bytes
//! offset 16  nonce    12 bytes
//! offset 28  ciphertext || tag (16 bytes)
//! ```
//!
//! The whole frame travels as standard padded base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::cipher::KdfScheme;
use super::error::{VaultError, VaultResult};

pub const VERSION_LEN: usize = 1;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Shortest legal legacy frame: empty plaintext still carries a tag.
pub const LEGACY_MIN_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;
/// Shortest legal versioned frame.
pub const VERSIONED_MIN_LEN: usize = VERSION_LEN + LEGACY_MIN_LEN;

/// A frame split at its fixed offsets.
#[derive(Debug, Clone, Copy)]
pub struct BlobParts<'a> {
    pub scheme: KdfScheme,
    pub salt: &'a [u8; SALT_LEN],
    pub nonce: &'a [u8; NONCE_LEN],
    pub ciphertext: &'a [u8],
}

/// Concatenate a versioned frame and encode it for transport.
pub fn frame(
    scheme: KdfScheme,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> String {
    let mut out = Vec::with_capacity(VERSION_LEN + SALT_LEN + NONCE_LEN + ciphertext.len());
    out.push(scheme.version_byte());
    out.extend_from_slice(salt);
    out.extend_from_slice(nonce);
    out.extend_from_slice(ciphertext);
    STANDARD.encode(out)
}

/// Decode the transport encoding.
pub fn decode(encoded: &str) -> VaultResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| VaultError::InvalidCredentialOrCorruptData)
}

/// Every plausible reading of `bytes`, most likely first.
///
/// A legacy frame starts with a random salt, so a leading byte that happens
/// to equal a version tag does not rule the legacy reading out.
///
/// A frame of versioned length always gets a versioned reading, even when
/// the tag is unknown (read as PBKDF2, which then fails authentication).
/// A wrong PIN and a damaged version byte thus cost the same key
/// derivations.
pub fn candidates(bytes: &[u8]) -> Vec<BlobParts<'_>> {
    let mut out = Vec::with_capacity(2);

    if bytes.len() >= VERSIONED_MIN_LEN {
        let scheme = KdfScheme::from_version_byte(bytes[0]).unwrap_or_default();
        if let Some(parts) = split_at(scheme, &bytes[VERSION_LEN..]) {
            out.push(parts);
        }
    }

    if bytes.len() >= LEGACY_MIN_LEN {
        if let Some(parts) = split_at(KdfScheme::Pbkdf2Sha256, bytes) {
            out.push(parts);
        }
    }

    out
}

fn split_at(scheme: KdfScheme, body: &[u8]) -> Option<BlobParts<'_>> {
    let (salt, rest) = body.split_first_chunk::<SALT_LEN>()?;
    let (nonce, ciphertext) = rest.split_first_chunk::<NONCE_LEN>()?;
    if ciphertext.len() < TAG_LEN {
        return None;
    }
    Some(BlobParts {
        scheme,
        salt,
        nonce,
        ciphertext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_offsets() {
        let salt = [0xAAu8; SALT_LEN];
        let nonce = [0xBBu8; NONCE_LEN];
        let ciphertext = [0xCCu8; TAG_LEN + 3];
        let encoded = frame(KdfScheme::Pbkdf2Sha256, &salt, &nonce, &ciphertext);
        let bytes = decode(&encoded).unwrap();

        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..17], &salt);
        assert_eq!(&bytes[17..29], &nonce);
        assert_eq!(&bytes[29..], &ciphertext);

        let parts = candidates(&bytes);
        assert_eq!(parts[0].scheme, KdfScheme::Pbkdf2Sha256);
        assert_eq!(parts[0].salt, &salt);
        assert_eq!(parts[0].nonce, &nonce);
        assert_eq!(parts[0].ciphertext, &ciphertext);
    }

    #[test]
    fn test_short_frames_have_no_reading() {
        assert!(candidates(&[]).is_empty());
        assert!(candidates(&[0x01; LEGACY_MIN_LEN - 1]).is_empty());
        // Exactly legacy-sized: only the legacy reading fits.
        let parts = candidates(&[0x01; LEGACY_MIN_LEN]);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].ciphertext.len(), TAG_LEN);
    }

    #[test]
    fn test_unknown_version_falls_back_to_legacy() {
        let bytes = [0x7Fu8; VERSIONED_MIN_LEN + 8];
        let parts = candidates(&bytes);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].scheme, KdfScheme::Pbkdf2Sha256);
        assert_eq!(parts[1].ciphertext.len(), bytes.len() - SALT_LEN - NONCE_LEN);
    }

    #[test]
    fn test_damaged_version_byte_gets_same_readings() {
        let salt = [0x11u8; SALT_LEN];
        let nonce = [0x22u8; NONCE_LEN];
        let ciphertext = [0x33u8; TAG_LEN + 5];
        let intact = decode(&frame(KdfScheme::Pbkdf2Sha256, &salt, &nonce, &ciphertext)).unwrap();
        let mut damaged = intact.clone();
        damaged[0] = 0x9E;

        let intact_parts = candidates(&intact);
        let damaged_parts = candidates(&damaged);
        assert_eq!(intact_parts.len(), damaged_parts.len());
        for (a, b) in intact_parts.iter().zip(&damaged_parts) {
            assert_eq!(a.scheme, b.scheme);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode("not base64 at all!"),
            Err(VaultError::InvalidCredentialOrCorruptData)
        ));
    }
}
