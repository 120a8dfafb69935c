//! Sealing of bid amounts to the MXE public key.
//!
//! Layout of the 64-byte field:
//!
//! | bytes    | content                                   |
//! |----------|-------------------------------------------|
//! | 0..32    | ephemeral x25519 public key               |
//! | 32..40   | AES-256-GCM ciphertext of `amount` (LE)   |
//! | 40..56   | GCM tag                                   |
//! | 56..64   | zero                                      |
//!
//! The symmetric key is HKDF-SHA256 over the x25519 shared secret, salted with
//! the bid nonce. The first 12 nonce bytes are the GCM nonce.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use curve25519_dalek::montgomery::MontgomeryPoint;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use crate::{BidCiphertext, BidNonce, MpcError, MpcResult, MxePublicKey, CIPHERTEXT_LEN};

const KDF_INFO: &[u8] = b"blind-auction/sealed-bid/v1";
const EPHEMERAL_LEN: usize = 32;
const BODY_END: usize = EPHEMERAL_LEN + 8 + 16;

/// Seals `amount` with a fresh ephemeral key.
pub fn seal(amount: u64, key: &MxePublicKey, nonce: &BidNonce) -> MpcResult<BidCiphertext> {
    let mut ephemeral = [0u8; 32];
    OsRng.fill_bytes(&mut ephemeral);
    seal_with_ephemeral(amount, key, nonce, ephemeral)
}

pub(crate) fn seal_with_ephemeral(
    amount: u64,
    key: &MxePublicKey,
    nonce: &BidNonce,
    ephemeral_secret: [u8; 32],
) -> MpcResult<BidCiphertext> {
    let ephemeral_public = MontgomeryPoint::mul_base_clamped(ephemeral_secret);
    let shared = MontgomeryPoint(key.0).mul_clamped(ephemeral_secret);
    if shared.to_bytes() == [0u8; 32] {
        return Err(MpcError::InvalidKey("low order point".to_string()));
    }

    let cipher = symmetric_cipher(&shared, ephemeral_public.as_bytes(), nonce)?;
    let body = cipher
        .encrypt(
            Nonce::from_slice(&nonce.0[..12]),
            Payload {
                msg: &amount.to_le_bytes(),
                aad: ephemeral_public.as_bytes(),
            },
        )
        .map_err(|e| MpcError::Encryption(e.to_string()))?;

    let mut out = [0u8; CIPHERTEXT_LEN];
    out[..EPHEMERAL_LEN].copy_from_slice(ephemeral_public.as_bytes());
    out[EPHEMERAL_LEN..BODY_END].copy_from_slice(&body);
    Ok(BidCiphertext(out))
}

/// Opens a sealed amount with the MXE secret key.
pub fn open(secret: &[u8; 32], ciphertext: &BidCiphertext, nonce: &BidNonce) -> MpcResult<u64> {
    let bytes = &ciphertext.0;
    if bytes[BODY_END..].iter().any(|b| *b != 0) {
        return Err(MpcError::Decryption("non-zero padding".to_string()));
    }
    let mut ephemeral = [0u8; EPHEMERAL_LEN];
    ephemeral.copy_from_slice(&bytes[..EPHEMERAL_LEN]);
    let shared = MontgomeryPoint(ephemeral).mul_clamped(*secret);

    let cipher = symmetric_cipher(&shared, &ephemeral, nonce)?;
    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(&nonce.0[..12]),
            Payload {
                msg: &bytes[EPHEMERAL_LEN..BODY_END],
                aad: &ephemeral,
            },
        )
        .map_err(|e| MpcError::Decryption(e.to_string()))?;

    let amount: [u8; 8] = plaintext
        .try_into()
        .map_err(|_| MpcError::Decryption("unexpected plaintext width".to_string()))?;
    Ok(u64::from_le_bytes(amount))
}

fn symmetric_cipher(
    shared: &MontgomeryPoint,
    ephemeral_public: &[u8; 32],
    nonce: &BidNonce,
) -> MpcResult<Aes256Gcm> {
    let mut info = KDF_INFO.to_vec();
    info.extend_from_slice(ephemeral_public);

    let mut okm = [0u8; 32];
    Hkdf::<Sha256>::new(Some(&nonce.0), shared.as_bytes())
        .expand(&info, &mut okm)
        .map_err(|e| MpcError::Encryption(e.to_string()))?;
    Aes256Gcm::new_from_slice(&okm).map_err(|e| MpcError::Encryption(e.to_string()))
}
