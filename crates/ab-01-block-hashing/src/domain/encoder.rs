//! Canonical Encoder
//!
//! Serializes an [`AccountBlock`] into the exact byte sequence the network
//! hashes. Field order:
//!
//! ```text
//! ┌──────────────┬───────────────┬──────────┬──────────────────┐
//! │ block type 1 │ prev hash 32  │ height 8 │ address (orig) 21│
//! ├──────────────┴───────────────┴──────────┴──────────────────┤
//! │ request:  to-address 21 │ amount 32 │ token id 10           │
//! │ response: send-block hash 32                               │
//! ├───────────────┬────────┬──────────────┬─────────┬──────────┤
//! │ data hash 32? │ fee 32 │ vmlog hash ? │ nonce 8 │ child×32 │
//! └───────────────┴────────┴──────────────┴─────────┴──────────┘
//! ```
//!
//! Width-bounded fields are left-padded with zeros. A value that does not fit
//! is an [`EncodingError`]; it is never truncated.

use shared_crypto::blake2b_256;
use shared_types::{
    AccountBlock, Amount, BlockBody, EncodingError, Nonce, AMOUNT_WIDTH, NONCE_WIDTH, ZERO_HASH,
};

/// Width of an encoded height.
pub const HEIGHT_WIDTH: usize = 8;

/// Left-pad `bytes` with zeros to `width`.
///
/// Fails when `bytes` is already wider than `width`.
pub fn left_pad(bytes: &[u8], width: usize, field: &'static str) -> Result<Vec<u8>, EncodingError> {
    if bytes.len() > width {
        return Err(EncodingError::FieldTooWide {
            field,
            max: width,
            actual: bytes.len(),
        });
    }
    let mut out = vec![0u8; width];
    out[width - bytes.len()..].copy_from_slice(bytes);
    Ok(out)
}

/// Big-endian 8-byte height; empty for an unlinked (zero) height.
pub fn encode_height(height: u64) -> Vec<u8> {
    if height == 0 {
        Vec::new()
    } else {
        height.to_be_bytes().to_vec()
    }
}

/// Amount or fee as a 32-byte big-endian field. Zero is 32 zero bytes.
pub fn encode_amount(amount: &Amount, field: &'static str) -> Result<Vec<u8>, EncodingError> {
    left_pad(&amount.to_be_bytes_minimal(), AMOUNT_WIDTH, field)
}

/// Nonce left-padded to 8 bytes. No nonce is 8 zero bytes.
pub fn encode_nonce(nonce: Option<&Nonce>) -> Result<Vec<u8>, EncodingError> {
    let bytes = nonce.map(Nonce::as_bytes).unwrap_or_default();
    left_pad(bytes, NONCE_WIDTH, "nonce")
}

/// Hash of the payload; empty when there is no payload.
pub fn encode_data(data: Option<&[u8]>) -> Vec<u8> {
    match data {
        Some(bytes) if !bytes.is_empty() => blake2b_256(bytes).to_vec(),
        _ => Vec::new(),
    }
}

/// Canonical byte sequence of a block.
pub fn encode_account_block(block: &AccountBlock) -> Result<Vec<u8>, EncodingError> {
    let mut source = Vec::with_capacity(256);

    source.push(block.block_type().as_u8());
    source.extend_from_slice(block.previous_hash.as_ref().unwrap_or(&ZERO_HASH));
    source.extend_from_slice(&encode_height(block.height));
    source.extend_from_slice(&block.address.original_bytes());

    match &block.body {
        BlockBody::Request(request) => {
            source.extend_from_slice(&request.to_address.original_bytes());
            source.extend_from_slice(&encode_amount(&request.amount, "amount")?);
            source.extend_from_slice(&request.token_id.original_bytes());
        }
        BlockBody::Response(response) => {
            source.extend_from_slice(response.send_block_hash.as_ref().unwrap_or(&ZERO_HASH));
        }
    }

    source.extend_from_slice(&encode_data(block.data.as_deref()));
    source.extend_from_slice(&encode_amount(&block.fee.unwrap_or_default(), "fee")?);
    if let Some(vmlog_hash) = &block.vmlog_hash {
        source.extend_from_slice(vmlog_hash);
    }
    source.extend_from_slice(&encode_nonce(block.nonce.as_ref())?);

    for child in &block.triggered_send_blocks {
        source.extend_from_slice(&child.hash);
    }

    Ok(source)
}

/// Canonical encoding as lowercase hex.
pub fn encode_account_block_hex(block: &AccountBlock) -> Result<String, EncodingError> {
    encode_account_block(block).map(hex::encode)
}
