//! The payload compiled into the binary.

use rust_embed::RustEmbed;

use sealpack_core::{EncryptedPayload, Result, SealError};

use crate::constants::PAYLOAD_ASSET;

#[derive(RustEmbed)]
#[folder = "payload/"]
struct PayloadAssets;

/// Load the embedded payload.
pub fn embedded_payload() -> Result<EncryptedPayload> {
    let file = PayloadAssets::get(PAYLOAD_ASSET).ok_or_else(|| {
        SealError::Filesystem(format!("Embedded payload {} is missing", PAYLOAD_ASSET))
    })?;
    Ok(EncryptedPayload::from_encoded(file.data))
}
