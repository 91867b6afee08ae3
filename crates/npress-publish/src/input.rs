use serde::Deserialize;

use crate::config::PublicationConfig;
use crate::config::TemplateMapping;
use crate::error::PublishError;
use crate::record::ContentRecord;

/// The two fields an encrypted content body must carry. Decryption itself
/// happens elsewhere; this service only verifies the payload shape.
#[derive(Clone, Debug, Deserialize)]
pub struct EncryptedPayload {
    pub ciphertext: String,
    #[serde(rename = "dataToEncryptHash")]
    pub data_to_encrypt_hash: String,
}

/// Fail fast on anything the render would need but does not have.
pub fn validate_inputs(
    config: Option<&PublicationConfig>,
    mapping: Option<&TemplateMapping>,
    record: Option<&ContentRecord>,
    signer_address: &str,
) -> Result<(), PublishError> {
    let config = config.ok_or(PublishError::MissingInput("config"))?;
    mapping.ok_or(PublishError::MissingInput("mapping"))?;
    let record = record.ok_or(PublishError::MissingInput("record"))?;
    if signer_address.is_empty() {
        return Err(PublishError::MissingInput("signer address"));
    }
    if config.encrypted {
        encrypted_payload(record)?;
    }
    Ok(())
}

/// Parse the record's content body as an encrypted payload envelope.
pub fn encrypted_payload(record: &ContentRecord) -> Result<EncryptedPayload, PublishError> {
    let payload: EncryptedPayload = serde_json::from_str(&record.content)
        .map_err(|_| PublishError::InvalidContentFormat)?;
    if payload.ciphertext.is_empty() || payload.data_to_encrypt_hash.is_empty() {
        return Err(PublishError::MissingEncryptionData);
    }
    Ok(payload)
}
