use crate::api::EndpointRecord;
use crate::StorageError;

pub fn encode_record(record: &EndpointRecord) -> Result<Vec<u8>, StorageError> {
    Ok(serde_json::to_vec(record)?)
}

pub fn decode_record(bytes: &[u8]) -> Result<EndpointRecord, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}
