use crate::StorageError;

pub const ENDPOINT_KEY_SEPARATOR: u8 = 0;

/// Index key identifying one recorded game on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointKey<'a> {
    pub platform_id: &'a str,
    pub game_id: &'a str,
}

impl<'a> EndpointKey<'a> {
    pub fn new(platform_id: &'a str, game_id: &'a str) -> Result<Self, StorageError> {
        for (name, value) in [("platformId", platform_id), ("gameId", game_id)] {
            if value.as_bytes().contains(&ENDPOINT_KEY_SEPARATOR) {
                return Err(StorageError::InvalidRecord(format!(
                    "{name} contains a NUL byte"
                )));
            }
        }
        Ok(Self {
            platform_id,
            game_id,
        })
    }

    pub fn to_bytes(self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.platform_id.len() + 1 + self.game_id.len());
        key.extend_from_slice(self.platform_id.as_bytes());
        key.push(ENDPOINT_KEY_SEPARATOR);
        key.extend_from_slice(self.game_id.as_bytes());
        key
    }
}
