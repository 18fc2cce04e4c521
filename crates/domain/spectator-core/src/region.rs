use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Well-known spectator regions that expand into a base URL and platform id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Kr,
    Euw1,
    Na1,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Kr, Region::Euw1, Region::Na1];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Kr => "kr",
            Region::Euw1 => "euw1",
            Region::Na1 => "na1",
        }
    }

    pub fn platform_id(self) -> String {
        self.as_str().to_uppercase()
    }

    pub fn base_url(self) -> String {
        format!("http://spectator-consumer.{}.lol.pvp.net:80", self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("'{}' is not a valid region", s))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EndpointDraft, EndpointField};

    #[test]
    fn region_expands_to_endpoint_fields() {
        assert_eq!(Region::Euw1.platform_id(), "EUW1");
        assert_eq!(
            Region::Kr.base_url(),
            "http://spectator-consumer.kr.lol.pvp.net:80"
        );
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("NA1".parse::<Region>(), Ok(Region::Na1));
        assert_eq!(
            "eune".parse::<Region>(),
            Err("'eune' is not a valid region".to_string())
        );
    }

    #[test]
    fn applying_a_region_keeps_game_and_key() {
        let mut draft = EndpointDraft::new();
        draft.set_field(EndpointField::GameId, "6654667050");
        draft.set_field(EndpointField::EncryptionKey, "k3y");
        draft.apply_region(Region::Kr);

        assert_eq!(draft.field(EndpointField::PlatformId), "KR");
        assert_eq!(draft.field(EndpointField::GameId), "6654667050");
        assert_eq!(draft.field(EndpointField::EncryptionKey), "k3y");
    }
}
