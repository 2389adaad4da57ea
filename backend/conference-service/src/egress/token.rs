/// Access tokens for the media platform
///
/// Both room join tokens (clients) and service tokens (egress API calls) are
/// short-lived HS256 JWTs signed with the project's api key/secret.
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::EgressError;

/// Video permissions embedded in an access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub room_join: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub room_record: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub can_publish: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub can_subscribe: bool,
}

impl VideoGrant {
    /// Grants for a participant joining a room.
    pub fn join(room_name: &str) -> Self {
        Self {
            room: Some(room_name.to_string()),
            room_join: true,
            can_publish: true,
            can_subscribe: true,
            room_record: false,
        }
    }

    /// Grants for server-side egress API calls.
    pub fn record() -> Self {
        Self {
            room_record: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    iss: String,
    sub: String,
    exp: i64,
    nbf: i64,
    video: VideoGrant,
}

/// Sign an access token for the media platform.
pub fn mint(
    api_key: &str,
    api_secret: &str,
    identity: &str,
    grant: VideoGrant,
    ttl_secs: i64,
) -> Result<String, EgressError> {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        iss: api_key.to_string(),
        sub: identity.to_string(),
        exp: now + ttl_secs,
        nbf: now - 10,
        video: grant,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )
    .map_err(|e| EgressError::Token(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    #[test]
    fn test_join_token_carries_room_grants() {
        let token = mint("api-key", "api-secret", "ann", VideoGrant::join("standup"), 3600)
            .unwrap();

        let decoded = decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(b"api-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.iss, "api-key");
        assert_eq!(decoded.claims.sub, "ann");
        assert!(decoded.claims.video.room_join);
        assert!(decoded.claims.video.can_publish);
        assert_eq!(decoded.claims.video.room.as_deref(), Some("standup"));
        assert!(!decoded.claims.video.room_record);
    }

    #[test]
    fn test_record_grant_omits_join_fields() {
        let token = mint("k", "s", "conference-service", VideoGrant::record(), 600).unwrap();
        let decoded = decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(b"s"),
            &Validation::default(),
        )
        .unwrap();
        assert!(decoded.claims.video.room_record);
        assert!(!decoded.claims.video.room_join);
    }
}
