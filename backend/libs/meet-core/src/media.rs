//! Media session seam
//!
//! Room logic talks to the real-time media platform through this trait so it
//! can run against a fake session in tests. Transport, encoding, and track
//! subscription live entirely on the platform side.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaSessionError {
    #[error("not connected to a room")]
    NotConnected,
    #[error("media transport error: {0}")]
    Transport(String),
}

/// Local participant media state, mirrored from the platform SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalMediaState {
    pub identity: String,
    pub mic_enabled: bool,
    pub camera_enabled: bool,
    pub screen_sharing: bool,
    pub hand_raised: bool,
}

/// Client-side handle on a live media session.
#[async_trait]
pub trait MediaSessionClient: Send + Sync {
    /// Connect to a room with a signed join token.
    async fn join(&self, room_name: &str, token: &str) -> Result<(), MediaSessionError>;

    /// Broadcast a payload on the room's data channel.
    async fn publish_data(&self, payload: &[u8]) -> Result<(), MediaSessionError>;

    fn local_state(&self) -> LocalMediaState;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSession {
        joined: Mutex<Option<String>>,
        published: Mutex<Vec<Vec<u8>>>,
    }

    #[async_trait]
    impl MediaSessionClient for FakeSession {
        async fn join(&self, room_name: &str, _token: &str) -> Result<(), MediaSessionError> {
            *self.joined.lock().unwrap() = Some(room_name.to_string());
            Ok(())
        }

        async fn publish_data(&self, payload: &[u8]) -> Result<(), MediaSessionError> {
            if self.joined.lock().unwrap().is_none() {
                return Err(MediaSessionError::NotConnected);
            }
            self.published.lock().unwrap().push(payload.to_vec());
            Ok(())
        }

        fn local_state(&self) -> LocalMediaState {
            LocalMediaState {
                identity: "ann".to_string(),
                mic_enabled: true,
                ..LocalMediaState::default()
            }
        }
    }

    #[tokio::test]
    async fn test_publish_requires_joined_room() {
        let session = FakeSession::default();
        assert!(matches!(
            session.publish_data(b"ping").await,
            Err(MediaSessionError::NotConnected)
        ));

        session.join("standup", "signed-token").await.unwrap();
        session.publish_data(b"ping").await.unwrap();
        assert_eq!(session.published.lock().unwrap().len(), 1);
        assert!(session.local_state().mic_enabled);
    }
}
