//! Typed room signaling
//!
//! Moderation and status signals travel over the media platform's data
//! channel. The wire format is a closed tagged union rather than ad hoc
//! string-tagged JSON, so every participant agrees on the message set.

use serde::{Deserialize, Serialize};

/// Room-wide broadcast signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RoomSignal {
    /// Moderator asks a participant to mute their microphone.
    #[serde(rename = "mute_request")]
    MuteRequest { target: String },

    /// Moderator removes a participant from the room.
    #[serde(rename = "kick")]
    Kick { target: String },

    /// Participant raised or lowered their hand.
    #[serde(rename = "hand_raise")]
    HandRaise { identity: String, raised: bool },

    /// Recording started or stopped for the room.
    #[serde(rename = "recording_status")]
    RecordingStatus {
        active: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        egress_id: Option<String>,
    },
}

impl RoomSignal {
    pub fn encode(&self) -> Vec<u8> {
        // A closed enum of plain fields cannot fail to serialize.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a data-channel payload. Unknown or malformed payloads are
    /// dropped rather than surfaced; a misbehaving peer must not break the
    /// room.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        serde_json::from_slice(payload).ok()
    }
}

/// Per-client reactions to room signals.
pub trait SignalHandler {
    fn on_mute_request(&mut self, target: &str);
    fn on_kick(&mut self, target: &str);
    fn on_hand_raise(&mut self, identity: &str, raised: bool);
    fn on_recording_status(&mut self, active: bool, egress_id: Option<&str>);
}

/// Route one decoded signal to the handler.
pub fn dispatch<H: SignalHandler>(signal: &RoomSignal, handler: &mut H) {
    match signal {
        RoomSignal::MuteRequest { target } => handler.on_mute_request(target),
        RoomSignal::Kick { target } => handler.on_kick(target),
        RoomSignal::HandRaise { identity, raised } => handler.on_hand_raise(identity, *raised),
        RoomSignal::RecordingStatus { active, egress_id } => {
            handler.on_recording_status(*active, egress_id.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorded {
        muted: Vec<String>,
        hands: Vec<(String, bool)>,
        recording: Option<bool>,
    }

    impl SignalHandler for Recorded {
        fn on_mute_request(&mut self, target: &str) {
            self.muted.push(target.to_string());
        }
        fn on_kick(&mut self, _target: &str) {}
        fn on_hand_raise(&mut self, identity: &str, raised: bool) {
            self.hands.push((identity.to_string(), raised));
        }
        fn on_recording_status(&mut self, active: bool, _egress_id: Option<&str>) {
            self.recording = Some(active);
        }
    }

    #[test]
    fn test_wire_format_is_tagged() {
        let signal = RoomSignal::HandRaise {
            identity: "ann".into(),
            raised: true,
        };
        let json: serde_json::Value = serde_json::from_slice(&signal.encode()).unwrap();
        assert_eq!(json["type"], "hand_raise");
        assert_eq!(json["identity"], "ann");
    }

    #[test]
    fn test_malformed_payloads_dropped() {
        assert_eq!(RoomSignal::decode(b"garbage"), None);
        assert_eq!(RoomSignal::decode(br#"{"type":"unknown_thing"}"#), None);
        assert_eq!(RoomSignal::decode(b""), None);
    }

    #[test]
    fn test_dispatch_routes_by_variant() {
        let mut handler = Recorded::default();
        let payload = RoomSignal::RecordingStatus {
            active: true,
            egress_id: Some("EG_1".into()),
        }
        .encode();
        dispatch(&RoomSignal::decode(&payload).unwrap(), &mut handler);
        dispatch(
            &RoomSignal::MuteRequest {
                target: "bob".into(),
            },
            &mut handler,
        );

        assert_eq!(handler.recording, Some(true));
        assert_eq!(handler.muted, vec!["bob".to_string()]);
    }
}
