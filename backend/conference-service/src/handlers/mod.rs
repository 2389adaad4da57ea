/// HTTP handlers for conference-service
pub mod recording;
pub mod recordings;
pub mod rooms;
pub mod token;

pub use recording::recording_action;
pub use recordings::{
    delete_recording, download_recording, list_recordings, share_recording, stream_recording,
    stream_shared,
};
pub use rooms::{create_room, delete_room, list_rooms};
pub use token::issue_token;
