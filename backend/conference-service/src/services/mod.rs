/// Business logic services
pub mod recording;
pub mod storage;

pub use recording::RecordingCoordinator;
pub use storage::{ObjectStore, S3ObjectStore};
