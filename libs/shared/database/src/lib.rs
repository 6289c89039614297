pub mod memory;
pub mod realtime;
pub mod source;

pub use memory::MemorySource;
pub use realtime::RealtimeClient;
pub use source::{SnapshotSource, SnapshotStream};
