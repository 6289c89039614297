pub mod display;
pub mod enricher;
pub mod feed;
pub mod schedule;

pub use enricher::{enrich, group_by_status};
pub use feed::{AppointmentFeed, CallWindowTicker};
pub use schedule::CallWindow;
