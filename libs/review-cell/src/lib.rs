pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Review, ReviewDraft, ReviewError, ReviewSummary};
pub use services::review::ReviewService;
