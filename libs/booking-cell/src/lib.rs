pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use handlers::BookingState;
pub use models::{BookingError, BookingSnapshot, ConsultationPackage, CreditCard};
pub use router::booking_routes;
pub use services::cardform::{mask_card_number, reformat_card_number, reformat_expiry, CardForm};
pub use services::pricing::{package_catalog, price_for_duration};
pub use services::session::BookingSession;
