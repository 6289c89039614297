pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{decode_doctors, Doctor};
pub use services::{DoctorService, FavoritesService};
