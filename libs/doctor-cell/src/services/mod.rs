pub mod directory;
pub mod favorites;

pub use directory::DoctorService;
pub use favorites::FavoritesService;
