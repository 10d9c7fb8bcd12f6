//! Clinical services built per request over the shared store

pub mod catalog;
pub mod interaction;
pub mod patient;
pub mod similarity;

pub use catalog::CatalogService;
pub use interaction::InteractionService;
pub use patient::PatientService;
pub use similarity::SimilarityService;
