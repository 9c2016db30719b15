pub mod rating_service;

#[allow(unused_imports)]
pub use rating_service::RatingService;
