pub mod book_repository;
pub mod rating_service;

pub use book_repository::{BookRepository, RepositoryError};
pub use rating_service::{RatingAck, RatingService, RatingServiceError, RatingSubmission};
