pub mod rating_client;

pub use rating_client::HttpRatingClient;
