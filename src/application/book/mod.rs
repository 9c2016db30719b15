mod book_service;
mod errors;

pub use book_service::{
    BookDetails, DEFAULT_RATING_TIMEOUT, ServiceDependencies, add_book, book_details,
    delete_book, edit_book, get_book, list_books, new_book_draft, rate_book,
};
pub use errors::{BookApplicationError, Result};
