pub mod book;
pub mod csrf;
