pub mod admin;
pub mod audit;
pub mod auth;
pub mod authors;
pub mod books;
pub mod categories;
pub mod deletion;
pub mod inventory;
pub mod users;
