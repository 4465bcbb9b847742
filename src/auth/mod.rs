pub mod jwt;
pub mod token;

pub use token::{AccessToken, TokenProvider};
