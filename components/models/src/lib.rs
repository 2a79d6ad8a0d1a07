#[macro_use]
extern crate serde;

pub mod envelope;
pub mod user;

pub use envelope::{extract_message, extract_token, extract_user};
pub use user::User;
