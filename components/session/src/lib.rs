//! Client-side authenticated-session lifecycle: token acquisition, redundant
//! persistence, periodic revalidation with bounded retry, and always-clear
//! logout.

#[macro_use]
extern crate serde;
extern crate tracing as log;

mod error;
pub mod manager;
pub mod state;
pub mod store;
pub mod tasks;

pub use error::SessionError;
pub use manager::SessionManager;
pub use state::{Session, Stage};
pub use store::TokenStore;
