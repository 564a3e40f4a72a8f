pub mod autocomplete;
pub mod details;
pub mod dispatch;
pub mod health;
pub mod search;

pub use dispatch::{dispatch, preflight};
