pub mod auth;
pub mod error;
mod health;
pub mod page;
pub mod router;
pub mod state;
