pub mod api;
pub mod email;
pub mod health;
pub mod processor;
