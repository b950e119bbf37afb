pub mod auth;
pub mod counter;
pub mod credentials;
pub mod schema;
