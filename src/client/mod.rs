pub mod auth;
pub mod connector;
pub mod reports;

pub use auth::*;
pub use connector::*;
pub use reports::*;
