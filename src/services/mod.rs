//! Business logic services layer

pub mod auth_service;
pub mod exhibition_service;

pub use auth_service::{AuthOutcome, AuthService};
pub use exhibition_service::ExhibitionService;
