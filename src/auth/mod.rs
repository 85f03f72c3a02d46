//! Authentication and authorization

pub mod jwt;
pub mod password;
pub mod policy;
pub mod principal;

pub use jwt::{JwtAuth, Tokens};
pub use policy::{PolicyTable, RouteId};
pub use principal::Principal;
