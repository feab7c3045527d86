//! Base url resolution and token exchange.

pub mod jwt;
pub mod token;

pub use jwt::{resolve_base_url, JwtClaims};
pub use token::{authenticate, AccessToken};
