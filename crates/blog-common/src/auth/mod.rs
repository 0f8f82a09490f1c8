//! Identity token handling

mod jwt;

pub use jwt::{Claims, JwtService};
