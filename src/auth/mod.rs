pub mod identity;
pub mod password;
pub mod session;

pub use identity::{AuthUser, OptionalUser};
