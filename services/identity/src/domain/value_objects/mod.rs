//! 值对象

mod email;
mod password;

pub use email::{Email, InvalidEmail};
pub use password::HashedPassword;
