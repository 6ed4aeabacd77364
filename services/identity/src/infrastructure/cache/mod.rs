//! 短时键值存储之上的领域封装

mod token_blacklist;
mod verification_store;

pub use token_blacklist::TokenBlacklist;
pub use verification_store::VerificationStore;
