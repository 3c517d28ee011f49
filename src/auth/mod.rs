//! Auth primitives: password hashing and signed bearer tokens. Neither
//! module touches the database directly — callers look the user up via
//! [`crate::db::DataAccessor`] and feed the result in.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{generate_token, user_from_token, Claims, TokenKeys};
