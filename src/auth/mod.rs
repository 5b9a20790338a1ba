/// Authentication module
///
/// Bearer token issuing/verification and password hashing.

mod claims;
mod jwt;
mod password;

pub use claims::Claims;
pub use jwt::TokenCodec;
pub use password::matches;
pub use password::matches_blocking;
pub use password::validate_secret;
pub use password::CredentialHasher;
