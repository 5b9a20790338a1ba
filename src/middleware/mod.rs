/// Middleware module
///
/// Bearer authentication for protected routes.

mod bearer;

pub use bearer::bearer_token;
pub use bearer::BearerAuth;
