mod auth;
mod health_check;

pub use auth::{
    classify_restore, code_valid, json_error_handler, login, restore, signup, token_valid,
    whoami,
};
pub use health_check::health_check;
