//! Authentication route handlers
//!
//! - Email/password login and admin login
//! - Token refresh
//! - Logout

pub mod login;
pub mod logout;
pub mod refresh;

pub use login::{admin_login, login};
pub use logout::logout;
pub use refresh::refresh;
