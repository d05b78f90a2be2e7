//! Data models

mod api_key;
mod chat;
mod organization;
mod project;
mod status;
mod transaction;
mod user;

pub use api_key::*;
pub use chat::*;
pub use organization::*;
pub use project::*;
pub use status::*;
pub use transaction::*;
pub use user::*;
