pub mod admin;
pub mod event;
pub mod member;

pub use admin::*;
pub use event::*;
pub use member::*;
