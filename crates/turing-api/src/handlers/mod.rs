//! API request handlers.

pub mod catalog;
pub mod conversations;
pub mod health;
pub mod history;

pub use catalog::*;
pub use conversations::*;
pub use health::*;
pub use history::*;
