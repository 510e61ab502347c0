pub mod dashboard;
pub mod error;
pub mod history;
pub mod placeholder;
pub mod prompt;
pub mod proxy;
pub mod render;

pub use error::ClientError;
