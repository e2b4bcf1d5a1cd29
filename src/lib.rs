pub mod cli;
pub mod error;
pub mod loader;
pub mod msg;
pub mod track;

pub use loader::{load_paths, save_paths};

pub type Result<T> = std::result::Result<T, error::Error>;
