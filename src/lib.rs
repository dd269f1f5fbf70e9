pub mod api;
pub mod cli;
pub mod config;
pub mod data_paths;
pub mod logging;
pub mod view;
pub mod walkthrough;

// Re-export the client and the walkthrough entry points at the root level
pub use api::QuovoClient;
pub use walkthrough::Walkthrough;
