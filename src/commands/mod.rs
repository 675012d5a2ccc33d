pub mod crawl;
pub mod serve;

// Re-export command functions for convenience
pub use crawl::{crawl, schedule};
pub use serve::serve;
