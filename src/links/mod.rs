//! Link classification and link-in-bio resolution.

pub mod classifier;
pub mod resolver;

pub use classifier::LinkClassifier;
pub use resolver::LinkResolver;
