pub mod agent;
pub mod checkpoint;
pub mod document;
pub mod embeddings;
pub mod errors;
pub mod models;
pub mod providers;
pub mod splitter;
pub mod toolkit;
pub mod toolkits;
pub mod vector_store;
