pub mod extractor;
pub mod handlers;
pub mod models;
pub mod ordering;
pub mod prompts;
pub mod schema;
