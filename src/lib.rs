pub mod api_types;
pub mod classify;
pub mod config;
pub mod explain;
pub mod feed;
pub mod history;
pub mod models;
pub mod normalize;
pub mod oracle;
pub mod orchestrator;
pub mod processor;
pub mod project;
pub mod prompts;
pub mod trend;
