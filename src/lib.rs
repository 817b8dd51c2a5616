//! Natural-language question answering over the Titanic dataset.
//!
//! The core contract is [`agent::Agent::answer`]: build a system prompt around
//! a unique plot path, ask the model cascade for Python analysis code, run it
//! in an isolated interpreter process, retry once on a silent failure, and
//! assemble `{text, optional image}` from the captured output.

pub mod agent;
pub mod config;
pub mod dataset;
pub mod executor;
pub mod gateway;
pub mod llm;
pub mod prompt;
pub mod sanitize;

pub use agent::{Agent, QueryResult};
pub use dataset::Dataset;
