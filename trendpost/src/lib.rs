// Library interface for trendpost modules
// This allows tests and other binaries to import modules

pub mod digest;
pub mod ingestion;
pub mod llm;
pub mod notify;
pub mod pipeline;
pub mod prompt;
