// LLM abstraction layer

pub mod anthropic;
pub mod provider;

pub use provider::*;
