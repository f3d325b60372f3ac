//! Agent System
//!
//! - **Prompt**: renders the question and extracted file text into one prompt
//! - **Answer Agent**: sends that prompt upstream and returns the answer text
//!
//! ```text
//! question + extracted text
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Prompt    │  → fixed template, built once
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Answer    │  → single LLM call
//! │   Agent     │
//! └─────────────┘
//!      │
//!      ▼
//!   {"answer"}
//! ```

pub mod answer;
pub mod prompt;

pub use answer::AnswerAgent;
pub use prompt::{Prompt, PromptTemplate};
