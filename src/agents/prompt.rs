//! Prompt Template
//!
//! The prompt sent upstream is built once per request from a template with two
//! placeholders, `{question}` and `{file_content}`. The built-in template asks
//! for a bare answer suitable for pasting into a graded assignment form; it can
//! be replaced by pointing `PROMPT_TEMPLATE_PATH` at another file.

use std::path::Path;

use anyhow::{Context, Result};

pub const QUESTION_PLACEHOLDER: &str = "{question}";
pub const FILE_CONTENT_PLACEHOLDER: &str = "{file_content}";

pub const DEFAULT_TEMPLATE: &str = r#"You are an AI assistant helping a student with their IIT Madras Online Degree in Data Science assignment questions.
The student needs the exact answer to enter in their graded assignment.

Question: {question}

File Content:
{file_content}

Instructions:
1. Provide ONLY the exact answer to the question, without any explanations or extra text.
2. The answer should be ready to be directly entered into the assignment form.
3. If the question asks for values from a CSV file or data, extract those specific values.
4. If the answer is a number, provide just the number.
5. If the answer is text, provide just the text.
6. Do not include any explanations, citations, or your thought process.

Your answer should be extremely concise and exactly match what is required for the assignment.
"#;

/// A fully rendered prompt. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(QUESTION_PLACEHOLDER) {
            anyhow::bail!("prompt template must contain {}", QUESTION_PLACEHOLDER);
        }
        Ok(Self { template })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
        Self::new(template)
    }

    /// Substitute both placeholders in a single pass, so text inside the
    /// question or the file is never itself treated as a placeholder.
    pub fn render(&self, question: &str, file_content: &str) -> Prompt {
        let mut out = String::with_capacity(self.template.len() + question.len() + file_content.len());
        let mut rest = self.template.as_str();

        loop {
            let next_question = rest.find(QUESTION_PLACEHOLDER);
            let next_content = rest.find(FILE_CONTENT_PLACEHOLDER);
            let (at, placeholder, value) = match (next_question, next_content) {
                (Some(q), Some(c)) if c < q => (c, FILE_CONTENT_PLACEHOLDER, file_content),
                (Some(q), _) => (q, QUESTION_PLACEHOLDER, question),
                (None, Some(c)) => (c, FILE_CONTENT_PLACEHOLDER, file_content),
                (None, None) => break,
            };
            out.push_str(&rest[..at]);
            out.push_str(value);
            rest = &rest[at + placeholder.len()..];
        }
        out.push_str(rest);

        Prompt(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_layout() {
        let prompt = PromptTemplate::default().render("What is the mean?", "CSV content:\n...");
        let text = prompt.as_str();
        assert!(text.contains("\nQuestion: What is the mean?\n\nFile Content:\nCSV content:\n...\n\nInstructions:\n"));
        assert!(text.ends_with("required for the assignment.\n"));
    }

    #[test]
    fn test_empty_file_content_section() {
        let prompt = PromptTemplate::default().render("Q?", "");
        assert!(prompt.as_str().contains("File Content:\n\n\nInstructions:"));
    }

    #[test]
    fn test_placeholders_in_values_are_not_expanded() {
        let template = PromptTemplate::new("Q={question} F={file_content}").unwrap();
        let prompt = template.render("{file_content}", "{question}");
        assert_eq!(prompt.as_str(), "Q={file_content} F={question}");
    }

    #[test]
    fn test_template_requires_question() {
        assert!(PromptTemplate::new("no placeholders here").is_err());
    }

    #[test]
    fn test_template_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Answer briefly: {question}\n---\n{file_content}").unwrap();

        let template = PromptTemplate::from_file(&path).unwrap();
        assert_eq!(template.render("2+2", "none").as_str(), "Answer briefly: 2+2\n---\nnone");
    }
}
