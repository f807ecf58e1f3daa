//! Prompt Builder System
//!
//! Standardized prompt construction for the editing operations.
//! Every prompt is a pure function of its inputs: sections render in
//! insertion order and nothing time- or environment-dependent is embedded.

mod templates;

pub use templates::{polish_prompt, rewrite_prompt, suggestion_prompt};

use crate::ai::provider::ChatMessage;

/// Prompt section types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Labelled requirements, rendered in insertion order
    Requirements(Vec<(String, String)>),
    /// Numbered principles under a header
    Principles { header: String, items: Vec<String> },
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add a labelled requirement, merging into the previous requirements block
    pub fn requirement(mut self, label: &str, value: &str) -> Self {
        let item = (label.to_string(), value.to_string());
        match self.sections.last_mut() {
            Some(PromptSection::Requirements(items)) => items.push(item),
            _ => self.sections.push(PromptSection::Requirements(vec![item])),
        }
        self
    }

    /// Add a requirement only when `value` is present
    pub fn requirement_opt(self, label: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.requirement(label, value),
            None => self,
        }
    }

    /// Add numbered principles
    pub fn principles(mut self, header: &str, items: &[&str]) -> Self {
        self.sections.push(PromptSection::Principles {
            header: header.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!("You are {}. {}\n\n", expertise, task));
                }
                PromptSection::Requirements(items) => {
                    for (label, value) in items {
                        prompt.push_str(&format!("{}: {}\n", label, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Principles { header, items } => {
                    prompt.push_str(&format!("{}:\n", header));
                    for (i, item) in items.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}: ", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Rendered system and user prompt for one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// System message followed by the user message
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}
