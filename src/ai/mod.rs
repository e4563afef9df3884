//! Model client abstraction, prompts and response parsing

pub mod ollama;
pub mod prompt;
pub mod response;

pub use ollama::OllamaClient;
pub use prompt::{FailedTest, PromptBuilder};
pub use response::{parse_tests, GeneratedTest, TestSuggestions};

use anyhow::Result;
use async_trait::async_trait;

/// System and user parts of a prompt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Single text prompt for completion endpoints
    pub fn combined(&self) -> String {
        if self.system.trim().is_empty() {
            self.user.clone()
        } else {
            format!("{}\n\n{}", self.system, self.user)
        }
    }
}

/// Model answer and token usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// A language model that completes prompts
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier
    fn model(&self) -> &str;

    /// Complete a prompt
    async fn complete(&self, prompt: &Prompt) -> Result<Completion>;
}

/// Rough token count used when the server does not report one
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.chars().count() / 4) as u64).max(1)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Client that replays canned answers and records the prompts it saw
    #[derive(Default)]
    pub struct ScriptedClient {
        answers: Mutex<VecDeque<String>>,
        pub prompts: Mutex<Vec<Prompt>>,
    }

    impl ScriptedClient {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &Prompt) -> Result<Completion> {
            self.prompts.lock().unwrap().push(prompt.clone());
            let text = self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted answer left"))?;
            Ok(Completion {
                prompt_tokens: estimate_tokens(&prompt.combined()),
                completion_tokens: estimate_tokens(&text),
                text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn test_combined_prompt() {
        let prompt = Prompt {
            system: "sys".to_string(),
            user: "user".to_string(),
        };
        assert_eq!(prompt.combined(), "sys\n\nuser");

        let prompt = Prompt {
            system: "  ".to_string(),
            user: "user".to_string(),
        };
        assert_eq!(prompt.combined(), "user");
    }
}
