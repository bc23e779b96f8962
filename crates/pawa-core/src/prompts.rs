//! Prompt templates

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::CatalogError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

/// One rendered prompt message (text only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub text: String,
}

pub trait PromptHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn arguments(&self) -> Vec<PromptArgument>;
    fn render(&self, arguments: &Value) -> Result<Vec<PromptMessage>, CatalogError>;
}

#[derive(Default)]
pub struct PromptRegistry {
    prompts: HashMap<String, Arc<dyn PromptHandler>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, prompt: Arc<dyn PromptHandler>) {
        self.prompts.insert(prompt.name().to_string(), prompt);
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        let mut defs: Vec<PromptDefinition> = self
            .prompts
            .values()
            .map(|p| PromptDefinition {
                name: p.name().to_string(),
                description: p.description().to_string(),
                arguments: p.arguments(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn render(&self, name: &str, arguments: &Value) -> Result<Vec<PromptMessage>, CatalogError> {
        let prompt = self
            .prompts
            .get(name)
            .ok_or_else(|| CatalogError::UnknownPrompt(name.to_string()))?;
        prompt.render(arguments)
    }
}

/// `echo`: wraps the message in a processing request
pub struct EchoPrompt;

impl PromptHandler for EchoPrompt {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Ask the model to process a message."
    }

    fn arguments(&self) -> Vec<PromptArgument> {
        vec![PromptArgument {
            name: "message".to_string(),
            description: "Message to process".to_string(),
            required: true,
        }]
    }

    fn render(&self, arguments: &Value) -> Result<Vec<PromptMessage>, CatalogError> {
        let message = crate::tools::required_str(arguments, "message")?;
        Ok(vec![PromptMessage {
            role: "user".to_string(),
            text: format!("Please process this message: {}", message),
        }])
    }
}
