use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identity of the active upstream provider. Selected once per turn from
/// configuration; never sniffed from stream content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server: NDJSON framing, one JSON object per line.
    Ollama,
    /// OpenRouter (OpenAI-compatible): SSE framing, `data:` lines.
    OpenRouter,
}

/// The wire framing a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Ndjson,
    EventStream,
}

impl From<ProviderKind> for WireFormat {
    fn from(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Ollama => WireFormat::Ndjson,
            ProviderKind::OpenRouter => WireFormat::EventStream,
        }
    }
}

/// Read-only view of the configuration this core consumes: the active
/// provider, the resolved model, and any per-model system-prompt
/// overrides. Loading this from disk or environment is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// Model name -> custom system prompt.
    #[serde(default)]
    pub system_prompts: HashMap<String, String>,
}

impl RelayConfig {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompts: HashMap::new(),
        }
    }

    pub fn with_system_prompt(
        mut self,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        self.system_prompts.insert(model.into(), prompt.into());
        self
    }

    pub fn wire_format(&self) -> WireFormat {
        self.provider.into()
    }

    /// Custom system prompt for a model, if one is configured.
    pub fn system_prompt_override(&self, model: &str) -> Option<&str> {
        self.system_prompts.get(model).map(|s| s.as_str())
    }
}
