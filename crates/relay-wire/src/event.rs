/// A provider-native event, the transient output of one wire parser.
///
/// Produced by the `ndjson` and `sse` parsers, consumed only by the
/// normalizer; never exposed past this crate's boundary. Created and
/// discarded within one decode cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderEvent {
    /// A fragment of message content, if the frame carried one.
    pub content: Option<String>,
    /// True when the provider signaled turn completion.
    pub is_final: bool,
    /// The model name the provider reported, if any.
    pub model: Option<String>,
}

impl ProviderEvent {
    pub fn content(fragment: impl Into<String>) -> Self {
        Self {
            content: Some(fragment.into()),
            ..Self::default()
        }
    }

    pub fn final_marker() -> Self {
        Self {
            is_final: true,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && !self.is_final
    }
}
