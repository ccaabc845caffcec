/// A provider tab: its key on the wire, display name, and model choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderInfo {
    pub key: &'static str,
    pub name: &'static str,
    /// First entry is the default selection.
    pub models: &'static [&'static str],
    /// Shown under the tab when the provider has caveats.
    pub note: Option<&'static str>,
}

impl ProviderInfo {
    pub fn default_model(&self) -> &'static str {
        self.models[0]
    }

    pub fn offers(&self, model: &str) -> bool {
        self.models.contains(&model)
    }
}

pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        key: "anthropic",
        name: "Anthropic",
        models: &[
            "claude-3-5-sonnet",
            "claude-3-opus",
            "claude-3.5-haiku",
            "claude-3-haiku",
        ],
        note: Some(
            "Anthropic does not expose token details (token list, ids, character mapping); \
             only the count is available. Counting is limited to 100 calls per minute.",
        ),
    },
    ProviderInfo {
        key: "cohere",
        name: "Cohere",
        models: &["command-r+", "command-r", "command-light"],
        note: None,
    },
    ProviderInfo {
        key: "llama",
        name: "Meta Llama",
        models: &[
            "llama-3.2-90b",
            "llama-3.2-11b",
            "llama-3.2-3b",
            "llama-3.2-1b",
            "llama-3.1-70b",
            "llama-3.1-8b",
            "llama-3-70b",
            "llama-3-8b",
        ],
        note: None,
    },
    ProviderInfo {
        key: "mistral",
        name: "Mistral",
        models: &["mistral-large-2"],
        note: None,
    },
];

pub const DEFAULT_PROVIDER: &str = "anthropic";

pub fn provider(key: &str) -> Option<&'static ProviderInfo> {
    PROVIDERS.iter().find(|p| p.key == key)
}

pub const EXAMPLE_TEXT: &str = "Tokenization splits text into the small units a language model \
actually reads. The same sentence can cost a different number of tokens depending on the model, \
so it pays to measure before you send a long prompt. Whitespace, punctuation and non-English \
scripts are where tokenizers disagree the most.";
