//! Input-token price table, in USD per 1,000 tokens.

const PRICE_PER_1K_TOKENS: &[(&str, &str, f64)] = &[
    ("anthropic", "claude-3-opus", 0.015),
    ("anthropic", "claude-3-5-sonnet", 0.003),
    ("anthropic", "claude-3.5-haiku", 0.00025),
    ("cohere", "command-r+", 0.003),
    ("cohere", "command-r", 0.0005),
    ("cohere", "command-light", 0.0003),
    ("llama", "llama-3.2-90b", 0.002),
    ("llama", "llama-3.2-11b", 0.00035),
    ("llama", "llama-3.2-3b", 0.00015),
    ("llama", "llama-3.2-1b", 0.0001),
    ("llama", "llama-3.1-70b", 0.00099),
    ("llama", "llama-3.1-8b", 0.00022),
    ("llama", "llama-3-70b", 0.00265),
    ("llama", "llama-3-8b", 0.0003),
    ("mistral", "mistral-large-2", 0.0004),
];

pub fn price_per_1k_tokens(provider: &str, model: &str) -> Option<f64> {
    PRICE_PER_1K_TOKENS
        .iter()
        .find(|(p, m, _)| *p == provider && *m == model)
        .map(|(_, _, price)| *price)
}

/// Price of `token_count` input tokens, rounded to 6 decimals. Unknown
/// provider/model pairs cost nothing.
pub fn estimate_price(provider: &str, model: &str, token_count: u64) -> f64 {
    match price_per_1k_tokens(provider, model) {
        Some(per_1k) => round6(token_count as f64 / 1000.0 * per_1k),
        None => 0.0,
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
