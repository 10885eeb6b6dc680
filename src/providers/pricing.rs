/*!
 * Per-model token pricing.
 *
 * Prices are USD per 1,000 tokens. Model identifiers are matched by the
 * longest known prefix so dated snapshots (`gpt-4o-mini-2024-07-18`) share
 * the price of their family.
 */

use log::debug;

/// Price of one model family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    /// USD per 1K prompt tokens
    pub prompt_per_1k: f64,
    /// USD per 1K completion tokens
    pub completion_per_1k: f64,
}

const PRICES: &[(&str, ModelPrice)] = &[
    ("gpt-4o-mini", ModelPrice { prompt_per_1k: 0.000_15, completion_per_1k: 0.000_6 }),
    ("gpt-4o", ModelPrice { prompt_per_1k: 0.002_5, completion_per_1k: 0.01 }),
    ("gpt-4-turbo", ModelPrice { prompt_per_1k: 0.01, completion_per_1k: 0.03 }),
    ("gpt-4-0125-preview", ModelPrice { prompt_per_1k: 0.01, completion_per_1k: 0.03 }),
    ("gpt-4-1106-preview", ModelPrice { prompt_per_1k: 0.01, completion_per_1k: 0.03 }),
    ("gpt-4-32k", ModelPrice { prompt_per_1k: 0.06, completion_per_1k: 0.12 }),
    ("gpt-4", ModelPrice { prompt_per_1k: 0.03, completion_per_1k: 0.06 }),
    ("gpt-3.5-turbo-16k", ModelPrice { prompt_per_1k: 0.003, completion_per_1k: 0.004 }),
    ("gpt-3.5-turbo", ModelPrice { prompt_per_1k: 0.000_5, completion_per_1k: 0.001_5 }),
    ("claude-3-5-haiku", ModelPrice { prompt_per_1k: 0.000_8, completion_per_1k: 0.004 }),
    ("claude-3-5-sonnet", ModelPrice { prompt_per_1k: 0.003, completion_per_1k: 0.015 }),
    ("claude-3-haiku", ModelPrice { prompt_per_1k: 0.000_25, completion_per_1k: 0.001_25 }),
    ("claude-3-sonnet", ModelPrice { prompt_per_1k: 0.003, completion_per_1k: 0.015 }),
    ("claude-3-opus", ModelPrice { prompt_per_1k: 0.015, completion_per_1k: 0.075 }),
];

/// Look up the price of a model, if known
pub fn price_for(model: &str) -> Option<ModelPrice> {
    PRICES
        .iter()
        .filter(|(prefix, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, price)| *price)
}

/// Cost in USD of one exchange. Unknown models cost nothing.
pub fn cost_for(model: &str, prompt_tokens: u64, completion_tokens: u64) -> f64 {
    match price_for(model) {
        Some(price) => {
            (prompt_tokens as f64 * price.prompt_per_1k + completion_tokens as f64 * price.completion_per_1k)
                / 1000.0
        }
        None => {
            debug!("No pricing known for model '{}', reporting zero cost", model);
            0.0
        }
    }
}
