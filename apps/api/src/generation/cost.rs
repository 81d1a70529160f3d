//! Token cost estimation.

use serde::Serialize;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Per-million-token USD rates for the completion model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Pricing {
    /// gpt-4o-mini rates. Changing them is a code change, not a runtime setting.
    pub const GPT_4O_MINI: Pricing = Pricing {
        input_per_million: 0.06,
        output_per_million: 2.40,
    };

    /// USD cost of one call. No rounding is applied.
    pub fn estimate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 / TOKENS_PER_MILLION) * self.input_per_million
            + (output_tokens as f64 / TOKENS_PER_MILLION) * self.output_per_million
    }
}

impl Default for Pricing {
    fn default() -> Self {
        Self::GPT_4O_MINI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let pricing = Pricing::default();
        assert_eq!(pricing.input_per_million, 0.06);
        assert_eq!(pricing.output_per_million, 2.40);
    }

    #[test]
    fn test_estimate_cost_matches_formula_exactly() {
        let pricing = Pricing::GPT_4O_MINI;
        for (input, output) in [(0u32, 0u32), (1, 1), (50, 20), (1234, 77), (1_000_000, 3)] {
            let expected =
                input as f64 / 1e6 * 0.06 + output as f64 / 1e6 * 2.40;
            assert_eq!(pricing.estimate_cost(input, output), expected);
        }
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        assert_eq!(Pricing::GPT_4O_MINI.estimate_cost(0, 0), 0.0);
    }

    #[test]
    fn test_one_million_each() {
        let cost = Pricing::GPT_4O_MINI.estimate_cost(1_000_000, 1_000_000);
        assert!((cost - 2.46).abs() < 1e-12);
    }

    #[test]
    fn test_alternate_rates() {
        let pricing = Pricing {
            input_per_million: 3.0,
            output_per_million: 15.0,
        };
        let cost = pricing.estimate_cost(2_000_000, 100_000);
        assert!((cost - 7.5).abs() < 1e-12);
    }
}
