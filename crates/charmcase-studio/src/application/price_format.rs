//! Display formatting for prices.
//!
//! One parameterized formatter replaces per-locale screen variants: the
//! currency symbol, its placement, and the decimal separator all come from the
//! `[display]` config section.

use charmcase_core::Price;

/// How prices are rendered for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFormat {
    /// Currency symbol, e.g. `"$"` or `"€"`.
    pub currency_symbol: String,
    /// `true` renders `30,97 €`; `false` renders `$30.97`.
    pub symbol_after: bool,
    /// Separator between whole units and cents.
    pub decimal_separator: String,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            symbol_after: false,
            decimal_separator: ".".to_string(),
        }
    }
}

impl PriceFormat {
    /// Formats `price` with exactly two fractional digits.
    pub fn format(&self, price: Price) -> String {
        let amount = format!(
            "{}{}{:02}",
            price.whole_units(),
            self.decimal_separator,
            price.fraction_cents()
        );
        if self.symbol_after {
            format!("{amount} {}", self.currency_symbol)
        } else {
            format!("{}{amount}", self.currency_symbol)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
