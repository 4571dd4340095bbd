use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Monetary amounts. Plain binary floating point: the solver and the
/// schedule reproduce IEEE-754 accumulation exactly.
pub type Money = f64;

/// Periodic rates expressed as decimals (0.05 = 5% per period).
pub type Rate = f64;

/// Rates quoted as percentages (5.0 = 5%).
pub type Percent = f64;

/// Year counts
pub type Years = f64;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "f64_binary64".to_string(),
        },
    }
}

/// Round a float to two decimal places for presentation.
///
/// The exact binary value is carried into the `Decimal` before rounding, so
/// `1.005` (stored as 1.00499999...) rounds down the same way a
/// `round(x * 100) / 100` on the float would. Non-finite input maps to zero.
pub fn round_2dp(value: f64) -> Decimal {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}
