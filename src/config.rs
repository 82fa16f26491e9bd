use crate::domain::account::Balance;

/// Runtime settings for a monetizer instance.
///
/// The only tunable the ledger itself cares about is the balance ceiling;
/// everything else about a deployment (cookie names, endpoint paths) belongs
/// to the embedding web server.
#[derive(Debug, Clone, Default)]
pub struct MonetizerConfig {
    /// Ceiling applied to every credit. `None` leaves balances unbounded.
    pub max_balance: Option<Balance>,
}

impl MonetizerConfig {
    /// Settings with no balance ceiling.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Settings that clamp every payer's balance to `max`.
    pub fn with_max_balance(max: Balance) -> Self {
        Self {
            max_balance: Some(max),
        }
    }
}
