//! Ledger configuration.

use ledger_core::FundsPolicy;

/// Ledger behaviour settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Floor check applied to the source account of a transfer.
    pub funds_policy: FundsPolicy,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// `LEDGER_FUNDS_POLICY` selects `amount_with_fee` (default) or
    /// `amount_only`. An unrecognised value falls back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let funds_policy = std::env::var("LEDGER_FUNDS_POLICY")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring LEDGER_FUNDS_POLICY");
                    None
                }
            })
            .unwrap_or_default();

        Self { funds_policy }
    }

    /// Use `policy` for transfer floor checks.
    #[must_use]
    pub const fn with_funds_policy(mut self, policy: FundsPolicy) -> Self {
        self.funds_policy = policy;
        self
    }
}
