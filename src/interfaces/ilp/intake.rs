use crate::domain::account::{Amount, Balance, PayerId};
use crate::domain::ports::DynBalanceSink;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// Adapter between the external payment receiver and the credit ledger.
///
/// The receiver reports each accepted chunk as a destination route plus an
/// amount. The payer id rides in the route, three segments from the end
/// (`<prefix>.<id>.<token>.<secret>`), where `tag_destination` put it when
/// the receive endpoint handed the account out.
pub struct PaymentIntake {
    sink: DynBalanceSink,
}

impl PaymentIntake {
    pub fn new(sink: DynBalanceSink) -> Self {
        Self { sink }
    }

    /// Credits the payer named by `destination` with `amount`.
    ///
    /// Returns the new balance; callers must acknowledge the chunk only
    /// after this returns `Ok`. A chunk that fails here is rejected alone:
    /// no balance is touched and other chunks are unaffected.
    pub async fn accept_chunk(&self, destination: &str, amount: &str) -> Result<Balance> {
        let id = extract_payer_id(destination)
            .inspect_err(|_| warn!(destination, "rejecting chunk with unusable destination"))?;
        let amount = parse_amount(amount)
            .inspect_err(|_| warn!(payer = %id, amount, "rejecting chunk with unusable amount"))?;
        let balance = self.sink.credit(id.clone(), amount).await?;
        debug!(payer = %id, balance = %balance.value(), "accepted payment chunk");
        Ok(balance)
    }
}

/// Pulls the payer id out of a chunk's destination route.
pub fn extract_payer_id(destination: &str) -> Result<PayerId> {
    let segments: Vec<&str> = destination.split('.').collect();
    if segments.len() < 3 {
        return Err(LedgerError::PayerExtractionFailed(destination.to_string()));
    }
    let id = segments[segments.len() - 3];
    if id.is_empty() {
        return Err(LedgerError::PayerExtractionFailed(destination.to_string()));
    }
    Ok(PayerId::from(id))
}

/// Interpolates a payer id into a receiver-issued destination account,
/// ahead of the final two segments, so chunks sent there can be attributed
/// back to the payer.
pub fn tag_destination(account: &str, id: &PayerId) -> Result<String> {
    let segments: Vec<&str> = account.split('.').collect();
    if segments.len() < 3 {
        return Err(LedgerError::PayerExtractionFailed(account.to_string()));
    }
    let split = segments.len() - 2;
    Ok(format!(
        "{}.{}.{}",
        segments[..split].join("."),
        id,
        segments[split..].join(".")
    ))
}

// Protocol amounts arrive as decimal strings; anything that does not parse
// as a positive value fails the chunk.
fn parse_amount(raw: &str) -> Result<Amount> {
    let value = Decimal::from_str(raw.trim()).map_err(|_| LedgerError::InvalidAmount)?;
    Amount::new(value)
}
