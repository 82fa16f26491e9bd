use super::account::{Amount, Balance, PayerId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Sink for confirmed payment credits.
///
/// The intake adapter reaches the ledger through this port, so chunk
/// handling can be exercised against a test double and the sink behind it
/// can later be remote or persistent.
#[async_trait]
pub trait BalanceSink: Send + Sync {
    async fn credit(&self, id: PayerId, amount: Amount) -> Result<Balance>;
}

pub type DynBalanceSink = Arc<dyn BalanceSink>;
