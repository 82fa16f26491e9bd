use crate::config::MonetizerConfig;
use crate::domain::account::{Amount, Balance, CreditBucket, PayerBalance, PayerId};
use crate::domain::ports::BalanceSink;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;

/// A pending threshold notification for one payer.
///
/// Lives in the ledger only between registration and resolution; the token
/// lets a cancelled caller remove exactly its own entry.
struct Waiter {
    token: u64,
    threshold: Balance,
    notify: oneshot::Sender<()>,
}

#[derive(Default)]
struct LedgerState {
    buckets: HashMap<PayerId, CreditBucket>,
    waiters: HashMap<PayerId, Vec<Waiter>>,
}

struct Inner {
    state: Mutex<LedgerState>,
    max_balance: Option<Balance>,
    next_token: AtomicU64,
}

/// Concurrent credit ledger with blocking threshold notification.
///
/// The ledger owns every payer's balance bucket and a per-payer list of
/// pending waiters. Credits, spends and reads are serialized per ledger
/// through one short-lived lock that is never held across a suspension
/// point; only `await_balance` suspends the calling task. Cloning the
/// ledger produces another handle to the same shared state.
#[derive(Clone)]
pub struct CreditLedger {
    inner: Arc<Inner>,
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new(MonetizerConfig::default())
    }
}

impl CreditLedger {
    pub fn new(config: MonetizerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(LedgerState::default()),
                max_balance: config.max_balance,
                next_token: AtomicU64::new(0),
            }),
        }
    }

    // State transitions never panic mid-update, so a poisoned guard is
    // still consistent.
    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds `amount` to the payer's balance, clamped to the configured
    /// ceiling, and resolves every waiter whose threshold is now met
    /// before returning the new balance.
    ///
    /// An unseen payer gets a bucket on first credit.
    pub fn credit(&self, id: &PayerId, amount: Amount) -> Balance {
        let mut state = self.lock_state();
        let bucket = state
            .buckets
            .entry(id.clone())
            .or_insert_with(|| CreditBucket::new(id.clone()));
        let balance = bucket.credit(amount, self.inner.max_balance);
        Self::wake_satisfied(&mut state, id, balance);
        debug!(payer = %id, amount = %amount.value(), balance = %balance.value(), "got money for bucket");
        balance
    }

    /// Debits `price` from the payer's balance.
    ///
    /// Fails with `NoSuchPayer` when no bucket exists for the id and with
    /// `InsufficientBalance` when the bucket holds less than `price`; the
    /// check and the decrement happen under one lock acquisition.
    pub fn spend(&self, id: &PayerId, price: Amount) -> Result<Balance> {
        let mut state = self.lock_state();
        let bucket = state
            .buckets
            .get_mut(id)
            .ok_or_else(|| LedgerError::NoSuchPayer(id.to_string()))?;
        let balance = bucket.spend(price)?;
        debug!(payer = %id, price = %price.value(), balance = %balance.value(), "spent credit");
        Ok(balance)
    }

    /// Suspends until the payer's balance reaches `threshold`.
    ///
    /// Resolves immediately when the threshold is already met. An unseen
    /// payer counts as zero balance, so a wait can be registered before the
    /// first chunk arrives (no bucket is created by waiting). Dropping the
    /// returned future cancels the wait and removes the registration.
    pub async fn await_balance(&self, id: &PayerId, threshold: Balance) {
        let (token, receiver) = {
            let mut state = self.lock_state();
            let current = state
                .buckets
                .get(id)
                .map(|b| b.balance)
                .unwrap_or(Balance::ZERO);
            if current >= threshold {
                return;
            }
            let (notify, receiver) = oneshot::channel();
            let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
            state.waiters.entry(id.clone()).or_default().push(Waiter {
                token,
                threshold,
                notify,
            });
            (token, receiver)
        };
        debug!(payer = %id, threshold = %threshold.value(), "awaiting balance");

        let mut guard = WaiterGuard {
            inner: Arc::clone(&self.inner),
            id: id.clone(),
            token,
            armed: true,
        };
        // The sender stays inside the ledger until this waiter resolves, so
        // the only outcome here is a successful notification.
        let _ = receiver.await;
        guard.disarm();
    }

    /// Non-blocking read; zero for unseen ids.
    pub fn current_balance(&self, id: &PayerId) -> Balance {
        self.lock_state()
            .buckets
            .get(id)
            .map(|b| b.balance)
            .unwrap_or(Balance::ZERO)
    }

    /// Collects every ledger entry, for diagnostics or persistence at
    /// shutdown.
    pub fn snapshot(&self) -> Vec<PayerBalance> {
        self.lock_state()
            .buckets
            .values()
            .map(CreditBucket::snapshot)
            .collect()
    }

    fn wake_satisfied(state: &mut LedgerState, id: &PayerId, balance: Balance) {
        let emptied = match state.waiters.get_mut(id) {
            Some(list) => {
                let pending = std::mem::take(list);
                for waiter in pending {
                    if balance >= waiter.threshold {
                        // Ignore a receiver that went away mid-cancellation.
                        let _ = waiter.notify.send(());
                    } else {
                        list.push(waiter);
                    }
                }
                list.is_empty()
            }
            None => false,
        };
        if emptied {
            state.waiters.remove(id);
        }
    }
}

#[async_trait]
impl BalanceSink for CreditLedger {
    async fn credit(&self, id: PayerId, amount: Amount) -> Result<Balance> {
        Ok(CreditLedger::credit(self, &id, amount))
    }
}

/// Removes a pending waiter registration when its future is dropped before
/// resolving.
struct WaiterGuard {
    inner: Arc<Inner>,
    id: PayerId,
    token: u64,
    armed: bool,
}

impl WaiterGuard {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        let emptied = match state.waiters.get_mut(&self.id) {
            Some(list) => {
                list.retain(|w| w.token != self.token);
                list.is_empty()
            }
            None => false,
        };
        if emptied {
            state.waiters.remove(&self.id);
        }
    }
}
