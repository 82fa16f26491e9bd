use crate::error::LedgerError;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Opaque token identifying one visitor's credit bucket.
///
/// Issued by the embedding web server (usually through a cookie) and treated
/// as an arbitrary key; the ledger never inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PayerId(String);

impl PayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random id: 16 random bytes, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Non-negative accrued credit for one payer.
///
/// A wrapper around `rust_decimal::Decimal` so protocol amount strings parse
/// losslessly and sums cannot overflow or round.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// A positive credit or debit value.
///
/// Construction is the only validation point for amounts entering the
/// ledger; zero and negative values are rejected here.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount)
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// One ledger row: a payer and the credit accrued so far.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PayerBalance {
    pub payer: PayerId,
    pub balance: Balance,
}

/// A single payer's credit bucket.
///
/// Pure state transitions only; concurrency and waiter notification live in
/// the ledger that owns the buckets.
#[derive(Debug, PartialEq, Clone)]
pub struct CreditBucket {
    pub payer: PayerId,
    pub balance: Balance,
}

impl CreditBucket {
    pub fn new(payer: PayerId) -> Self {
        Self {
            payer,
            balance: Balance::ZERO,
        }
    }

    /// Applies a credit, clamping the result to `cap` when one is set.
    pub fn credit(&mut self, amount: Amount, cap: Option<Balance>) -> Balance {
        let mut next = self.balance + amount.into();
        if let Some(cap) = cap
            && next > cap
        {
            next = cap;
        }
        self.balance = next;
        next
    }

    /// Debits `price` if the bucket holds at least that much.
    pub fn spend(&mut self, price: Amount) -> Result<Balance, LedgerError> {
        let price: Balance = price.into();
        if self.balance >= price {
            self.balance -= price;
            Ok(self.balance)
        } else {
            Err(LedgerError::InsufficientBalance {
                id: self.payer.to_string(),
                price: price.value(),
                balance: self.balance.value(),
            })
        }
    }

    pub fn snapshot(&self) -> PayerBalance {
        PayerBalance {
            payer: self.payer.clone(),
            balance: self.balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_arithmetic() {
        let b1 = Balance::new(dec!(10.0));
        let b2 = Balance::new(dec!(5.0));
        assert_eq!(b1 + b2, Balance::new(dec!(15.0)));
        assert_eq!(b1 - b2, Balance::new(dec!(5.0)));
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(LedgerError::InvalidAmount)
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(LedgerError::InvalidAmount)
        ));
    }

    #[test]
    fn test_payer_id_generate() {
        let id = PayerId::generate();
        // 16 random bytes, hex-encoded
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, PayerId::generate());
    }

    #[test]
    fn test_bucket_credit() {
        let mut bucket = CreditBucket::new(PayerId::from("abc"));
        let balance = bucket.credit(Amount::new(dec!(10.0)).unwrap(), None);
        assert_eq!(balance, Balance::new(dec!(10.0)));
        assert_eq!(bucket.balance, Balance::new(dec!(10.0)));
    }

    #[test]
    fn test_bucket_credit_clamps_to_cap() {
        let mut bucket = CreditBucket::new(PayerId::from("abc"));
        let cap = Some(Balance::new(dec!(100)));
        bucket.credit(Amount::new(dec!(80)).unwrap(), cap);
        let balance = bucket.credit(Amount::new(dec!(50)).unwrap(), cap);
        assert_eq!(balance, Balance::new(dec!(100)));
    }

    #[test]
    fn test_bucket_spend_success() {
        let mut bucket = CreditBucket::new(PayerId::from("abc"));
        bucket.credit(Amount::new(dec!(10.0)).unwrap(), None);

        let remaining = bucket.spend(Amount::new(dec!(4.0)).unwrap()).unwrap();
        assert_eq!(remaining, Balance::new(dec!(6.0)));
    }

    #[test]
    fn test_bucket_spend_insufficient() {
        let mut bucket = CreditBucket::new(PayerId::from("abc"));
        bucket.credit(Amount::new(dec!(10.0)).unwrap(), None);

        let result = bucket.spend(Amount::new(dec!(20.0)).unwrap());
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance { .. })
        ));
        // A failed spend leaves the balance untouched.
        assert_eq!(bucket.balance, Balance::new(dec!(10.0)));
    }

    #[test]
    fn test_bucket_spend_down_to_zero() {
        let mut bucket = CreditBucket::new(PayerId::from("abc"));
        bucket.credit(Amount::new(dec!(5.0)).unwrap(), None);

        let remaining = bucket.spend(Amount::new(dec!(5.0)).unwrap()).unwrap();
        assert_eq!(remaining, Balance::ZERO);
    }
}
