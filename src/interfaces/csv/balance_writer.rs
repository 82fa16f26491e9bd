use crate::domain::account::PayerBalance;
use crate::error::Result;
use std::io::Write;

/// Writes final payer balances as CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    /// Serializes every entry, sorted by payer id for stable output.
    pub fn write_balances(&mut self, mut balances: Vec<PayerBalance>) -> Result<()> {
        balances.sort_by(|a, b| a.payer.as_str().cmp(b.payer.as_str()));
        for record in balances {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
