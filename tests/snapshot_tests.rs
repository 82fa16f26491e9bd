use monetizer::application::ledger::CreditLedger;
use monetizer::config::MonetizerConfig;
use monetizer::domain::account::{Amount, Balance, PayerBalance, PayerId};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_snapshot_round_trips_through_json() {
    let ledger = CreditLedger::new(MonetizerConfig::unbounded());
    ledger.credit(&PayerId::from("abc"), Amount::new(dec!(1.5)).unwrap());
    ledger.credit(&PayerId::from("xyz"), Amount::new(dec!(42)).unwrap());

    // Persist-at-shutdown shape: the snapshot serializes and loads back.
    let json = serde_json::to_string(&ledger.snapshot()).unwrap();
    let mut restored: Vec<PayerBalance> = serde_json::from_str(&json).unwrap();
    restored.sort_by(|a, b| a.payer.as_str().cmp(b.payer.as_str()));

    assert_eq!(restored.len(), 2);
    assert_eq!(restored[0].payer, PayerId::from("abc"));
    assert_eq!(restored[0].balance, Balance::new(dec!(1.5)));
    assert_eq!(restored[1].payer, PayerId::from("xyz"));
    assert_eq!(restored[1].balance, Balance::new(dec!(42)));
}

#[tokio::test]
async fn test_snapshot_reflects_spends() {
    let ledger = CreditLedger::default();
    let id = PayerId::from("abc");

    ledger.credit(&id, Amount::new(dec!(100)).unwrap());
    ledger.spend(&id, Amount::new(dec!(60)).unwrap()).unwrap();

    let snapshot = ledger.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].balance, Balance::new(dec!(40)));
}
