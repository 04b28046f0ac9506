//! End-to-end integration tests
//!
//! These tests drive the ledger through a real snapshot file. Each test:
//! 1. Opens a ledger over a file in a temporary directory
//! 2. Runs a sequence of operations
//! 3. Reopens the file with a fresh ledger, as a restart would
//! 4. Checks that the reloaded state matches what was acknowledged
//!
//! The legacy fixture in tests/fixtures/ is a snapshot in the older format
//! (minute timestamps, numeric balances).

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_bank_ledger::core::Ledger;
    use rust_bank_ledger::io::FileSnapshotStore;
    use rust_bank_ledger::types::{replay_balance, CardType, EntryKind, LedgerError};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn open_ledger(path: &Path) -> Ledger {
        Ledger::open_store(Box::new(FileSnapshotStore::new(path)))
    }

    fn seeded_ledger(dir: &TempDir) -> Ledger {
        let ledger = open_ledger(&dir.path().join("accounts.json"));
        ledger.ensure_demo_accounts();
        ledger
    }

    #[test]
    fn test_fresh_start_seeds_demo_accounts_to_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");

        let ledger = open_ledger(&path);
        assert!(ledger.is_empty());
        ledger.ensure_demo_accounts();
        assert!(path.exists());

        let reloaded = open_ledger(&path);
        assert_eq!(reloaded.list(), ledger.list());
        assert_eq!(reloaded.get(1001).unwrap().balance, dec!(5000));
        assert_eq!(reloaded.get(1002).unwrap().balance, dec!(8000));
    }

    #[test]
    fn test_transfer_scenario_survives_restart() {
        let dir = TempDir::new().unwrap();
        let ledger = seeded_ledger(&dir);

        let outcome = ledger.transfer(1001, 1002, dec!(2000), None).unwrap();
        assert!(outcome.durability.is_persisted());
        assert_eq!(outcome.value.from_balance, dec!(3000));
        assert_eq!(outcome.value.to_balance, dec!(10000));

        let reloaded = open_ledger(&dir.path().join("accounts.json"));
        let from = reloaded.statement(1001).unwrap();
        let to = reloaded.statement(1002).unwrap();
        let last_out = from.last().unwrap();
        let last_in = to.last().unwrap();

        assert_eq!(last_out.kind, EntryKind::TransferOut);
        assert_eq!(last_out.amount, dec!(2000));
        assert_eq!(last_out.balance_after, dec!(3000));
        assert_eq!(last_out.note, "To 1002");
        assert_eq!(last_in.kind, EntryKind::TransferIn);
        assert_eq!(last_in.balance_after, dec!(10000));
        assert_eq!(last_in.note, "From 1001");
    }

    #[test]
    fn test_full_session_round_trips_exactly() {
        let dir = TempDir::new().unwrap();
        let ledger = seeded_ledger(&dir);

        let opened = ledger.open("Ravi Kumar", dec!(100), "secret").unwrap().value;
        ledger.deposit(opened.number, dec!(50.25), "salary").unwrap();
        ledger.add_interest(opened.number).unwrap();
        ledger
            .upi_debit(opened.number, "chai@upi", dec!(10), None)
            .unwrap();
        let card = ledger.issue_card(opened.number, CardType::Credit).unwrap().value;
        ledger.change_password(opened.number, "secret", "better").unwrap();

        let (access, _) = ledger.authenticate(opened.number, "better").unwrap();
        let secrets = ledger.reveal_card(&access, &card.id).unwrap();

        let reloaded = open_ledger(&dir.path().join("accounts.json"));
        assert_eq!(reloaded.list(), ledger.list());

        let (access, summary) = reloaded.authenticate(opened.number, "better").unwrap();
        assert_eq!(reloaded.reveal_card(&access, &card.id).unwrap(), secrets);
        assert_eq!(
            replay_balance(&summary.transactions),
            Some(summary.balance)
        );
        assert!(matches!(
            reloaded.authenticate(opened.number, "secret"),
            Err(LedgerError::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn test_close_is_persisted() {
        let dir = TempDir::new().unwrap();
        let ledger = seeded_ledger(&dir);

        ledger.close(1002).unwrap();

        let reloaded = open_ledger(&dir.path().join("accounts.json"));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get(1002).unwrap_err(), LedgerError::not_found(1002));
    }

    #[rstest]
    #[case::zero_deposit(|l: &Ledger| l.deposit(1001, Decimal::ZERO, "").map(|_| ()))]
    #[case::overdraft(|l: &Ledger| l.withdraw(1001, dec!(5000.01), "").map(|_| ()))]
    #[case::self_transfer(|l: &Ledger| l.transfer(1001, 1001, dec!(1), None).map(|_| ()))]
    #[case::unknown_target(|l: &Ledger| l.transfer(1001, 4242, dec!(1), None).map(|_| ()))]
    #[case::wrong_password(|l: &Ledger| l.change_password(1001, "nope", "x").map(|_| ()))]
    fn test_rejected_operation_leaves_file_untouched(
        #[case] operation: fn(&Ledger) -> Result<(), LedgerError>,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        let ledger = seeded_ledger(&dir);
        let before = fs::read_to_string(&path).unwrap();

        assert!(operation(&ledger).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(ledger.get(1001).unwrap().balance, dec!(5000));
        assert_eq!(ledger.statement(1001).unwrap().len(), 1);
    }

    #[test]
    fn test_legacy_snapshot_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        fs::copy("tests/fixtures/legacy_accounts.json", &path).unwrap();

        let ledger = open_ledger(&path);
        assert_eq!(ledger.len(), 2);

        let amit = ledger.get(1001).unwrap();
        assert_eq!(amit.balance, dec!(4890.5));
        assert_eq!(replay_balance(&amit.transactions), Some(dec!(4890.5)));
        assert_eq!(amit.cards.len(), 1);
        assert_eq!(amit.cards[0].masked, "**** **** **** 4242");

        // Seeding does not overwrite loaded accounts
        assert!(ledger.ensure_demo_accounts().value.is_empty());

        let (access, _) = ledger.authenticate(1001, "pass123").unwrap();
        let secrets = ledger
            .reveal_card(&access, "5f0c6a3e-8f4b-4d7e-9a51-2b7c1f3e9d10")
            .unwrap();
        assert_eq!(secrets.number, "4000123412344242");
        assert_eq!(secrets.security_code, "317");

        // The next save rewrites the file in the current format
        ledger.deposit(1002, dec!(1), "").unwrap();
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("\"2024-01-15 10:42:00\""));
        assert!(rewritten.contains("\"8001\""));
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("accounts.json");
        fs::write(&path, "{ not json").unwrap();

        let ledger = open_ledger(&path);
        assert!(ledger.is_empty());
        // The unreadable file is left alone until something is committed
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");

        ledger.ensure_demo_accounts();
        assert_eq!(open_ledger(&path).len(), 2);
    }

    #[test]
    fn test_unwritable_snapshot_keeps_changes_in_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("accounts.json");
        let ledger = open_ledger(&path);

        let seeded = ledger.ensure_demo_accounts();
        assert!(!seeded.durability.is_persisted());

        let outcome = ledger.deposit(1001, dec!(10), "").unwrap();
        assert_eq!(outcome.value, dec!(5010));
        assert!(!outcome.durability.is_persisted());
        assert_eq!(ledger.get(1001).unwrap().balance, dec!(5010));
        assert!(!path.exists());
    }
}
