use crate::core::ledger::DEMO_PASSWORD;
use crate::types::{AccountNumber, CardType};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Demo bank ledger backed by a JSON snapshot file
#[derive(Parser, Debug)]
#[command(name = "rust-bank-ledger")]
#[command(about = "Demo bank ledger backed by a JSON snapshot file", long_about = None)]
pub struct CliArgs {
    /// Snapshot file holding every account
    #[arg(
        long = "snapshot",
        value_name = "FILE",
        env = "LEDGER_SNAPSHOT",
        default_value = "accounts.json"
    )]
    pub snapshot: PathBuf,

    /// Skip seeding the demo accounts 1001 and 1002
    #[arg(long = "no-demo-accounts", env = "LEDGER_NO_DEMO")]
    pub no_demo_accounts: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Ledger operations exposed on the command line
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List all accounts
    List,

    /// Show one account with its transactions and cards
    Show { account: AccountNumber },

    /// Open a new account
    Open {
        name: String,
        #[arg(long, default_value = "0")]
        balance: Decimal,
        #[arg(long, default_value = DEMO_PASSWORD)]
        password: String,
    },

    /// Deposit funds
    Deposit {
        account: AccountNumber,
        amount: Decimal,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Withdraw funds
    Withdraw {
        account: AccountNumber,
        amount: Decimal,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Credit interest on the current balance
    Interest { account: AccountNumber },

    /// Move funds between two accounts
    Transfer {
        from: AccountNumber,
        to: AccountNumber,
        amount: Decimal,
        #[arg(long)]
        note: Option<String>,
    },

    /// Pay an external UPI address
    Upi {
        account: AccountNumber,
        upi_id: String,
        amount: Decimal,
        #[arg(long)]
        note: Option<String>,
    },

    /// Issue a debit or credit card
    IssueCard {
        account: AccountNumber,
        #[arg(long = "type", value_name = "TYPE", default_value = "debit")]
        card_type: CardType,
    },

    /// List an account's cards (masked)
    Cards { account: AccountNumber },

    /// Change an account password
    ChangePassword {
        account: AccountNumber,
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_password: String,
    },

    /// Close an account
    Close { account: AccountNumber },

    /// Write an account statement as CSV to stdout
    Statement { account: AccountNumber },

    /// Check a password, optionally revealing one card's full details
    Login {
        account: AccountNumber,
        #[arg(long)]
        password: String,
        #[arg(long = "reveal-card", value_name = "CARD_ID")]
        reveal_card: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case::list(&["program", "list"], Command::List)]
    #[case::show(&["program", "show", "1001"], Command::Show { account: 1001 })]
    #[case::open_defaults(
        &["program", "open", "Ravi"],
        Command::Open { name: "Ravi".into(), balance: dec!(0), password: "pass123".into() }
    )]
    #[case::open_explicit(
        &["program", "open", "Ravi", "--balance", "250.50", "--password", "pw"],
        Command::Open { name: "Ravi".into(), balance: dec!(250.50), password: "pw".into() }
    )]
    #[case::deposit(
        &["program", "deposit", "1001", "100"],
        Command::Deposit { account: 1001, amount: dec!(100), note: String::new() }
    )]
    #[case::withdraw_with_note(
        &["program", "withdraw", "1001", "20.5", "--note", "atm"],
        Command::Withdraw { account: 1001, amount: dec!(20.5), note: "atm".into() }
    )]
    #[case::transfer(
        &["program", "transfer", "1001", "1002", "2000"],
        Command::Transfer { from: 1001, to: 1002, amount: dec!(2000), note: None }
    )]
    #[case::upi(
        &["program", "upi", "1001", "shop@upi", "10", "--note", "tea"],
        Command::Upi { account: 1001, upi_id: "shop@upi".into(), amount: dec!(10), note: Some("tea".into()) }
    )]
    #[case::issue_card_default(
        &["program", "issue-card", "1001"],
        Command::IssueCard { account: 1001, card_type: CardType::Debit }
    )]
    #[case::issue_card_mixed_case(
        &["program", "issue-card", "1001", "--type", "Credit"],
        Command::IssueCard { account: 1001, card_type: CardType::Credit }
    )]
    #[case::change_password(
        &["program", "change-password", "1001", "--current", "a", "--new", "b"],
        Command::ChangePassword { account: 1001, current: "a".into(), new_password: "b".into() }
    )]
    #[case::login_reveal(
        &["program", "login", "1001", "--password", "pass123", "--reveal-card", "abc"],
        Command::Login { account: 1001, password: "pass123".into(), reveal_card: Some("abc".into()) }
    )]
    fn test_command_parsing(#[case] args: &[&str], #[case] expected: Command) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.command, expected);
    }

    #[rstest]
    #[case::missing_command(&["program"])]
    #[case::bad_amount(&["program", "deposit", "1001", "ten"])]
    #[case::bad_account(&["program", "show", "abc"])]
    #[case::bad_card_type(&["program", "issue-card", "1001", "--type", "gold"])]
    #[case::login_without_password(&["program", "login", "1001"])]
    fn test_invalid_arguments(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[test]
    fn test_global_options() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--snapshot",
            "/tmp/ledger.json",
            "--no-demo-accounts",
            "list",
        ])
        .unwrap();
        assert_eq!(parsed.snapshot, PathBuf::from("/tmp/ledger.json"));
        assert!(parsed.no_demo_accounts);
    }
}
