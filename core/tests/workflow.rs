//! End-to-end workflow tests against an in-memory mock ledger.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use sweep_client::{
    CallDescriptor, ClientError, Event, ExecutionReceipt, Ledger, SignedTransaction,
};
use sweep_core::{run_sweep, RunError, RunOutcome};
use sweep_types::{AccountAddress, Amount};
use sweep_wallet::{save_keystore, KeystoreFile, WalletStore};

fn addr(c: char) -> AccountAddress {
    let mut s = String::from("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcN");
    s.push(c);
    s.push(c);
    AccountAddress::parse(s).unwrap()
}

/// In-memory ledger recording the order of operations it serves.
struct MockLedger {
    state: Mutex<MockState>,
    /// Flat fee deducted from the balance on a successful batch.
    fee: Amount,
    /// Verdict the ledger reports for submitted batches.
    submit_success: bool,
    /// Delegate whose stake query fails with a network error.
    failing_delegate: Option<AccountAddress>,
    /// Fail every balance query with a network error.
    failing_balance: bool,
    /// Drop the connection on submit instead of returning a receipt.
    failing_submit: bool,
}

struct MockState {
    balance: Amount,
    stakes: BTreeMap<AccountAddress, Amount>,
    ops: Vec<String>,
}

impl MockLedger {
    fn new(balance: Amount) -> Self {
        Self {
            state: Mutex::new(MockState {
                balance,
                stakes: BTreeMap::new(),
                ops: Vec::new(),
            }),
            fee: Amount::from_motes(1_000),
            submit_success: true,
            failing_delegate: None,
            failing_balance: false,
            failing_submit: false,
        }
    }

    fn with_stake(self, delegate: AccountAddress, amount: Amount) -> Self {
        self.state.lock().unwrap().stakes.insert(delegate, amount);
        self
    }

    fn failing_submission(mut self) -> Self {
        self.submit_success = false;
        self
    }

    fn failing_stake_query(mut self, delegate: AccountAddress) -> Self {
        self.failing_delegate = Some(delegate);
        self
    }

    fn failing_balance_query(mut self) -> Self {
        self.failing_balance = true;
        self
    }

    fn failing_submit_transport(mut self) -> Self {
        self.failing_submit = true;
        self
    }

    fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }
}

impl Ledger for MockLedger {
    async fn query_balance(&self, _address: &AccountAddress) -> Result<Amount, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push("balance".to_string());
        if self.failing_balance {
            return Err(ClientError::Network("connection reset".to_string()));
        }
        Ok(state.balance)
    }

    async fn query_stake(
        &self,
        _account: &AccountAddress,
        delegate: &AccountAddress,
    ) -> Result<Amount, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("stake:{}", delegate));
        if self.failing_delegate.as_ref() == Some(delegate) {
            return Err(ClientError::Network("connection reset".to_string()));
        }
        Ok(state
            .stakes
            .get(delegate)
            .copied()
            .unwrap_or(Amount::ZERO))
    }

    fn sign_and_build_extrinsic(
        &self,
        call: &CallDescriptor,
        credential: &sweep_wallet::Credential,
    ) -> Result<SignedTransaction, ClientError> {
        let _secret = credential.unlock()?;
        self.state.lock().unwrap().ops.push("sign".to_string());
        Ok(SignedTransaction {
            call: call.clone(),
            signer: credential.address().clone(),
            public_key: String::new(),
            signature: String::new(),
        })
    }

    async fn submit(
        &self,
        tx: &SignedTransaction,
        wait_for_inclusion: bool,
        wait_for_finalization: bool,
    ) -> Result<ExecutionReceipt, ClientError> {
        assert!(wait_for_inclusion && wait_for_finalization);
        let mut state = self.state.lock().unwrap();
        state.ops.push("submit".to_string());

        if self.failing_submit {
            return Err(ClientError::Network("connection lost".to_string()));
        }

        if self.submit_success {
            // apply every remove_stake sub-call, then charge the fee once
            for sub_call in tx.call.sub_calls() {
                let delegate =
                    AccountAddress::parse(sub_call.params["delegate"].as_str().unwrap()).unwrap();
                let amount = Amount::from_motes(
                    sub_call.params["amount"].as_str().unwrap().parse().unwrap(),
                );
                let staked = state.stakes.get(&delegate).copied().unwrap_or(Amount::ZERO);
                assert!(amount <= staked, "cannot remove more than staked");
                state.stakes.insert(delegate, staked - amount);
                state.balance = state.balance + amount;
            }
            state.balance = state.balance.saturating_sub(self.fee);
        }

        Ok(ExecutionReceipt {
            hash: "0xmock".to_string(),
            success: self.submit_success,
            events: vec![Event {
                module: "utility".to_string(),
                name: if self.submit_success {
                    "BatchCompleted".to_string()
                } else {
                    "BatchInterrupted".to_string()
                },
                data: serde_json::Value::Null,
            }],
        })
    }
}

/// Write a wallet directory with a plain coldkey and the given hotkeys.
fn write_wallet(root: &Path, name: &str, hotkeys: &[(&str, AccountAddress)]) -> WalletStore {
    let dir = root.join(name);
    std::fs::create_dir_all(dir.join("hotkeys")).unwrap();
    save_keystore(
        &KeystoreFile::plain(addr('z'), &[1u8; 32]),
        &dir.join("coldkey"),
    )
    .unwrap();
    for (i, (file, address)) in hotkeys.iter().enumerate() {
        save_keystore(
            &KeystoreFile::plain(address.clone(), &[(i as u8) + 2; 32]),
            &dir.join("hotkeys").join(file),
        )
        .unwrap();
    }
    WalletStore::new(root)
}

#[tokio::test]
async fn no_identities_means_nothing_to_unstake() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[]);
    let ledger = MockLedger::new(Amount::from_tokens(10));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NothingToUnstake));

    // the submission path is never contacted
    assert!(ledger.ops().is_empty());
}

#[tokio::test]
async fn all_zero_positions_mean_nothing_to_unstake() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a')), ("d2", addr('b'))]);
    let ledger = MockLedger::new(Amount::from_tokens(10));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NothingToUnstake));

    let ops = ledger.ops();
    assert_eq!(ops.len(), 2, "one stake query per identity, nothing else");
    assert!(ops.iter().all(|op| op.starts_with("stake:")));
}

#[tokio::test]
async fn zero_stake_identity_is_filtered_strictly() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a')), ("d2", addr('b'))]);
    let ledger =
        MockLedger::new(Amount::from_tokens(10)).with_stake(addr('a'), Amount::from_tokens(500));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    let RunOutcome::Swept(report) = outcome else {
        panic!("expected a submitted sweep");
    };

    assert_eq!(report.instructions.len(), 1);
    assert_eq!(report.instructions[0].delegate, addr('a'));
    assert_eq!(report.instructions[0].amount, Amount::from_tokens(500));

    assert!(report.success);
    // after = before + 500 tokens - fee, and never below before
    assert!(report.balance_after >= report.balance_before);
    assert_eq!(
        report.balance_after,
        report.balance_before + Amount::from_tokens(500) - Amount::from_motes(1_000)
    );
}

#[tokio::test]
async fn balance_snapshots_bracket_the_submission() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a'))]);
    let ledger =
        MockLedger::new(Amount::from_tokens(1)).with_stake(addr('a'), Amount::from_tokens(2));

    run_sweep(&ledger, &store, "ops", None).await.unwrap();

    let ops = ledger.ops();
    let first_balance = ops.iter().position(|op| op == "balance").unwrap();
    let submit = ops.iter().position(|op| op == "submit").unwrap();
    let last_balance = ops.iter().rposition(|op| op == "balance").unwrap();
    assert!(first_balance < submit, "before snapshot precedes submission");
    assert!(submit < last_balance, "after snapshot follows submission");
}

#[tokio::test]
async fn failed_submission_still_reports_both_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a'))]);
    let ledger = MockLedger::new(Amount::from_tokens(7))
        .with_stake(addr('a'), Amount::from_tokens(3))
        .failing_submission();

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    let RunOutcome::Swept(report) = outcome else {
        panic!("a reported failure still completes the run");
    };

    assert!(!report.success);
    assert_eq!(report.balance_before, Amount::from_tokens(7));
    assert_eq!(report.balance_after, Amount::from_tokens(7));
    assert!(!report.events.is_empty());

    // the after snapshot was still taken
    let ops = ledger.ops();
    let submit = ops.iter().position(|op| op == "submit").unwrap();
    assert!(ops.iter().rposition(|op| op == "balance").unwrap() > submit);
}

#[tokio::test]
async fn second_run_after_success_has_nothing_to_unstake() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a'))]);
    let ledger =
        MockLedger::new(Amount::from_tokens(1)).with_stake(addr('a'), Amount::from_tokens(9));

    let first = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    assert!(matches!(first, RunOutcome::Swept(ref r) if r.success));

    let second = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    assert!(matches!(second, RunOutcome::NothingToUnstake));
}

#[tokio::test]
async fn stake_query_failure_is_fatal_not_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a')), ("d2", addr('b'))]);
    let ledger = MockLedger::new(Amount::from_tokens(1))
        .with_stake(addr('a'), Amount::from_tokens(5))
        .failing_stake_query(addr('b'));

    let err = run_sweep(&ledger, &store, "ops", None).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Query { ref delegate, .. } if *delegate == addr('b')
    ));

    // nothing was signed or submitted
    let ops = ledger.ops();
    assert!(!ops.contains(&"sign".to_string()));
    assert!(!ops.contains(&"submit".to_string()));
}

#[tokio::test]
async fn balance_query_failure_is_fatal_not_zero() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a'))]);
    let ledger = MockLedger::new(Amount::from_tokens(1))
        .with_stake(addr('a'), Amount::from_tokens(5))
        .failing_balance_query();

    let err = run_sweep(&ledger, &store, "ops", None).await.unwrap_err();
    assert!(matches!(err, RunError::Balance(ClientError::Network(_))));

    // one attempt at the before snapshot, no retry, nothing submitted
    let ops = ledger.ops();
    assert_eq!(ops.iter().filter(|op| *op == "balance").count(), 1);
    assert!(!ops.contains(&"submit".to_string()));
}

#[tokio::test]
async fn submit_transport_failure_is_fatal_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("d1", addr('a'))]);
    let ledger = MockLedger::new(Amount::from_tokens(1))
        .with_stake(addr('a'), Amount::from_tokens(5))
        .failing_submit_transport();

    let err = run_sweep(&ledger, &store, "ops", None).await.unwrap_err();
    assert!(matches!(err, RunError::Submission(ClientError::Network(_))));

    let ops = ledger.ops();
    // exactly one submission attempt
    assert_eq!(ops.iter().filter(|op| *op == "submit").count(), 1);
    // the run ends at the lost connection: only the before snapshot exists,
    // and no conclusion is drawn about whether the batch was applied
    let submit = ops.iter().position(|op| op == "submit").unwrap();
    assert_eq!(ops.iter().filter(|op| *op == "balance").count(), 1);
    assert!(ops.iter().position(|op| op == "balance").unwrap() < submit);
}

#[tokio::test]
async fn locked_credential_fails_before_submission() {
    let dir = tempfile::tempdir().unwrap();
    let wallet_dir = dir.path().join("ops");
    std::fs::create_dir_all(wallet_dir.join("hotkeys")).unwrap();
    save_keystore(
        &KeystoreFile::encrypted(addr('z'), &[1u8; 32], "secret-pw").unwrap(),
        &wallet_dir.join("coldkey"),
    )
    .unwrap();
    save_keystore(
        &KeystoreFile::plain(addr('a'), &[2u8; 32]),
        &wallet_dir.join("hotkeys").join("d1"),
    )
    .unwrap();

    let store = WalletStore::new(dir.path());
    let ledger =
        MockLedger::new(Amount::from_tokens(1)).with_stake(addr('a'), Amount::from_tokens(5));

    // no passphrase supplied for an encrypted coldkey
    let err = run_sweep(&ledger, &store, "ops", None).await.unwrap_err();
    assert!(err.is_credential_locked());
    assert!(!ledger.ops().contains(&"submit".to_string()));

    // with the right passphrase the same run goes through
    let outcome = run_sweep(&ledger, &store, "ops", Some("secret-pw".to_string()))
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Swept(ref r) if r.success));
}

#[tokio::test]
async fn protected_identities_are_excluded_from_discovery() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("open", addr('a'))]);
    save_keystore(
        &KeystoreFile::encrypted(addr('b'), &[9u8; 32], "hotkey-pw").unwrap(),
        &dir.path().join("ops").join("hotkeys").join("sealed"),
    )
    .unwrap();

    let ledger = MockLedger::new(Amount::from_tokens(1))
        .with_stake(addr('a'), Amount::from_tokens(2))
        .with_stake(addr('b'), Amount::from_tokens(4));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    let RunOutcome::Swept(report) = outcome else {
        panic!("expected a submitted sweep");
    };

    // only the unprotected identity's position is swept
    assert_eq!(report.instructions.len(), 1);
    assert_eq!(report.instructions[0].delegate, addr('a'));
}

#[tokio::test]
async fn unloadable_identity_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(dir.path(), "ops", &[("good", addr('a'))]);
    std::fs::write(
        dir.path().join("ops").join("hotkeys").join("corrupt"),
        "not a keystore",
    )
    .unwrap();

    let ledger =
        MockLedger::new(Amount::from_tokens(1)).with_stake(addr('a'), Amount::from_tokens(2));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Swept(ref r) if r.instructions.len() == 1));
}

#[tokio::test]
async fn duplicate_delegate_addresses_are_queried_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_wallet(
        dir.path(),
        "ops",
        &[("copy1", addr('a')), ("copy2", addr('a'))],
    );
    let ledger =
        MockLedger::new(Amount::from_tokens(1)).with_stake(addr('a'), Amount::from_tokens(6));

    let outcome = run_sweep(&ledger, &store, "ops", None).await.unwrap();
    let RunOutcome::Swept(report) = outcome else {
        panic!("expected a submitted sweep");
    };

    assert_eq!(report.instructions.len(), 1);
    let stake_queries = ledger
        .ops()
        .iter()
        .filter(|op| op.starts_with("stake:"))
        .count();
    assert_eq!(stake_queries, 1);
}

#[tokio::test]
async fn missing_wallet_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = WalletStore::new(dir.path());
    let ledger = MockLedger::new(Amount::ZERO);

    let err = run_sweep(&ledger, &store, "ghost", None).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::Wallet(sweep_wallet::WalletError::NotFound(_))
    ));
}
