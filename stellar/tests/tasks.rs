use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stellar_tasks::envelope::{
    ACCOUNT_LOOKUP_FAILED, HORIZON_ERROR, INVALID_PUBLIC_KEY, KEYPAIR_GENERATED,
    NO_PAYMENT_PATHS, SUBMITTED,
};
use stellar_tasks::{
    random_keypair, validate_key, AccountState, AssetRecord, ClientError, ErrorKind, Identity,
    LedgerClient, PathQuery, PathRecord, Settings, SignedTransaction, StellarNetwork, Tasks,
};

#[derive(Default)]
struct MockLedger {
    loads: AtomicUsize,
    path_queries: AtomicUsize,
    submissions: AtomicUsize,
    missing_accounts: bool,
    paths: Vec<PathRecord>,
    /// When false the mock answers submissions with no result.
    accept: bool,
    submit_delay: Option<Duration>,
    loaded: Mutex<Vec<String>>,
    queries: Mutex<Vec<PathQuery>>,
}

impl MockLedger {
    fn accepting() -> Self {
        MockLedger {
            accept: true,
            ..Default::default()
        }
    }

    fn remote_calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
            + self.path_queries.load(Ordering::SeqCst)
            + self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn load_account(&self, public_key: &str) -> Result<AccountState, ClientError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.loaded.lock().unwrap().push(public_key.to_string());
        if self.missing_accounts {
            return Err(ClientError::AccountLookup {
                account: public_key.to_string(),
                reason: "404".to_string(),
            });
        }
        Ok(AccountState {
            account_id: public_key.to_string(),
            sequence: 4_294_967_296,
        })
    }

    async fn find_paths(&self, query: &PathQuery) -> Result<Vec<PathRecord>, ClientError> {
        self.path_queries.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.paths.clone())
    }

    async fn submit_transaction(
        &self,
        tx: &SignedTransaction,
    ) -> Result<Option<Value>, ClientError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        if self.accept {
            Ok(Some(json!({ "successful": true, "envelope_xdr": tx.envelope_xdr })))
        } else {
            Ok(None)
        }
    }
}

fn identity() -> Identity {
    let kp = random_keypair().unwrap();
    Identity {
        public_key: kp.public_key().account_id(),
        private_key: kp.secret_key().secret_seed(),
    }
}

fn settings() -> Settings {
    Settings {
        network: StellarNetwork::Testnet,
        horizon_url: None,
        asset_code: "RWF".to_string(),
        starting_balance: "20".to_string(),
        destination_amount: "100".to_string(),
        request_timeout_secs: 30,
        issuer: identity(),
        sender: identity(),
        receiver: identity(),
    }
}

fn path_record(hops: Vec<AssetRecord>) -> PathRecord {
    PathRecord {
        source_asset_type: "native".to_string(),
        source_asset_code: None,
        source_asset_issuer: None,
        source_amount: "0.2000000".to_string(),
        destination_asset_type: "credit_alphanum4".to_string(),
        destination_asset_code: Some("RWF".to_string()),
        destination_asset_issuer: Some(identity().public_key),
        destination_amount: "100.0000000".to_string(),
        path: hops,
    }
}

fn tasks(ledger: MockLedger) -> (Tasks<Arc<MockLedger>>, Arc<MockLedger>) {
    let ledger = Arc::new(ledger);
    (Tasks::new(settings(), ledger.clone()), ledger)
}

#[tokio::test]
async fn create_account_end_to_end() {
    let (tasks, ledger) = tasks(MockLedger::accepting());
    let destination = identity().public_key;

    let envelope = tasks.create_account(&destination).await.unwrap();

    assert_eq!(envelope.message, vec![SUBMITTED]);
    assert_eq!(envelope.data["successful"], json!(true));
    assert!(!envelope.data["envelope_xdr"].as_str().unwrap().is_empty());
    assert_eq!(
        ledger.loaded.lock().unwrap().as_slice(),
        &[tasks.settings().issuer.public_key.clone()]
    );
    assert_eq!(ledger.submissions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn create_account_rejects_invalid_key_without_remote_calls() {
    let (tasks, ledger) = tasks(MockLedger::accepting());

    let extended = format!("{}Q", identity().public_key);
    for bad in [
        "",
        "not-a-key",
        "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        extended.as_str(),
    ] {
        let rejection = tasks.create_account(bad).await.unwrap_err();
        assert_eq!(rejection.kind, ErrorKind::InvalidInput);
        assert_eq!(rejection.last_message(), Some(INVALID_PUBLIC_KEY));
    }
    assert_eq!(ledger.remote_calls(), 0);
}

#[tokio::test]
async fn configured_invalid_keys_short_circuit_every_handler() {
    let ledger = Arc::new(MockLedger::accepting());
    let mut broken = settings();
    broken.issuer.public_key = "GBROKEN".to_string();
    broken.sender.public_key = "SBROKEN".to_string();
    broken.receiver.public_key = String::new();
    let tasks = Tasks::new(broken, ledger.clone());

    let rejections = vec![
        tasks.trustlines().await.unwrap_err(),
        tasks.offers().await.unwrap_err(),
        tasks.path_payment().await.unwrap_err(),
    ];

    for rejection in rejections {
        assert_eq!(rejection.kind, ErrorKind::InvalidInput);
        assert_eq!(rejection.message, vec![INVALID_PUBLIC_KEY]);
    }
    assert_eq!(ledger.remote_calls(), 0);
}

#[tokio::test]
async fn empty_submission_result_is_a_horizon_error() {
    let ledger = MockLedger {
        paths: vec![path_record(vec![])],
        ..Default::default()
    };
    let (tasks, ledger) = tasks(ledger);
    let destination = identity().public_key;

    let rejections = vec![
        tasks.create_account(&destination).await.unwrap_err(),
        tasks.trustlines().await.unwrap_err(),
        tasks.offers().await.unwrap_err(),
        tasks.path_payment().await.unwrap_err(),
    ];

    for rejection in rejections {
        assert_eq!(rejection.kind, ErrorKind::Submission);
        assert_eq!(rejection.last_message(), Some(HORIZON_ERROR));
    }
    assert_eq!(ledger.submissions.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn handlers_sign_as_their_source_account() {
    let ledger = MockLedger {
        accept: true,
        paths: vec![path_record(vec![])],
        ..Default::default()
    };
    let (tasks, ledger) = tasks(ledger);
    let s = tasks.settings().clone();

    tasks.trustlines().await.unwrap();
    tasks.offers().await.unwrap();
    tasks.path_payment().await.unwrap();

    assert_eq!(
        ledger.loaded.lock().unwrap().as_slice(),
        &[s.receiver.public_key, s.issuer.public_key, s.sender.public_key]
    );
}

#[tokio::test]
async fn path_payment_without_paths_never_loads_or_submits() {
    let (tasks, ledger) = tasks(MockLedger::accepting());

    let rejection = tasks.path_payment().await.unwrap_err();

    assert_eq!(rejection.kind, ErrorKind::RemoteLookup);
    assert_eq!(rejection.message, vec![NO_PAYMENT_PATHS]);
    assert_eq!(ledger.path_queries.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.loads.load(Ordering::SeqCst), 0);
    assert_eq!(ledger.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn path_payment_uses_first_record() {
    let hop_issuer = identity().public_key;
    let first = path_record(vec![AssetRecord {
        asset_type: "credit_alphanum4".to_string(),
        asset_code: Some("USD".to_string()),
        asset_issuer: Some(hop_issuer),
    }]);
    let mut second = path_record(vec![]);
    second.source_amount = "0.1000000".to_string();

    let ledger = MockLedger {
        accept: true,
        paths: vec![first.clone(), second],
        ..Default::default()
    };
    let (tasks, ledger) = tasks(ledger);

    let envelope = tasks.path_payment().await.unwrap();

    assert_eq!(envelope.message, vec![SUBMITTED]);
    assert_eq!(envelope.data["pathUsed"], serde_json::to_value(&first).unwrap());
    assert_eq!(envelope.data["txResult"]["successful"], json!(true));

    let queries = ledger.queries.lock().unwrap();
    let s = tasks.settings();
    assert_eq!(queries[0].source, s.sender.public_key);
    assert_eq!(queries[0].destination, s.receiver.public_key);
    assert_eq!(queries[0].amount, "100");
    assert_eq!(queries[0].asset, s.asset());
}

#[tokio::test]
async fn path_payment_with_malformed_hop_is_a_fault() {
    let ledger = MockLedger {
        accept: true,
        paths: vec![path_record(vec![AssetRecord {
            asset_type: "credit_alphanum4".to_string(),
            asset_code: None,
            asset_issuer: None,
        }])],
        ..Default::default()
    };
    let (tasks, ledger) = tasks(ledger);

    let rejection = tasks.path_payment().await.unwrap_err();

    assert_eq!(rejection.kind, ErrorKind::Fault);
    assert_eq!(
        rejection.last_message(),
        Some("An error occured. Check logs")
    );
    assert_eq!(ledger.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_source_account_is_a_lookup_failure() {
    let ledger = MockLedger {
        accept: true,
        missing_accounts: true,
        ..Default::default()
    };
    let (tasks, ledger) = tasks(ledger);

    let rejection = tasks.offers().await.unwrap_err();

    assert_eq!(rejection.kind, ErrorKind::RemoteLookup);
    assert_eq!(rejection.last_message(), Some(ACCOUNT_LOOKUP_FAILED));
    assert_eq!(ledger.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generate_keypair_stays_local() {
    let (tasks, ledger) = tasks(MockLedger::accepting());

    let envelope = tasks.generate_keypair().await.unwrap();

    assert_eq!(envelope.message, vec![KEYPAIR_GENERATED]);
    let public = envelope.data["publicKey"].as_str().unwrap();
    let private = envelope.data["privateKey"].as_str().unwrap();
    assert!(validate_key(public));
    assert!(private.starts_with('S'));
    assert_ne!(public, tasks.generate_keypair().await.unwrap().data["publicKey"]);
    assert_eq!(ledger.remote_calls(), 0);
}

#[tokio::test]
async fn concurrent_calls_keep_their_own_messages() {
    let ledger = MockLedger {
        accept: true,
        submit_delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let (tasks, _ledger) = tasks(ledger);
    let first = identity().public_key;
    let second = identity().public_key;

    let (a, b, bad, trust) = tokio::join!(
        tasks.create_account(&first),
        tasks.create_account(&second),
        tasks.create_account("bogus"),
        tasks.trustlines(),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    let trust = trust.unwrap();
    assert_eq!(a.message, vec![SUBMITTED]);
    assert_eq!(b.message, vec![SUBMITTED]);
    assert_eq!(trust.message, vec![SUBMITTED]);
    assert_ne!(a.data, b.data);
    assert_ne!(a.data, trust.data);
    assert_eq!(bad.unwrap_err().message, vec![INVALID_PUBLIC_KEY]);
}

#[tokio::test]
async fn sequential_calls_do_not_accumulate_messages() {
    let (tasks, _ledger) = tasks(MockLedger::accepting());
    let destination = identity().public_key;

    tasks.create_account("bogus").await.unwrap_err();
    let envelope = tasks.create_account(&destination).await.unwrap();
    let again = tasks.create_account("bogus").await.unwrap_err();

    assert_eq!(envelope.message, vec![SUBMITTED]);
    assert_eq!(again.message, vec![INVALID_PUBLIC_KEY]);
}
