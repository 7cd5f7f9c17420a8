//! Replay the scripted scenarios in `test-vectors/query_state.json`.
//!
//! Each case is a list of steps run against a `Query<serde_json::Value>`
//! whose fetches are settled by hand. Snapshots are compared as JSON so the
//! vectors stay readable.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use parking_lot::Mutex;
use query_core::Query;
use serde_json::Value;
use tokio::sync::oneshot;

type Outcome = Result<Value, String>;

/// Invocation-ordered senders for fetches that have not been settled yet.
type Gates = Arc<Mutex<Vec<oneshot::Sender<Outcome>>>>;

fn gated_query() -> (Query<Value>, Gates) {
    let gates: Gates = Arc::new(Mutex::new(Vec::new()));
    let pushed = Arc::clone(&gates);
    let query = Query::new(move || {
        let (tx, rx) = oneshot::channel::<Outcome>();
        pushed.lock().push(tx);
        async move { rx.await.unwrap_or_else(|_| Err("gate dropped".to_string())) }
    });
    (query, gates)
}

async fn run_case(case: &Value) {
    let name = case["name"].as_str().unwrap();
    let (query, gates) = gated_query();
    let mut pending: Vec<BoxFuture<'static, ()>> = Vec::new();

    for (i, step) in case["steps"].as_array().unwrap().iter().enumerate() {
        let op = step["op"].as_str().unwrap();
        match op {
            "start" => pending.push(query.start().boxed()),
            "refetch" => pending.push(query.refetch().boxed()),
            "cancel" => query.cancel(),
            "resolve" | "reject" => {
                let index = step["index"].as_u64().unwrap_or(0) as usize;
                let outcome = if op == "resolve" {
                    Ok(step["value"].clone())
                } else {
                    Err(step["message"].as_str().unwrap().to_string())
                };
                let gate = gates.lock().remove(index);
                assert!(gate.send(outcome).is_ok(), "{name}: step {i}: fetch dropped");
                pending.remove(index).await;
            }
            "expect" => {
                let actual = serde_json::to_value(query.state()).unwrap();
                assert_eq!(actual, step["state"], "{name}: step {i}");
            }
            other => panic!("{name}: unknown op {other}"),
        }
    }
}

#[tokio::test]
async fn query_state_vectors() {
    let raw = include_str!("../../test-vectors/query_state.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let cases = vectors["cases"].as_array().unwrap();
    assert!(!cases.is_empty());
    for case in cases {
        run_case(case).await;
    }
}
