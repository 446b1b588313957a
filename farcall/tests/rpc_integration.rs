//! End-to-end tests: two communicators over the in-process channel.
//!
//! Every frame crosses the JSON codec boundary, so these tests exercise the
//! full flow a network transport would see:
//! - outbound calls through the driver and `remote_call!`
//! - dispatch against a nested provider with access filtering
//! - error returns, teardown, and late-reply handling

use std::rc::Rc;

use farcall::{
    CallError, CallFault, Communicator, ErrorRecord, Invoke, InvokeReturn, JsonCodec, LocalSocket,
    ProviderObject, local, provider_object, remote_call,
};
use serde_json::{Value, json};
use tokio::task::LocalSet;

/// Feed a socket's inbound frames into a communicator, one task per frame
/// so a slow dispatch never stalls the channel.
fn pump(comm: Rc<Communicator>, socket: LocalSocket<JsonCodec>) {
    tokio::task::spawn_local(async move {
        while let Some(invoke) = socket.recv().await {
            let comm = Rc::clone(&comm);
            tokio::task::spawn_local(async move { comm.reply_data(invoke).await });
        }
    });
}

fn test_provider() -> ProviderObject {
    provider_object! {
        echo: |mut args: Vec<Value>| async move { Ok(args.pop().unwrap_or(Value::Null)) },
        boom: |_args| async move {
            Err(CallFault::Error(ErrorRecord::error("nope")))
        },
        raw: |_args| async move { Err(CallFault::Value(json!("thrown string"))) },
        slow: |_args| async move {
            std::future::pending::<()>().await;
            Ok(Value::Null)
        },
        _secret: |_args| async move { Ok(json!(1)) },
        math: {
            add: |args: Vec<Value>| async move {
                let a = args[0].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
                let b = args[1].as_i64().ok_or_else(|| CallFault::error("not a number"))?;
                Ok(json!(a + b))
            },
        },
    }
}

/// Two pumped communicators; the second one carries [`test_provider`].
fn connected_pair() -> (Rc<Communicator>, Rc<Communicator>) {
    let (near, far) = local::pair(JsonCodec);
    let caller = Communicator::new(near.clone());
    let callee = Communicator::new(far.clone());
    callee.set_provider(Some(test_provider()));
    pump(Rc::clone(&caller), near);
    pump(Rc::clone(&callee), far);
    (caller, callee)
}

#[tokio::test]
async fn test_echo_round_trip() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let result = caller.driver().path("echo").call(vec![json!(42)]).await;
            assert_eq!(result, Ok(json!(42)));
        })
        .await;
}

#[tokio::test]
async fn test_nested_path_via_remote_call() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let driver = caller.driver();
            let sum = remote_call!(driver => math.add(2, 3)).await;
            assert_eq!(sum, Ok(json!(5)));
        })
        .await;
}

#[tokio::test]
async fn test_remote_exception_surfaces_verbatim() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let driver = caller.driver();
            match remote_call!(driver => boom()).await {
                Err(CallError::Remote(value)) => {
                    assert_eq!(value["name"], json!("Error"));
                    assert_eq!(value["message"], json!("nope"));
                }
                other => panic!("expected Remote, got {other:?}"),
            }
        })
        .await;
}

#[tokio::test]
async fn test_non_error_fault_passes_through() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            match caller.driver().path("raw").call(vec![]).await {
                Err(CallError::Remote(value)) => assert_eq!(value, json!("thrown string")),
                other => panic!("expected Remote, got {other:?}"),
            }
        })
        .await;
}

#[tokio::test]
async fn test_private_member_never_reaches_the_provider() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            match caller.driver().path("_secret").call(vec![]).await {
                Err(CallError::Remote(value)) => {
                    let message = value["message"].as_str().unwrap_or("");
                    assert!(message.contains("\"_secret\""), "message was: {message}");
                }
                other => panic!("expected Remote, got {other:?}"),
            }
        })
        .await;
}

#[tokio::test]
async fn test_disconnect_rejects_pending_and_wakes_join() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let driver = caller.driver();

            let slow_call = driver.path("slow");
            let (call_result, join_result, ()) = tokio::join!(
                slow_call.call(vec![]),
                caller.join(),
                async {
                    // Give the call time to get onto the wire first.
                    tokio::task::yield_now().await;
                    tokio::task::yield_now().await;
                    caller.close(Some(ErrorRecord::error("bye")));
                }
            );

            match call_result {
                Err(CallError::Disconnected(record)) => assert_eq!(record.message, "bye"),
                other => panic!("expected Disconnected, got {other:?}"),
            }
            assert_eq!(join_result, Ok(()));

            // No further outbound call is accepted.
            let after = caller.driver().path("echo").call(vec![json!(1)]).await;
            assert!(matches!(after, Err(CallError::Disconnected(_))));
        })
        .await;
}

#[tokio::test]
async fn test_concurrent_calls_settle_independently() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let driver = caller.driver();

            let first_call = driver.path("echo");
            let second_call = driver.path("math.add");
            let third_call = driver.path("echo");
            let (first, second, third) = tokio::join!(
                first_call.call(vec![json!("first")]),
                second_call.call(vec![json!(10), json!(20)]),
                third_call.call(vec![json!([1, 2, 3])]),
            );
            assert_eq!(first, Ok(json!("first")));
            assert_eq!(second, Ok(json!(30)));
            assert_eq!(third, Ok(json!([1, 2, 3])));
            assert_eq!(caller.pending_count(), 0);
        })
        .await;
}

#[tokio::test]
async fn test_missing_provider_diagnostics_are_distinct() {
    LocalSet::new()
        .run_until(async {
            // The roles are symmetric: here the provider-less peer is called.
            let (caller, callee) = connected_pair();
            let driver = callee.driver();

            match driver.path("echo").call(vec![]).await {
                Err(CallError::Remote(value)) => {
                    assert_eq!(value["message"], json!("the provider is not specified yet."));
                }
                other => panic!("expected Remote, got {other:?}"),
            }

            caller.set_provider(None);
            match driver.path("echo").call(vec![]).await {
                Err(CallError::Remote(value)) => {
                    assert_eq!(value["message"], json!("the provider would not be provided."));
                }
                other => panic!("expected Remote, got {other:?}"),
            }
        })
        .await;
}

#[tokio::test]
async fn test_typed_invoke_decodes_and_reports_mismatch() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();
            let add = caller.driver().path("math").member("add");

            let sum: i64 = add.invoke(vec![json!(4), json!(5)]).await.expect("sum");
            assert_eq!(sum, 9);

            let mismatch = add.invoke::<String>(vec![json!(4), json!(5)]).await;
            assert!(matches!(mismatch, Err(CallError::Decode { .. })));
        })
        .await;
}

#[tokio::test]
async fn test_unmatched_return_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let (caller, _callee) = connected_pair();

            // A stray return frame with an unknown uid arrives over the wire.
            caller
                .reply_data(Invoke::Return(InvokeReturn {
                    uid: u64::MAX,
                    success: true,
                    value: json!("stray"),
                }))
                .await;

            // The session keeps working.
            let result = caller.driver().path("echo").call(vec![json!("ok")]).await;
            assert_eq!(result, Ok(json!("ok")));
        })
        .await;
}

#[tokio::test]
async fn test_provider_reinstallation_mid_session() {
    LocalSet::new()
        .run_until(async {
            let (caller, callee) = connected_pair();
            let driver = caller.driver();

            assert_eq!(driver.path("echo").call(vec![json!(1)]).await, Ok(json!(1)));

            callee.set_provider(Some(ProviderObject::new().function(
                "echo",
                |_args| async move { Ok(json!("replaced")) },
            )));
            assert_eq!(
                driver.path("echo").call(vec![json!(1)]).await,
                Ok(json!("replaced"))
            );
        })
        .await;
}
