//! Calculator example: one peer exposes a nested math provider, the other
//! drives it remotely.
//!
//! This example demonstrates:
//! - `provider_object!` for building a nested provider tree
//! - `remote_call!` for the chained-path call spelling
//! - error returns crossing the wire as plain records
//!
//! The two peers live in one process, connected by the local channel pair;
//! every frame still passes through the JSON codec.
//!
//! ```bash
//! cargo run --example calculator
//! ```

use std::rc::Rc;

use farcall::{CallFault, Communicator, JsonCodec, LocalSocket, local, provider_object, remote_call};
use serde_json::{Value, json};
use tokio::task::LocalSet;

fn pump(comm: Rc<Communicator>, socket: LocalSocket<JsonCodec>) {
    tokio::task::spawn_local(async move {
        while let Some(invoke) = socket.recv().await {
            let comm = Rc::clone(&comm);
            tokio::task::spawn_local(async move { comm.reply_data(invoke).await });
        }
    });
}

fn number(args: &[Value], index: usize) -> Result<i64, CallFault> {
    args.get(index)
        .and_then(Value::as_i64)
        .ok_or_else(|| CallFault::error(format!("argument {index} must be a number")))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    LocalSet::new()
        .run_until(async {
            let (near, far) = local::pair(JsonCodec);

            // ================================================================
            // Server peer: exposes the calculator
            // ================================================================
            let server = Communicator::new(far.clone());
            server.set_provider(Some(provider_object! {
                math: {
                    add: |args: Vec<Value>| async move {
                        Ok(json!(number(&args, 0)? + number(&args, 1)?))
                    },
                    sub: |args: Vec<Value>| async move {
                        Ok(json!(number(&args, 0)? - number(&args, 1)?))
                    },
                    mul: |args: Vec<Value>| async move {
                        Ok(json!(number(&args, 0)? * number(&args, 1)?))
                    },
                    div: |args: Vec<Value>| async move {
                        let divisor = number(&args, 1)?;
                        if divisor == 0 {
                            return Err(CallFault::error("division by zero"));
                        }
                        Ok(json!(number(&args, 0)? / divisor))
                    },
                },
            }));
            pump(Rc::clone(&server), far);

            // ================================================================
            // Client peer: drives it
            // ================================================================
            let client = Communicator::new(near.clone());
            pump(Rc::clone(&client), near);
            let driver = client.driver();

            println!("2 + 3 = {}", remote_call!(driver => math.add(2, 3)).await?);
            println!("7 - 4 = {}", remote_call!(driver => math.sub(7, 4)).await?);
            println!("6 * 7 = {}", remote_call!(driver => math.mul(6, 7)).await?);
            println!("9 / 3 = {}", remote_call!(driver => math.div(9, 3)).await?);

            match remote_call!(driver => math.div(1, 0)).await {
                Ok(value) => println!("1 / 0 = {value} (unexpected)"),
                Err(error) => println!("1 / 0 -> rejected: {error}"),
            }

            client.close(None);
            Ok(())
        })
        .await
}
