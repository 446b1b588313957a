//! Ping-pong example: both peers expose a provider and call each other.
//!
//! There is no client or server at the communicator layer - the peer
//! relationship is symmetric. Here each side exposes one function and
//! drives the other side's, over a single shared channel.
//!
//! ```bash
//! cargo run --example ping_pong
//! ```

use std::rc::Rc;

use farcall::{Communicator, JsonCodec, LocalSocket, local, provider_object};
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

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    LocalSet::new()
        .run_until(async {
            let (left_socket, right_socket) = local::pair(JsonCodec);

            let left = Communicator::new(left_socket.clone());
            left.set_provider(Some(provider_object! {
                ping: |args: Vec<Value>| async move {
                    let n = args[0].as_i64().unwrap_or(0);
                    println!("left : ping({n})");
                    Ok(json!(n + 1))
                },
            }));

            let right = Communicator::new(right_socket.clone());
            right.set_provider(Some(provider_object! {
                pong: |args: Vec<Value>| async move {
                    let n = args[0].as_i64().unwrap_or(0);
                    println!("right: pong({n})");
                    Ok(json!(n + 1))
                },
            }));

            pump(Rc::clone(&left), left_socket);
            pump(Rc::clone(&right), right_socket);

            // Left drives right's `pong`, right drives left's `ping`, over
            // the same channel at the same time.
            let mut n = json!(0);
            for _ in 0..3 {
                n = left.driver().path("pong").call(vec![n]).await?;
                n = right.driver().path("ping").call(vec![n]).await?;
            }
            println!("final count: {n}");

            left.close(None);
            Ok(())
        })
        .await
}
