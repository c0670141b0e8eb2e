//! Broadcast fan-out demo: two independent waiters each receive every
//! published event.
//!
//! Run with: `cargo run --example fanout`

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use ferro_bus::{BusConfig, Notifier};
use ferro_model::Element;
use ferro_store::MemoryStore;

#[derive(Debug, Serialize, Deserialize)]
struct MachineReady {
    machine_id: String,
}

impl Element for MachineReady {
    const KIND: &'static str = "machine-ready";
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let notifier = Notifier::new(
        Arc::new(MemoryStore::new()),
        "fleet",
        BusConfig::default(),
    );
    let token = CancellationToken::new();

    let mut scheduler = notifier.wait::<MachineReady>(token.clone()).await?;
    let mut dashboard = notifier.wait::<MachineReady>(token.clone()).await?;

    for i in 0..5 {
        notifier
            .notify(&MachineReady {
                machine_id: format!("m-{i}"),
            })
            .await?;
    }

    for _ in 0..5 {
        let a = scheduler.recv().await.expect("delivered");
        let b = dashboard.recv().await.expect("delivered");
        println!("scheduler saw {}, dashboard saw {}", a.machine_id, b.machine_id);
    }

    token.cancel();
    Ok(())
}
