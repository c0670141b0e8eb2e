use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ferro_bus::Queue;
use ferro_model::BmcCommand;

use crate::{Handler, HandlerError};

/// Routes a BMC command to the hardware agent responsible for the target
/// machine.
///
/// Delivery goes over the point-to-point queue keyed by the machine ID, so
/// exactly one agent picks the command up. Redelivery pushes the same
/// command under the same command ID; agents deduplicate on it.
pub struct BmcCommandHandler {
    queue: Arc<Queue>,
}

impl BmcCommandHandler {
    pub fn new(queue: Arc<Queue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl Handler<BmcCommand> for BmcCommandHandler {
    async fn handle(&self, _token: CancellationToken, task: BmcCommand) -> Result<(), HandlerError> {
        debug!(
            machine = %task.machine_id,
            command = task.command.as_str(),
            command_id = %task.command_id,
            "forwarding bmc command"
        );
        self.queue
            .push(&task.machine_id, &task)
            .await
            .map_err(|e| HandlerError::Fail(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use ferro_bus::BusConfig;
    use ferro_model::BmcOp;
    use ferro_store::MemoryStore;

    #[tokio::test]
    async fn command_reaches_the_machine_queue() {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(Queue::new(
            store.clone(),
            BusConfig {
                poll_timeout: Duration::from_millis(25),
                ..BusConfig::default()
            },
        ));
        let handler = BmcCommandHandler::new(queue.clone());
        let token = CancellationToken::new();

        let mut agent = queue.wait::<BmcCommand>("m-42", token.clone());

        let command = BmcCommand {
            machine_id: "m-42".to_string(),
            partition: "fra-equ01".to_string(),
            command: BmcOp::PowerOn,
            issued_at: SystemTime::now(),
            command_id: "c-1".to_string(),
        };
        handler
            .handle(CancellationToken::new(), command.clone())
            .await
            .unwrap();

        let received = agent.recv().await.expect("command delivered");
        assert_eq!(received.command_id, "c-1");
        assert_eq!(received.command, BmcOp::PowerOn);
        token.cancel();
    }
}
