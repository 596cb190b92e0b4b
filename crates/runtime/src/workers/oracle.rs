//! Decryption oracle worker.
//!
//! Drains the decryption request queue and runs each request as its own task,
//! so a slow or silent oracle for one game never delays another. Answers are
//! delivered back to the registry worker as callback commands.
//!
//! Design principles:
//! - No ordering guarantee between games; only same-game idempotency matters
//! - Holds a weak command sender so it never keeps the registry alive
//! - Oracle failures are reported as events; the game stays resolving

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventBus, ResolutionEvent};
use crate::oracle::{DecryptionOracle, DecryptionRequest};
use crate::workers::Command;

/// Background worker carrying requests to a [`DecryptionOracle`].
pub struct OracleWorker {
    oracle: Arc<dyn DecryptionOracle>,
    request_rx: mpsc::Receiver<DecryptionRequest>,
    command_tx: mpsc::WeakSender<Command>,
    event_bus: EventBus,
    in_flight: JoinSet<()>,
}

impl OracleWorker {
    pub fn new(
        oracle: Arc<dyn DecryptionOracle>,
        request_rx: mpsc::Receiver<DecryptionRequest>,
        command_tx: mpsc::WeakSender<Command>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            oracle,
            request_rx,
            command_tx,
            event_bus,
            in_flight: JoinSet::new(),
        }
    }

    /// Main worker loop. Ends when the registry worker drops its request queue;
    /// requests still waiting on the oracle are then abandoned.
    pub async fn run(mut self) {
        info!("OracleWorker started");

        loop {
            tokio::select! {
                request = self.request_rx.recv() => match request {
                    Some(request) => self.dispatch(request),
                    None => break,
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    if let Err(e) = joined
                        && e.is_panic()
                    {
                        error!("Decryption task panicked: {}", e);
                    }
                }
            }
        }

        if !self.in_flight.is_empty() {
            warn!(
                "OracleWorker abandoning {} in-flight decryption(s)",
                self.in_flight.len()
            );
        }
        self.in_flight.shutdown().await;
        info!("OracleWorker stopped");
    }

    fn dispatch(&mut self, request: DecryptionRequest) {
        let oracle = Arc::clone(&self.oracle);
        let command_tx = self.command_tx.clone();
        let event_bus = self.event_bus.clone();

        debug!(
            "Dispatching {} for game {}",
            request.request_id, request.game_id
        );

        self.in_flight.spawn(async move {
            match oracle.decrypt(&request).await {
                Ok(selector) => {
                    let Some(command_tx) = command_tx.upgrade() else {
                        debug!("Registry worker gone; dropping answer for {}", request.request_id);
                        return;
                    };
                    let callback = Command::FulfillDecryption {
                        game_id: request.game_id,
                        request_id: Some(request.request_id),
                        selector,
                        reply: None,
                    };
                    if command_tx.send(callback).await.is_err() {
                        debug!("Registry worker gone; dropping answer for {}", request.request_id);
                    }
                }
                Err(e) => {
                    error!(
                        "Decryption of {} for game {} failed: {}",
                        request.request_id, request.game_id, e
                    );
                    event_bus.publish(Event::Resolution(ResolutionEvent::DecryptionFailed {
                        game_id: request.game_id,
                        request_id: request.request_id,
                        error: e.to_string(),
                    }));
                }
            }
        });
    }
}
