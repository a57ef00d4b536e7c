//! Event commands: run a request against the snapshot-backed service.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use eventscheduler_core::ConflictPolicy;
use eventscheduler_server::{
    EventService, Request, RequestHandler, Response, SchedulerConfig, snapshot,
};

use crate::error::{CliError, CliResult};

/// Loads the snapshot at `store_path` and builds a service over it.
pub fn open_service(
    config: &SchedulerConfig,
    policy: ConflictPolicy,
    store_path: &Path,
) -> CliResult<EventService> {
    let store = snapshot::load(store_path)?;
    debug!(path = %store_path.display(), events = store.len(), ?policy, "Opened event store");
    Ok(EventService::from_config(Arc::new(RwLock::new(store)), config).with_policy(policy))
}

/// Handles `request` and prints the response as pretty JSON.
///
/// Mutations are saved back to `store_path` before anything is printed. A
/// rejected request writes nothing and returns [`CliError::Rejected`].
pub async fn execute<W: Write>(
    service: EventService,
    request: &Request,
    mutation: bool,
    store_path: &Path,
    out: &mut W,
) -> CliResult<()> {
    let handler = RequestHandler::new(service);
    let response = handler.handle(request).await;
    if let Response::Error { error } = response {
        return Err(CliError::Rejected(error));
    }

    if mutation {
        let store = handler.service().store().read().await;
        snapshot::save(&store, store_path)?;
    }

    serde_json::to_writer_pretty(&mut *out, &response)?;
    writeln!(out)?;
    Ok(())
}
