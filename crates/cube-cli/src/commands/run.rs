//! `cube run` — submit a task specification to the manager.

use std::path::Path;

use anyhow::{Context, bail};
use bytes::Bytes;
use http::StatusCode;
use tracing::{debug, info};

use crate::client;

/// POST the raw bytes of `filename` to the manager's `/tasks` endpoint.
///
/// The file is sent as-is; the manager validates it. Anything other than
/// `201 Created` is an error.
pub async fn submit(manager: &str, filename: &Path) -> anyhow::Result<()> {
    let full_path = std::path::absolute(filename)
        .with_context(|| format!("resolving {}", filename.display()))?;
    if !full_path.exists() {
        bail!("file {} does not exist", filename.display());
    }

    info!(%manager, file = %full_path.display(), "submitting task");
    let data = std::fs::read(&full_path)
        .with_context(|| format!("unable to read file {}", full_path.display()))?;
    debug!(data = %String::from_utf8_lossy(&data), "task specification");

    let resp = client::post_json(manager, "/tasks", Bytes::from(data)).await?;
    if resp.status != StatusCode::CREATED {
        bail!(
            "manager rejected task with {}: {}",
            resp.status,
            String::from_utf8_lossy(&resp.body)
        );
    }

    info!("successfully sent task request to manager");
    Ok(())
}
