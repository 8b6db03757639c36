//! `cube node` — tabulate the manager's nodes.

use anyhow::{Context, bail};
use cube_core::Node;

use crate::client;

const HEADERS: [&str; 5] = ["NAME", "MEMORY (MiB)", "DISK (GiB)", "ROLE", "TASKS"];
/// Spaces between columns.
const PADDING: usize = 5;

pub async fn list(manager: &str) -> anyhow::Result<()> {
    let resp = client::get(manager, "/nodes").await?;
    if !resp.status.is_success() {
        bail!("manager at {manager} returned {} for /nodes", resp.status);
    }
    let nodes: Vec<Node> =
        serde_json::from_slice(&resp.body).context("decoding node list from manager")?;
    print!("{}", render_table(&nodes));
    Ok(())
}

/// Render nodes as a left-aligned table.
///
/// Memory is reported divided by 1000 and disk by 10^9, matching the units
/// the workers report in.
pub fn render_table(nodes: &[Node]) -> String {
    let rows: Vec<[String; 5]> = nodes
        .iter()
        .map(|node| {
            [
                node.name.clone(),
                (node.memory / 1000).to_string(),
                (node.disk / 1_000_000_000).to_string(),
                node.role.to_string(),
                node.task_count.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = HEADERS.map(String::from);
    for row in std::iter::once(&header).chain(&rows) {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(widths) {
            line.push_str(&format!("{cell:<w$}", w = width + PADDING));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
