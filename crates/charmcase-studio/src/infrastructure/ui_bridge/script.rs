//! Headless command runner.
//!
//! Reads one JSON command per line, dispatches it to the matching bridge
//! command, and writes one JSON [`CommandResult`] per line:
//!
//! ```text
//! {"type":"SelectPhone","phone_id":"iphone-13-pro"}
//! {"type":"DropCharm","charm_id":"charm-1","x":150,"y":300}
//! {"type":"GetSession"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.  A line that does not
//! parse produces an error result and the runner carries on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::{
    clear_charms, clear_phone, drop_charm, get_catalog, get_session, order_summary, pointer_event,
    remove_charm, select_color, select_phone, set_preview_geometry, AppState, CommandResult,
};
use crate::application::customize_case::{PointerEvent, PreviewGeometry};

/// One command from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiCommand {
    GetCatalog,
    SelectPhone { phone_id: String },
    ClearPhone,
    SelectColor { color_id: String },
    DropCharm { charm_id: String, x: f64, y: f64 },
    PointerEvent { event: PointerEvent },
    RemoveCharm { placement_id: String },
    ClearCharms,
    GetSession,
    OrderSummary,
    SetPreviewGeometry { geometry: PreviewGeometry },
}

/// Counters reported once a script has run to completion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptStats {
    /// Lines that produced a response.
    pub commands: usize,
    /// Responses with `success = false`.
    pub failures: usize,
}

fn to_json<T: Serialize>(result: CommandResult<T>) -> Value {
    serde_json::to_value(&result).unwrap_or_else(|e| {
        json!({
            "success": false,
            "data": null,
            "error": format!("failed to encode response: {e}"),
        })
    })
}

/// Runs one command and returns its JSON response.
pub async fn dispatch(state: Arc<AppState>, command: UiCommand) -> Value {
    match command {
        UiCommand::GetCatalog => to_json(get_catalog(state).await),
        UiCommand::SelectPhone { phone_id } => to_json(select_phone(state, phone_id).await),
        UiCommand::ClearPhone => to_json(clear_phone(state).await),
        UiCommand::SelectColor { color_id } => to_json(select_color(state, color_id).await),
        UiCommand::DropCharm { charm_id, x, y } => to_json(drop_charm(state, charm_id, x, y).await),
        UiCommand::PointerEvent { event } => to_json(pointer_event(state, event).await),
        UiCommand::RemoveCharm { placement_id } => to_json(remove_charm(state, placement_id).await),
        UiCommand::ClearCharms => to_json(clear_charms(state).await),
        UiCommand::GetSession => to_json(get_session(state).await),
        UiCommand::OrderSummary => to_json(order_summary(state).await),
        UiCommand::SetPreviewGeometry { geometry } => to_json(set_preview_geometry(state, geometry).await),
    }
}

/// Runs every command in `reader`, writing responses to `writer`.
///
/// # Errors
///
/// Only I/O errors on `reader` or `writer` abort the run.
pub async fn run_script<R, W>(state: Arc<AppState>, reader: R, mut writer: W) -> std::io::Result<ScriptStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = ScriptStats::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let response = match serde_json::from_str::<UiCommand>(trimmed) {
            Ok(command) => {
                debug!(line = line_no, ?command, "dispatching command");
                dispatch(Arc::clone(&state), command).await
            }
            Err(e) => {
                warn!(line = line_no, error = %e, "invalid command");
                to_json(CommandResult::<()>::err(format!("line {line_no}: invalid command: {e}")))
            }
        };

        stats.commands += 1;
        if response.get("success") != Some(&Value::Bool(true)) {
            stats.failures += 1;
        }

        let mut out = response.to_string();
        out.push('\n');
        writer.write_all(out.as_bytes()).await?;
    }

    writer.flush().await?;
    Ok(stats)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
