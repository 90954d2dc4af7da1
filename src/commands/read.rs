//! `osport read` command.

use std::io::Write;

use crate::context::ServiceContext;
use crate::reader::ContentReader;

/// Execute the `read` command, writing the file's bytes to `out`.
///
/// # Errors
///
/// Returns an error string if the content cannot be read or written out.
pub fn run_with_context(
    ctx: &ServiceContext,
    name: &str,
    min_size: u64,
    out: &mut dyn Write,
) -> Result<(), String> {
    let content = ContentReader::new(ctx.os.as_ref())
        .with_min_size(min_size)
        .read(name)
        .map_err(|e| format!("Failed to read {name:?}: {e}"))?;
    tracing::info!(name, bytes = content.len(), "read content");
    out.write_all(&content).and_then(|()| out.flush()).map_err(|e| format!("Failed to write output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::ReplayingOs;
    use crate::cassette::format::Interaction;
    use crate::cassette::replayer::CassetteReplayer;
    use serde_json::json;

    fn replay(port: &str, calls: Vec<(&str, serde_json::Value)>) -> CassetteReplayer {
        CassetteReplayer::from_interactions(calls.into_iter().enumerate().map(
            |(seq, (method, output))| Interaction {
                seq: seq as u64,
                port: port.into(),
                method: method.into(),
                input: json!({}),
                output,
            },
        ))
    }

    #[test]
    fn writes_content_to_output() {
        let os = replay(
            "os",
            vec![
                ("stat", json!({"ok": {"name": "a", "size": 4, "mode": 420, "is_dir": false}})),
                ("open", json!({"ok": "a"})),
            ],
        );
        let file = replay("file", vec![("read", json!({"ok": {"data": "abcd"}})), ("close", json!({"ok": null}))]);
        let ctx = ServiceContext::with_os(Box::new(ReplayingOs::new(os, file)));

        let mut out = Vec::new();
        run_with_context(&ctx, "a", 4, &mut out).unwrap();
        assert_eq!(out, b"abcd");
    }

    #[test]
    fn reports_reader_failure_with_name() {
        let ctx = ServiceContext::with_os(Box::new(ReplayingOs::new(
            replay("os", vec![]),
            replay("file", vec![]),
        )));
        let mut out = Vec::new();
        let err = run_with_context(&ctx, "", 10, &mut out).unwrap_err();
        assert_eq!(err, "Failed to read \"\": no name");
        assert!(out.is_empty());
    }
}
