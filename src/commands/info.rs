//! `osport info` command.

use std::io::Write;

use crate::context::ServiceContext;

/// Execute the `info` command.
///
/// Prints one `key: value` line each for the host name, process id, working
/// directory and executable path.
///
/// # Errors
///
/// Returns an error string if any query or the output fails.
pub fn run_with_context(ctx: &ServiceContext, out: &mut dyn Write) -> Result<(), String> {
    let os = ctx.os.as_ref();
    let hostname = os.hostname().map_err(|e| format!("Failed to get host name: {e}"))?;
    let pid = os.getpid();
    let cwd = os.getwd().map_err(|e| format!("Failed to get working directory: {e}"))?;
    let exe = os.executable().map_err(|e| format!("Failed to get executable path: {e}"))?;

    let write = |out: &mut dyn Write| -> std::io::Result<()> {
        writeln!(out, "hostname: {hostname}")?;
        writeln!(out, "pid: {pid}")?;
        writeln!(out, "cwd: {}", cwd.display())?;
        writeln!(out, "executable: {}", exe.display())
    };
    write(out).map_err(|e| format!("Failed to write output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::ReplayingOs;
    use crate::cassette::format::Interaction;
    use crate::cassette::replayer::CassetteReplayer;
    use serde_json::json;

    fn ctx(calls: Vec<(&str, serde_json::Value)>) -> ServiceContext {
        let os = CassetteReplayer::from_interactions(calls.into_iter().enumerate().map(
            |(seq, (method, output))| Interaction {
                seq: seq as u64,
                port: "os".into(),
                method: method.into(),
                input: json!({}),
                output,
            },
        ));
        let file = CassetteReplayer::from_interactions(Vec::new());
        ServiceContext::with_os(Box::new(ReplayingOs::new(os, file)))
    }

    #[test]
    fn prints_replayed_process_info() {
        let ctx = ctx(vec![
            ("hostname", json!({"ok": "box"})),
            ("getpid", json!(12)),
            ("getwd", json!({"ok": "/srv"})),
            ("executable", json!({"ok": "/usr/bin/osport"})),
        ]);
        let mut out = Vec::new();
        run_with_context(&ctx, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "hostname: box\npid: 12\ncwd: /srv\nexecutable: /usr/bin/osport\n"
        );
    }

    #[test]
    fn hostname_failure_is_reported() {
        let ctx = ctx(vec![("hostname", json!({"err": "no uts namespace"}))]);
        let err = run_with_context(&ctx, &mut Vec::new()).unwrap_err();
        assert_eq!(err, "Failed to get host name: no uts namespace");
    }
}
