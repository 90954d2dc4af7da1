//! `osport env` command.

use std::io::Write;

use crate::context::ServiceContext;

/// Execute the `env` command.
///
/// # Errors
///
/// Returns an error string if the variable is unset or output fails.
pub fn run_with_context(ctx: &ServiceContext, key: &str, out: &mut dyn Write) -> Result<(), String> {
    let value = ctx.os.lookup_env(key).ok_or_else(|| format!("{key} is not set"))?;
    writeln!(out, "{value}").map_err(|e| format!("Failed to write output: {e}"))
}
