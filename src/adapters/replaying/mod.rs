//! Replaying adapters that serve recorded interactions.

pub mod file;
pub mod os;

pub use file::ReplayingFile;
pub use os::ReplayingOs;

use std::io;
use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::format::Interaction;
use crate::cassette::replayer::CassetteReplayer;

/// Take the output of the next interaction for `port::method`, checking the
/// call's `input` against the recorded one.
///
/// # Panics
///
/// Panics if the cassette has no interaction left for the call, or if the
/// call's arguments differ from the recorded ones.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
    input: &serde_json::Value,
) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    let interaction = replayer.next_interaction(port, method);
    check_input(interaction, input);
    interaction.output.clone()
}

/// Every field present in the recorded input must equal the same field of
/// `actual`. A `null` or `{}` recorded input matches any call.
fn check_input(interaction: &Interaction, actual: &serde_json::Value) {
    let Some(expected) = interaction.input.as_object() else {
        return;
    };
    for (field, want) in expected {
        let got = actual.get(field).unwrap_or(&serde_json::Value::Null);
        assert!(
            got == want,
            "Cassette mismatch: {port}::{method}#{seq} was recorded with {field}={want} \
             but called with {field}={got}",
            port = interaction.port,
            method = interaction.method,
            seq = interaction.seq,
        );
    }
}

/// Extracts a Result from a cassette output JSON value.
///
/// Expects `{"ok": <value>}` or `{"err": "message"}`; a bare value is read as
/// success.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> io::Result<T> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(io::Error::other(msg));
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone()).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("{context}: failed to deserialize: {e}"))
    })
}

/// Like `replay_result` for calls that return nothing on success.
pub(crate) fn replay_unit(output: &serde_json::Value) -> io::Result<()> {
    match output.get("err") {
        Some(err) => Err(io::Error::other(err.as_str().unwrap_or("unknown error").to_string())),
        None => Ok(()),
    }
}
