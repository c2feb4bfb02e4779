//! Command output: human text on stdout, or a JSON envelope for agents.

use colored::Colorize;
use serde::Serialize;
use serde_json::json;

/// Prints a success payload, as text or as a `{ok, command, data}` envelope.
pub fn emit<T: Serialize>(json_mode: bool, command: &str, data: &T, text: impl FnOnce() -> String) {
	if json_mode {
		let envelope = json!({ "ok": true, "command": command, "data": data });
		println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
	} else {
		println!("{}", text());
	}
}

/// Prints an error to stderr for humans and, in JSON mode, an `ok=false`
/// envelope to stdout for agents.
pub fn emit_error(json_mode: bool, code: &str, message: &str) {
	eprintln!("{} {message}", "error:".red().bold());
	if json_mode {
		let envelope = json!({ "ok": false, "error": { "code": code, "message": message } });
		println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());
	}
}
