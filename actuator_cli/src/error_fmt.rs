//! Human-readable error descriptions and structured JSON error formatting.

use actuator_core::error::{AbortReason, ActuatorError, BuildError};

/// Exit code for configuration and usage errors (clap uses the same).
pub const EXIT_CONFIG: i32 = 2;

pub fn abort_reason_name(r: AbortReason) -> &'static str {
    match r {
        AbortReason::Shutdown => "Shutdown",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScene => {
                "What happened: The motor was built without a scene handle.\nLikely causes: The host did not pass with_scene(...) to the builder.\nHow to fix: Provide the scene lifecycle before building.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid motor configuration ({msg}).\nLikely causes: Out-of-range values in [drive], [travel] or [[sensors]].\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(ae) = err.downcast_ref::<ActuatorError>() {
        return match ae {
            ActuatorError::PartNotConfigured(name) => format!(
                "What happened: Part `{name}` is not attached to an assembly.\nLikely causes: The part was removed or never placed in the scene.\nHow to fix: Attach the part before adding it to the motor."
            ),
            ActuatorError::Script(msg) => format!(
                "What happened: The script could not be used ({msg}).\nLikely causes: Wrong header, unknown action, missing on/off argument or unsorted timestamps.\nHow to fix: Use the header 'time_ms,action,arg' and keep rows in time order."
            ),
            ActuatorError::Aborted(AbortReason::Shutdown) => {
                "What happened: The run was interrupted.\nLikely causes: Ctrl-C or a termination signal.\nHow to fix: Rerun the simulation; the motor was stopped immediately.".to_string()
            }
            ActuatorError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // Config loading errors arrive as plain reports
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.contains("must be") || lower.contains("parse config") || lower.contains("read config")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 script, 4 build, 5 aborted, 1 anything else.
/// Config errors are reported before any run and exit with `EXIT_CONFIG`.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 4;
    }
    match err.downcast_ref::<ActuatorError>() {
        Some(ActuatorError::Script(_)) => 3,
        Some(ActuatorError::PartNotConfigured(_)) => 4,
        Some(ActuatorError::Aborted(_)) => 5,
        Some(ActuatorError::State(_)) | None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if let Some(ActuatorError::Aborted(r)) = err.downcast_ref::<ActuatorError>() {
        abort_reason_name(*r)
    } else if err.downcast_ref::<BuildError>().is_some() {
        "BuildError"
    } else if let Some(ActuatorError::Script(_)) = err.downcast_ref::<ActuatorError>() {
        "ScriptError"
    } else {
        "Error"
    };
    let abort_reason = match err.downcast_ref::<ActuatorError>() {
        Some(ActuatorError::Aborted(r)) => json!(abort_reason_name(*r)),
        _ => json!(null),
    };
    json!({
        "reason": reason,
        "abort_reason": abort_reason,
        "message": humanize(err),
    })
    .to_string()
}
