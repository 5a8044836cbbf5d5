//! Built-in demonstration actions, registered under module `builtin`.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::info;
use vcb_core::ActionParams;

use crate::catalog::HandlerCatalog;
use crate::errors::HandlerError;
use crate::handler::HandlerResult;

/// Module name the built-ins are registered under.
pub const MODULE: &str = "builtin";

/// Register every built-in action.
pub fn register(catalog: &mut HandlerCatalog) {
    catalog.register_fn(MODULE, "greet_user_action", greet_user_action);
    catalog.register_fn(MODULE, "log_current_time_action", log_current_time_action);
    catalog.register_async(MODULE, "example_async_action", |params| async move {
        example_async_action(params).await
    });
    catalog.register_fn(MODULE, "another_action", another_action);
}

/// Greet `name` (default `"User"`).
pub fn greet_user_action(params: ActionParams) -> HandlerResult {
    let name = match params.get("name") {
        None | Some(Value::Null) => "User",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(HandlerError::invalid_param("name", "expected a string")),
    };
    info!(name, "greeting user");
    Ok(json!({
        "status": "success",
        "message": format!("Hello, {name}! This greeting action was successfully triggered."),
    }))
}

/// Report the current server time.
pub fn log_current_time_action(_params: ActionParams) -> HandlerResult {
    let now = chrono::Local::now().to_rfc3339();
    info!(time = %now, "current server time");
    Ok(json!({
        "status": "success",
        "timestamp": now,
        "message": format!("Current server time: {now}"),
    }))
}

/// Sleep for `duration` seconds (default 1), then report completion.
pub async fn example_async_action(params: ActionParams) -> HandlerResult {
    let duration = match params.get("duration") {
        None | Some(Value::Null) => json!(1),
        Some(v @ Value::Number(n)) if n.as_f64().is_some_and(|d| d >= 0.0) => v.clone(),
        Some(_) => {
            return Err(HandlerError::invalid_param(
                "duration",
                "expected a non-negative number of seconds",
            ));
        }
    };
    let secs = duration.as_f64().unwrap_or(1.0);
    let sleep_for = Duration::try_from_secs_f64(secs)
        .map_err(|e| HandlerError::invalid_param("duration", e.to_string()))?;

    info!(duration_secs = secs, "starting async action");
    tokio::time::sleep(sleep_for).await;
    info!(duration_secs = secs, "async action completed");

    Ok(json!({
        "status": "success",
        "message": format!("Async action completed after {duration}s."),
        "duration": duration,
    }))
}

/// A placeholder action.
pub fn another_action(_params: ActionParams) -> HandlerResult {
    info!("executing another_action");
    Ok(json!({
        "status": "success",
        "message": "The 'another_action' was performed successfully!",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(v: Value) -> ActionParams {
        match v {
            Value::Object(m) => m,
            _ => ActionParams::new(),
        }
    }

    #[test]
    fn greet_default_name() {
        let out = greet_user_action(ActionParams::new()).unwrap();
        assert_eq!(
            out["message"],
            "Hello, User! This greeting action was successfully triggered."
        );
        assert_eq!(out["status"], "success");
    }

    #[test]
    fn greet_custom_name() {
        let out = greet_user_action(params(json!({"name": "Ada"}))).unwrap();
        assert!(out["message"].as_str().unwrap().starts_with("Hello, Ada!"));
    }

    #[test]
    fn greet_rejects_non_string_name() {
        let err = greet_user_action(params(json!({"name": 5}))).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidParam { ref name, .. } if name == "name"));
    }

    #[test]
    fn time_action_reports_timestamp() {
        let out = log_current_time_action(ActionParams::new()).unwrap();
        let ts = out["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(out["message"].as_str().unwrap().ends_with(ts));
    }

    #[tokio::test(start_paused = true)]
    async fn async_action_sleeps_for_duration() {
        let start = tokio::time::Instant::now();
        let out = example_async_action(params(json!({"duration": 3}))).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(out["duration"], 3);
        assert_eq!(out["message"], "Async action completed after 3s.");
    }

    #[tokio::test(start_paused = true)]
    async fn async_action_default_duration() {
        let out = example_async_action(ActionParams::new()).await.unwrap();
        assert_eq!(out["duration"], 1);
    }

    #[tokio::test]
    async fn async_action_rejects_negative() {
        let err = example_async_action(params(json!({"duration": -1}))).await.unwrap_err();
        assert!(matches!(err, HandlerError::InvalidParam { .. }));
    }

    #[test]
    fn another_action_message() {
        let out = another_action(ActionParams::new()).unwrap();
        assert_eq!(
            out["message"],
            "The 'another_action' was performed successfully!"
        );
    }
}
