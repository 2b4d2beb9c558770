//! Resolve the CLI arguments into an invocation and run it

use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;

use crate::event::{resolve_payload, PayloadError};
use crate::handlers::HandlerError;
use crate::registry::HandlerRegistry;
use crate::Cli;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No handler named '{name}' registered in {program}")]
    UnknownHandler { name: String, program: &'static str },

    #[error("invalid --event argument")]
    Event(#[source] PayloadError),

    #[error("invalid --context argument")]
    Context(#[source] PayloadError),

    #[error("handler '{name}' failed")]
    Handler {
        name: String,
        #[source]
        source: HandlerError,
    },

    #[error("failed to serialize handler result")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write handler result")]
    Output(#[from] io::Error),
}

/// Invoke the handler named on the command line and write its JSON result to `out`
pub async fn dispatch<W: Write>(
    cli: &Cli,
    registry: &HandlerRegistry,
    out: &mut W,
) -> Result<(), DispatchError> {
    let event = resolve_payload(cli.event.as_deref()).map_err(DispatchError::Event)?;
    let context = resolve_payload(cli.context.as_deref()).map_err(DispatchError::Context)?;

    tracing::debug!("lambda_handler={}", cli.lambda_handler);
    tracing::debug!("event={}", describe(&event));
    tracing::debug!("context={}", describe(&context));

    let Some(handler) = registry.get(&cli.lambda_handler) else {
        let err = DispatchError::UnknownHandler {
            name: cli.lambda_handler.clone(),
            program: env!("CARGO_PKG_NAME"),
        };
        tracing::error!("{} (available: {})", err, registry.names().join(", "));
        return Err(err);
    };

    let result = handler
        .invoke(event, context)
        .await
        .map_err(|source| DispatchError::Handler {
            name: cli.lambda_handler.clone(),
            source,
        })?;

    let text = serde_json::to_string(&result)?;
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}

fn describe(payload: &Option<Value>) -> String {
    payload
        .as_ref()
        .map_or_else(|| "None".to_string(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::{Call, FailingApi, RecordingApi};
    use crate::handlers::Handler;
    use crate::registry::{LIST_USERS, READ_USER};
    use async_trait::async_trait;
    use clap::error::ErrorKind;
    use clap::Parser;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::util::SubscriberInitExt;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// Returns exactly what it was invoked with
    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn invoke(
            &self,
            event: Option<Value>,
            context: Option<Value>,
        ) -> Result<Value, HandlerError> {
            Ok(json!({"event": event, "context": context}))
        }
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lambda").chain(args.iter().copied())).unwrap()
    }

    async fn run(args: &[&str], registry: &HandlerRegistry) -> (Result<(), DispatchError>, String) {
        let mut out = Vec::new();
        let result = dispatch(&cli(args), registry, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_read_user_handler_inline_event() {
        let api = RecordingApi::new(json!({"id": 1, "name": "test user"}));
        let registry = HandlerRegistry::users(api.clone());

        let (result, out) = run(&[READ_USER, "--event", r#"{"id": 1}"#], &registry).await;

        result.unwrap();
        assert_eq!(out, "{\"id\":1,\"name\":\"test user\"}\n");
        assert_eq!(api.calls(), vec![Call::Fetch(1)]);
    }

    #[tokio::test]
    async fn test_list_users_handler_with_paging() {
        let api = RecordingApi::new(json!([{"id": 1, "name": "test user"}]));
        let registry = HandlerRegistry::users(api.clone());

        let (result, out) = run(
            &[LIST_USERS, "-e", r#"{"page": 2, "limit": 20}"#, "-v"],
            &registry,
        )
        .await;

        result.unwrap();
        assert_eq!(out, "[{\"id\":1,\"name\":\"test user\"}]\n");
        assert_eq!(api.calls(), vec![Call::FetchAll(Some(2), Some(20))]);
    }

    #[tokio::test]
    async fn test_known_handler_without_event() {
        let mut registry = HandlerRegistry::users(RecordingApi::new(json!(null)));
        registry.register("echo", Arc::new(Echo));

        let (result, out) = run(&["echo"], &registry).await;

        result.unwrap();
        assert_eq!(out, "{\"event\":null,\"context\":null}\n");
    }

    #[tokio::test]
    async fn test_event_and_context_pass_through_unchanged() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", Arc::new(Echo));
        let event = json!({"id": 1610, "tags": ["a", "b"], "nested": {"ok": true, "n": 2.5}});
        let context = json!({"meta": "multiverse"});

        let mut out = Vec::new();
        dispatch(
            &cli(&["echo", "-e", &event.to_string(), "-c", &context.to_string()]),
            &registry,
            &mut out,
        )
        .await
        .unwrap();

        let echoed: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(echoed, json!({"event": event, "context": context}));
    }

    #[tokio::test]
    async fn test_event_file_matches_inline_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, json!({"id": 12345}).to_string()).unwrap();

        let api = RecordingApi::new(json!({"id": 12345}));
        let registry = HandlerRegistry::users(api.clone());

        let (from_file, file_out) = run(&[READ_USER, "-e", path.to_str().unwrap()], &registry).await;
        let (inline, inline_out) = run(&[READ_USER, "-e", r#"{"id": 12345}"#], &registry).await;

        from_file.unwrap();
        inline.unwrap();
        assert_eq!(file_out, inline_out);
        assert_eq!(api.calls(), vec![Call::Fetch(12345), Call::Fetch(12345)]);
    }

    #[tokio::test]
    async fn test_unknown_handler_is_logged_and_reported() {
        let captured = Captured::default();
        let writer = captured.clone();
        let _guard = gorest::observability::subscriber(0, move || writer.clone()).set_default();

        let api = RecordingApi::new(json!(null));
        let registry = HandlerRegistry::users(api.clone());

        let (result, out) = run(&["unknown_handler"], &registry).await;

        assert!(matches!(
            result,
            Err(DispatchError::UnknownHandler { ref name, .. }) if name == "unknown_handler"
        ));
        assert!(out.is_empty());
        assert!(api.calls().is_empty());

        let logs = captured.contents();
        assert!(logs.contains("ERROR"));
        assert!(logs.contains("No handler named 'unknown_handler' registered in lambda-cli"));
        assert!(logs.contains("list_users_handler, read_user_handler"));
    }

    #[tokio::test]
    async fn test_verbose_run_logs_the_invocation() {
        let captured = Captured::default();
        let writer = captured.clone();
        let _guard = gorest::observability::subscriber(1, move || writer.clone()).set_default();

        let registry = HandlerRegistry::users(RecordingApi::new(json!({})));
        let (result, _) = run(&[READ_USER, "-e", r#"{"id": 5}"#], &registry).await;
        result.unwrap();

        let logs = captured.contents();
        assert!(logs.contains("lambda_handler=read_user_handler"));
        assert!(logs.contains("event={\"id\":5}"));
        assert!(logs.contains("context=None"));
    }

    // Text that is neither JSON nor a file used to be dropped silently.
    #[tokio::test]
    async fn test_unresolvable_event_is_an_error() {
        let api = RecordingApi::new(json!(null));
        let registry = HandlerRegistry::users(api.clone());

        let (result, out) = run(&[READ_USER, "-e", "no-such-file.json"], &registry).await;

        assert!(matches!(
            result,
            Err(DispatchError::Event(PayloadError::Unresolvable(_)))
        ));
        assert!(out.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_context_is_an_error() {
        let registry = HandlerRegistry::users(RecordingApi::new(json!(null)));

        let (result, _) = run(&[LIST_USERS, "-c", "{ broken"], &registry).await;

        assert!(matches!(result, Err(DispatchError::Context(_))));
    }

    #[tokio::test]
    async fn test_missing_id_surfaces_as_handler_error() {
        let registry = HandlerRegistry::users(RecordingApi::new(json!(null)));

        let (result, out) = run(&[READ_USER, "-e", r#"{"name": "x"}"#], &registry).await;

        assert!(matches!(
            result,
            Err(DispatchError::Handler { source: HandlerError::MissingKey(_), .. })
        ));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_http_error_propagates_with_status() {
        let registry = HandlerRegistry::users(Arc::new(FailingApi(gorest::StatusCode::NOT_FOUND)));

        let (result, out) = run(&[READ_USER, "-e", r#"{"id": 1}"#], &registry).await;

        match result {
            Err(DispatchError::Handler {
                source: HandlerError::Client(e),
                ..
            }) => assert_eq!(e.status(), Some(gorest::StatusCode::NOT_FOUND)),
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_handler_argument() {
        let err = Cli::try_parse_from(["lambda"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("LAMBDA_HANDLER"));
    }

    #[test]
    fn test_verbose_flag_counts() {
        assert_eq!(cli(&[LIST_USERS]).verbose, 0);
        assert_eq!(cli(&[LIST_USERS, "-v"]).verbose, 1);
        assert_eq!(cli(&[LIST_USERS, "-vvv"]).verbose, 3);
        assert_eq!(cli(&[LIST_USERS, "--verbose", "-v"]).verbose, 2);
    }
}
