use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::TempDir;

#[test]
fn help_lists_the_parse_subcommand() {
    let mut cmd = Command::cargo_bin("cloudparse").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn unsupported_file_fails_fast_without_network() {
    let dir = TempDir::new().expect("Creating temp dir failed");
    let doc = dir.path().join("notes.docx");
    write(&doc, b"not a pdf").expect("Writing temp file failed");

    let mut cmd = Command::cargo_bin("cloudparse").expect("Binary exists");
    cmd.arg("parse")
        .arg(&doc)
        // A key is present, so the failure can only come from the format gate.
        .env("CLOUDPARSE_API_KEY", "dummy-key");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"));
}

#[test]
fn missing_api_key_fails_before_submitting() {
    let dir = TempDir::new().expect("Creating temp dir failed");
    let doc = dir.path().join("report.pdf");
    write(&doc, b"%PDF-1.4 test").expect("Writing temp file failed");

    let mut cmd = Command::cargo_bin("cloudparse").expect("Binary exists");
    cmd.arg("parse")
        .arg(&doc)
        .env_remove("CLOUDPARSE_API_KEY");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CLOUDPARSE_API_KEY"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use cloudparse::cli::{run, Cli, Commands};

    // Minimum arguments for the Parse subcommand (using a dummy config path;
    // run() is expected to fail after the first trace event).
    let cli = Cli {
        command: Commands::Parse {
            files: vec![std::path::PathBuf::from("dummy.pdf")],
            format: None,
            json: false,
            config: Some(std::path::PathBuf::from("dummy.yaml")),
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
