//! Tests driving the kubeyaml binary over stdin and stdout.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

const DEPLOYMENT: &str = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  template:
    spec:
      containers:
      # sidecar first
      - name: proxy
        image: envoy:1.29
      - name: app
        image: old:1.0
";

fn kubeyaml(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_kubeyaml"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn kubeyaml");
    // A usage error exits before reading, so a broken pipe is fine here.
    let _ = child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes());
    child.wait_with_output().expect("failed to wait for kubeyaml")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout is utf-8")
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("stderr is utf-8")
}

#[test]
fn test_image_updates_only_the_named_container() {
    let output = kubeyaml(
        &[
            "image",
            "--namespace",
            "prod",
            "--kind",
            "deployment",
            "--name",
            "web",
            "--container",
            "app",
            "--image",
            "new:2.0",
        ],
        DEPLOYMENT,
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let expected = format!(
        "---\n{}",
        DEPLOYMENT.replace("image: old:1.0", "image: new:2.0")
    );
    assert_eq!(stdout(&output), expected);
}

#[test]
fn test_no_match_echoes_stream_and_exits_2() {
    let output = kubeyaml(
        &[
            "image",
            "--namespace",
            "prod",
            "--kind",
            "deployment",
            "--name",
            "missing",
            "--container",
            "app",
            "--image",
            "new:2.0",
        ],
        DEPLOYMENT,
    );
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), format!("---\n{}", DEPLOYMENT));
    assert!(stderr(&output).contains("Container not found"));
}

#[test]
fn test_annotate_list_item() {
    let input = "apiVersion: v1
kind: List
items:
- kind: Service
  metadata:
    name: web
    namespace: prod
";
    let output = kubeyaml(
        &[
            "annotate",
            "--namespace",
            "prod",
            "--kind",
            "Service",
            "--name",
            "web",
            "team=core",
            "link=docs",
        ],
        input,
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "---
apiVersion: v1
kind: List
items:
- kind: Service
  metadata:
    name: web
    namespace: prod
    annotations:
      team: core
      link: docs
"
    );
}

#[test]
fn test_annotate_only_first_match_across_documents() {
    let doc = "kind: ConfigMap\nmetadata:\n  name: cfg\n  namespace: prod\n";
    let input = format!("{doc}---\n{doc}");
    let output = kubeyaml(
        &[
            "annotate",
            "--namespace",
            "prod",
            "--kind",
            "configmap",
            "--name",
            "cfg",
            "a=1",
        ],
        &input,
    );
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        format!("---\n{doc}  annotations:\n    a: \"1\"\n---\n{doc}")
    );
}

#[test]
fn test_annotation_needs_exactly_one_equals() {
    for note in ["novalue", "a=b=c"] {
        let output = kubeyaml(
            &[
                "annotate",
                "--namespace",
                "prod",
                "--kind",
                "Service",
                "--name",
                "web",
                note,
            ],
            DEPLOYMENT,
        );
        assert_eq!(output.status.code(), Some(2), "{note}");
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains(note));
    }
}

#[test]
fn test_invalid_yaml_fails_with_status_1() {
    let output = kubeyaml(
        &[
            "annotate",
            "--namespace",
            "prod",
            "--kind",
            "Service",
            "--name",
            "web",
            "a=b",
        ],
        "kind: [Service\n",
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: document 0:"));
}
