use gptapi::{run_until_invalid_json, ConfigStore, GptApi, StopReason};
use httpmock::prelude::*;
use tempfile::TempDir;

fn workspace(api_base: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("profiles")).unwrap();
    let profile = format!(
        r#"
model: gpt-4o-mini
system_prompt: Answer in JSON.
api_base: {api_base}
parameters: {{max_tokens: 64, temperature: 1.0, top_p: 1.0, n: 1}}
"#
    );
    std::fs::write(dir.path().join("profiles/jsonprobe.yaml"), profile).unwrap();
    std::fs::write(dir.path().join("keys.yaml"), "openai_api: sk-probe\n").unwrap();
    dir
}

fn structured_workspace(api_base: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("profiles")).unwrap();
    let profile = format!(
        r#"
model: gpt-4o-mini
system_prompt: Plan the goal.
api_base: {api_base}
parameters: {{max_tokens: 64, temperature: 1.0, top_p: 1.0, n: 1}}
structured_output:
  enable: true
  schema:
    type: object
    properties:
      goal: {{type: string}}
      steps: {{type: array}}
"#
    );
    std::fs::write(dir.path().join("profiles/goalplanner.yaml"), profile).unwrap();
    std::fs::write(dir.path().join("keys.yaml"), "openai_api: sk-probe\n").unwrap();
    dir
}

fn reply_arguments(server: &MockServer, arguments: &str) {
    let body = serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "function_call": {"name": "format_response", "arguments": arguments}
            }
        }]
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(body);
    });
}

fn reply(server: &MockServer, content: &str) {
    let body = serde_json::json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    });
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(body);
    });
}

#[tokio::test]
async fn test_probe_stops_on_invalid_json() {
    let server = MockServer::start();
    reply(&server, "Sure! Here is your plan: ...");

    let dir = workspace(&server.url("/v1"));
    let api = GptApi::new(ConfigStore::new(dir.path()));

    let mut seen = 0;
    let outcome = run_until_invalid_json(&api, "jsonprobe", "go", None, |_, _| seen += 1).await;

    assert_eq!(outcome.stop, StopReason::InvalidJson);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(seen, 0);
    assert_eq!(
        outcome.last_output.as_deref(),
        Some("Sure! Here is your plan: ...")
    );
}

#[tokio::test]
async fn test_probe_respects_iteration_limit() {
    let server = MockServer::start();
    reply(&server, r#"{"plan": ["a", "b"]}"#);

    let dir = workspace(&server.url("/v1"));
    let api = GptApi::new(ConfigStore::new(dir.path()));

    let mut iterations_seen = Vec::new();
    let outcome = run_until_invalid_json(&api, "jsonprobe", "go", Some(3), |i, value| {
        assert_eq!(value["plan"][1], "b");
        iterations_seen.push(i);
    })
    .await;

    assert_eq!(outcome.stop, StopReason::IterationLimit);
    assert_eq!(outcome.iterations, 3);
    assert_eq!(iterations_seen, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_probe_reports_api_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("upstream exploded");
    });

    let dir = workspace(&server.url("/v1"));
    let api = GptApi::new(ConfigStore::new(dir.path()));

    let outcome = run_until_invalid_json(&api, "jsonprobe", "go", Some(5), |_, _| {}).await;

    assert_eq!(outcome.iterations, 0);
    assert!(outcome.last_output.is_none());
    match outcome.stop {
        StopReason::ApiError(message) => assert!(message.contains("500")),
        other => panic!("unexpected stop reason: {other:?}"),
    }
}

#[tokio::test]
async fn test_structured_malformed_arguments_stop_as_invalid_json() {
    let server = MockServer::start();
    reply_arguments(&server, r#"{"goal": "unterminated"#);

    let dir = structured_workspace(&server.url("/v1"));
    let api = GptApi::new(ConfigStore::new(dir.path()));

    let outcome = run_until_invalid_json(&api, "goalplanner", "go", Some(5), |_, _| {}).await;

    assert_eq!(outcome.stop, StopReason::InvalidJson);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(
        outcome.last_output.as_deref(),
        Some(r#"{"goal": "unterminated"#)
    );
}

#[tokio::test]
async fn test_structured_json_missing_fields_keeps_looping() {
    let server = MockServer::start();
    reply_arguments(&server, r#"{"goal": "launch"}"#);

    let dir = structured_workspace(&server.url("/v1"));
    let api = GptApi::new(ConfigStore::new(dir.path()));

    let outcome = run_until_invalid_json(&api, "goalplanner", "go", Some(2), |_, _| {}).await;

    assert_eq!(outcome.stop, StopReason::IterationLimit);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.last_output.as_deref(), Some(r#"{"goal": "launch"}"#));
}
