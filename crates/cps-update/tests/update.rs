//! Update flow against wiremock standing in for both the backend and the CI
//! host.

use std::time::Duration;

use cps_core::{GithubConfig, JobStatus, Marketplace};
use cps_supabase::{ClientOptions, SupabaseClient};
use cps_update::{JobStore, PollSettings, UpdateError, UpdateService, WorkflowDispatcher};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn github_config(api_url: &str) -> GithubConfig {
    GithubConfig {
        api_url: api_url.to_string(),
        repo: "acme/comprosearch".to_string(),
        token: "ghp_test".to_string(),
        git_ref: "main".to_string(),
        workflow_oksid: "oksid.yml".to_string(),
        workflow_penta: "bayinet.yml".to_string(),
        workflow_denge: "denge.yml".to_string(),
    }
}

fn service(server: &MockServer, poll: PollSettings) -> UpdateService {
    let options = ClientOptions {
        timeout_secs: 5,
        user_agent: "cps-test".to_string(),
        max_retries: 0,
        backoff_base_ms: 0,
    };
    let client = SupabaseClient::new(&server.uri(), "service-key", &options)
        .expect("client construction should not fail");
    let dispatcher = WorkflowDispatcher::new(github_config(&server.uri()), 5, "cps-test")
        .expect("dispatcher construction should not fail");
    UpdateService::new(JobStore::new(client), dispatcher, poll)
}

fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        timeout: Duration::from_secs(5),
    }
}

async fn mount_job_insert(server: &MockServer, marketplace: &str) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({ "marketplace": marketplace, "status": "pending", "progress": 0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "job-1",
            "status": "pending",
            "progress": 0,
            "marketplace": marketplace
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn job_row(status: &str, progress: u8) -> serde_json::Value {
    json!({ "id": "job-1", "status": status, "progress": progress, "marketplace": "oksid" })
}

#[tokio::test]
async fn start_creates_job_and_dispatches_workflow() {
    let server = MockServer::start().await;
    mount_job_insert(&server, "penta").await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/comprosearch/actions/workflows/bayinet.yml/dispatches"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(header("accept", "application/vnd.github+json"))
        .and(body_json(json!({
            "ref": "main",
            "inputs": { "marketplace": "penta", "job_id": "job-1" }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let job = service(&server, fast_poll())
        .start(Marketplace::Penta)
        .await
        .expect("start should succeed");

    assert_eq!(job.id, "job-1");
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.marketplace, "penta");
}

#[tokio::test]
async fn rejected_dispatch_marks_job_failed() {
    let server = MockServer::start().await;
    mount_job_insert(&server, "denge").await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/comprosearch/actions/workflows/denge.yml/dispatches"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "Workflow does not have 'workflow_dispatch' trigger" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("id", "eq.job-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let err = service(&server, fast_poll())
        .start(Marketplace::Denge)
        .await
        .expect_err("dispatch should fail");

    match err {
        UpdateError::Dispatch { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("workflow_dispatch"), "{message}");
        }
        other => panic!("expected Dispatch, got {other:?}"),
    }
}

#[tokio::test]
async fn job_store_failure_skips_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for table jobs"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/comprosearch/actions/workflows/oksid.yml/dispatches"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server, fast_poll())
        .start(Marketplace::Oksid)
        .await
        .expect_err("insert should fail");
    assert!(matches!(err, UpdateError::Store(_)), "{err:?}");
}

#[tokio::test]
async fn poll_reports_progress_until_done() {
    let server = MockServer::start().await;
    // Mocks are tried in mount order; each limited one is used up in turn.
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("id", "eq.job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_row("pending", 0)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_row("processing", 40)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_row("done", 100)))
        .mount(&server)
        .await;

    let mut seen = Vec::new();
    let job = service(&server, fast_poll())
        .poll("job-1", |job| seen.push((job.status, job.progress)))
        .await
        .expect("poll should finish");

    assert_eq!(job.status, JobStatus::Done);
    assert_eq!(
        seen,
        vec![
            (JobStatus::Pending, 0),
            (JobStatus::Running, 40),
            (JobStatus::Done, 100),
        ]
    );
}

#[tokio::test]
async fn poll_stops_on_failed_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "status": "failed",
            "progress": 12,
            "error": "login rejected"
        })))
        .mount(&server)
        .await;

    let job = service(&server, fast_poll())
        .poll("job-1", |_| {})
        .await
        .expect("a failed job is still a finished poll");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("login rejected"));
}

#[tokio::test]
async fn poll_times_out_on_a_stuck_job() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_row("running", 10)))
        .mount(&server)
        .await;

    let poll = PollSettings {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(50),
    };
    let err = service(&server, poll)
        .poll("job-1", |_| {})
        .await
        .expect_err("poll should time out");

    match err {
        UpdateError::PollTimeout {
            job_id,
            last_status,
            ..
        } => {
            assert_eq!(job_id, "job-1");
            assert_eq!(last_status, Some(JobStatus::Running));
        }
        other => panic!("expected PollTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn poll_gives_up_after_three_failed_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let mut calls = 0;
    let err = service(&server, fast_poll())
        .poll("job-1", |_| calls += 1)
        .await
        .expect_err("poll should fail");

    assert!(matches!(err, UpdateError::Store(_)), "{err:?}");
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .and(query_param("id", "eq.missing"))
        .and(header("accept", "application/vnd.pgrst.object+json"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned"
        })))
        .mount(&server)
        .await;

    let err = service(&server, fast_poll())
        .job("missing")
        .await
        .expect_err("job should be missing");
    assert!(matches!(err, UpdateError::JobNotFound(ref id) if id == "missing"), "{err:?}");
}
