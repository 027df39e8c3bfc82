//! Remote API client, the single point of entry for all backend calls.
//!
//! ARCHITECTURAL RULE: no other module may talk to the screening backend
//! directly. The store, upload controller, and dispatcher all go through the
//! `ScreenerApi` trait, carried in the engine as `Arc<dyn ScreenerApi>` so
//! tests can swap in a scripted implementation.
//!
//! No retries live here. Roster loads and bulk dispatches are safe for a
//! caller to retry; uploads are not idempotent (re-submission can
//! double-create candidate records), so retrying is always a caller decision.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::dispatch::InterviewKind;
use crate::errors::EngineError;
use crate::models::candidate::CandidateRecord;
use crate::models::file::FilePayload;

/// Boundary contract consumed by the engine core. Shapes only; transport
/// detail stays inside `ScreenerClient`.
#[async_trait]
pub trait ScreenerApi: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, EngineError>;

    /// Long-running: the remote analysis takes tens of seconds.
    async fn upload_single(
        &self,
        file: FilePayload,
        job_description: Option<&str>,
    ) -> Result<CandidateRecord, EngineError>;

    /// One combined request for the whole batch; timeout scales with count.
    async fn upload_bulk(
        &self,
        files: Vec<FilePayload>,
        job_description: Option<&str>,
    ) -> Result<Vec<CandidateRecord>, EngineError>;

    async fn dispatch_email(
        &self,
        ids: &[Uuid],
        subject: &str,
        body: &str,
    ) -> Result<(), EngineError>;

    async fn dispatch_interview(
        &self,
        ids: &[Uuid],
        date: &str,
        time: &str,
        kind: InterviewKind,
    ) -> Result<(), EngineError>;

    async fn dispatch_tag(&self, ids: &[Uuid], tag: &str) -> Result<(), EngineError>;
}

/// Which error variant a failing call maps to. Loads and uploads surface as
/// `Fetch`; bulk actions as `Dispatch`.
#[derive(Clone, Copy)]
enum ErrorClass {
    Fetch,
    Dispatch,
}

impl ErrorClass {
    fn wrap(self, message: String) -> EngineError {
        match self {
            ErrorClass::Fetch => EngineError::Fetch(message),
            ErrorClass::Dispatch => EngineError::Dispatch(message),
        }
    }
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    candidate_ids: &'a [Uuid],
    subject: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct InterviewRequest<'a> {
    candidate_ids: &'a [Uuid],
    date: &'a str,
    time: &'a str,
    #[serde(rename = "type")]
    kind: InterviewKind,
}

#[derive(Serialize)]
struct TagRequest<'a> {
    candidate_ids: &'a [Uuid],
    tag: &'a str,
}

/// Production `ScreenerApi` backed by one `reqwest::Client`.
/// Every request carries the bearer credential; per-call deadlines come from
/// `Config` and are enforced client-side.
pub struct ScreenerClient {
    http: Client,
    base_url: String,
    token: String,
    fetch_timeout: Duration,
    upload_timeout: Duration,
    bulk_timeout_base: Duration,
    bulk_timeout_per_file: Duration,
}

impl ScreenerClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            fetch_timeout: config.fetch_timeout,
            upload_timeout: config.upload_timeout,
            bulk_timeout_base: config.bulk_timeout_base,
            bulk_timeout_per_file: config.bulk_timeout_per_file,
        }
    }

    /// Absence of a credential is a client-side error, raised before any
    /// request is sent and never silently retried.
    fn bearer(&self) -> Result<&str, EngineError> {
        if self.token.trim().is_empty() {
            return Err(EngineError::MissingCredential);
        }
        Ok(&self.token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transport_error(
        &self,
        operation: &str,
        deadline: Duration,
        class: ErrorClass,
        err: reqwest::Error,
    ) -> EngineError {
        if err.is_timeout() {
            EngineError::Timeout {
                operation: operation.to_string(),
                after: deadline,
            }
        } else {
            class.wrap(format!("{operation}: {err}"))
        }
    }

    async fn check_status(
        operation: &str,
        class: ErrorClass,
        response: Response,
    ) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(class.wrap(format!("{operation} returned {status}: {body}")))
    }

    async fn decode<T: DeserializeOwned>(
        operation: &str,
        class: ErrorClass,
        response: Response,
    ) -> Result<T, EngineError> {
        response
            .json::<T>()
            .await
            .map_err(|e| class.wrap(format!("{operation}: invalid response body: {e}")))
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        deadline: Duration,
        class: ErrorClass,
    ) -> Result<(), EngineError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .timeout(deadline)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(path, deadline, class, e))?;
        Self::check_status(path, class, response).await?;
        debug!("POST {path} succeeded");
        Ok(())
    }

    fn multipart_form(files: Vec<FilePayload>, field: &str, job_description: Option<&str>) -> Form {
        let mut form = Form::new().text(
            "job_description",
            job_description.unwrap_or_default().to_string(),
        );
        for file in files {
            let part = Part::bytes(file.bytes.to_vec()).file_name(file.name);
            form = form.part(field.to_string(), part);
        }
        form
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        deadline: Duration,
    ) -> Result<T, EngineError> {
        let token = self.bearer()?;
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .timeout(deadline)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(path, deadline, ErrorClass::Fetch, e))?;
        let response = Self::check_status(path, ErrorClass::Fetch, response).await?;
        Self::decode(path, ErrorClass::Fetch, response).await
    }
}

#[async_trait]
impl ScreenerApi for ScreenerClient {
    async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, EngineError> {
        let token = self.bearer()?;
        let deadline = self.fetch_timeout;
        let response = self
            .http
            .get(self.url("/candidates"))
            .bearer_auth(token)
            .timeout(deadline)
            .send()
            .await
            .map_err(|e| self.transport_error("/candidates", deadline, ErrorClass::Fetch, e))?;
        let response = Self::check_status("/candidates", ErrorClass::Fetch, response).await?;
        let records: Vec<CandidateRecord> =
            Self::decode("/candidates", ErrorClass::Fetch, response).await?;
        debug!("Fetched {} candidates", records.len());
        Ok(records)
    }

    async fn upload_single(
        &self,
        file: FilePayload,
        job_description: Option<&str>,
    ) -> Result<CandidateRecord, EngineError> {
        let form = Self::multipart_form(vec![file], "file", job_description);
        self.post_multipart("/upload", form, self.upload_timeout)
            .await
    }

    async fn upload_bulk(
        &self,
        files: Vec<FilePayload>,
        job_description: Option<&str>,
    ) -> Result<Vec<CandidateRecord>, EngineError> {
        let deadline = self.bulk_timeout_base + self.bulk_timeout_per_file * files.len() as u32;
        let form = Self::multipart_form(files, "files", job_description);
        self.post_multipart("/bulk-upload", form, deadline).await
    }

    async fn dispatch_email(
        &self,
        ids: &[Uuid],
        subject: &str,
        body: &str,
    ) -> Result<(), EngineError> {
        let request = EmailRequest {
            candidate_ids: ids,
            subject,
            body,
        };
        self.post_json(
            "/send-emails",
            &request,
            self.fetch_timeout,
            ErrorClass::Dispatch,
        )
        .await
    }

    async fn dispatch_interview(
        &self,
        ids: &[Uuid],
        date: &str,
        time: &str,
        kind: InterviewKind,
    ) -> Result<(), EngineError> {
        let request = InterviewRequest {
            candidate_ids: ids,
            date,
            time,
            kind,
        };
        self.post_json(
            "/schedule-interview",
            &request,
            self.fetch_timeout,
            ErrorClass::Dispatch,
        )
        .await
    }

    async fn dispatch_tag(&self, ids: &[Uuid], tag: &str) -> Result<(), EngineError> {
        let request = TagRequest {
            candidate_ids: ids,
            tag,
        };
        self.post_json(
            "/add-tags",
            &request,
            self.fetch_timeout,
            ErrorClass::Dispatch,
        )
        .await
    }
}

#[cfg(test)]
pub mod mock {
    //! Scripted `ScreenerApi` for engine tests. Delays cooperate with
    //! `tokio::time::pause`, so paused-clock tests stay instant.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use super::ScreenerApi;
    use crate::dispatch::InterviewKind;
    use crate::errors::EngineError;
    use crate::models::candidate::{CandidateRecord, Recommendation};
    use crate::models::file::FilePayload;

    pub fn make_candidate(name: &str, overall: f64, recommendation: Recommendation) -> CandidateRecord {
        CandidateRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: None,
            skills: vec!["Go".to_string(), "Rust".to_string()],
            experience_years: 5.0,
            skills_score: overall,
            experience_score: overall,
            education_score: overall,
            overall_score: overall,
            recommendation,
            reason: "test fixture".to_string(),
            resume_text: None,
            tags: vec![],
            uploaded_at: Utc::now(),
        }
    }

    #[derive(Default)]
    pub struct MockApi {
        /// Returned by `fetch_candidates` when no scripted response is queued.
        pub candidates: Mutex<Vec<CandidateRecord>>,
        /// Front-popped per fetch: (delay before responding, payload).
        pub scripted_fetches: Mutex<VecDeque<(Duration, Vec<CandidateRecord>)>>,
        pub fetch_calls: AtomicUsize,
        pub fail_fetch: AtomicBool,
        pub upload_delay: Mutex<Duration>,
        pub fail_upload: AtomicBool,
        pub fail_dispatch: AtomicBool,
        pub email_requests: Mutex<Vec<(Vec<Uuid>, String, String)>>,
        pub interview_requests: Mutex<Vec<(Vec<Uuid>, String, String, InterviewKind)>>,
        pub tag_requests: Mutex<Vec<(Vec<Uuid>, String)>>,
    }

    impl MockApi {
        pub fn with_candidates(records: Vec<CandidateRecord>) -> Self {
            let mock = Self::default();
            *mock.candidates.lock().unwrap() = records;
            mock
        }

        fn dispatch_result(&self) -> Result<(), EngineError> {
            if self.fail_dispatch.load(Ordering::SeqCst) {
                Err(EngineError::Dispatch("backend returned 500".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ScreenerApi for MockApi {
        async fn fetch_candidates(&self) -> Result<Vec<CandidateRecord>, EngineError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(EngineError::Fetch("backend returned 503".to_string()));
            }
            let scripted = self.scripted_fetches.lock().unwrap().pop_front();
            match scripted {
                Some((delay, records)) => {
                    tokio::time::sleep(delay).await;
                    Ok(records)
                }
                None => Ok(self.candidates.lock().unwrap().clone()),
            }
        }

        async fn upload_single(
            &self,
            file: FilePayload,
            _job_description: Option<&str>,
        ) -> Result<CandidateRecord, EngineError> {
            let delay = *self.upload_delay.lock().unwrap();
            tokio::time::sleep(delay).await;
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(EngineError::Fetch("analysis failed".to_string()));
            }
            Ok(make_candidate(&file.name, 75.0, Recommendation::Select))
        }

        async fn upload_bulk(
            &self,
            files: Vec<FilePayload>,
            _job_description: Option<&str>,
        ) -> Result<Vec<CandidateRecord>, EngineError> {
            let delay = *self.upload_delay.lock().unwrap();
            tokio::time::sleep(delay).await;
            if self.fail_upload.load(Ordering::SeqCst) {
                return Err(EngineError::Fetch("analysis failed".to_string()));
            }
            Ok(files
                .into_iter()
                .map(|f| make_candidate(&f.name, 60.0, Recommendation::Processing))
                .collect())
        }

        async fn dispatch_email(
            &self,
            ids: &[Uuid],
            subject: &str,
            body: &str,
        ) -> Result<(), EngineError> {
            self.dispatch_result()?;
            self.email_requests.lock().unwrap().push((
                ids.to_vec(),
                subject.to_string(),
                body.to_string(),
            ));
            Ok(())
        }

        async fn dispatch_interview(
            &self,
            ids: &[Uuid],
            date: &str,
            time: &str,
            kind: InterviewKind,
        ) -> Result<(), EngineError> {
            self.dispatch_result()?;
            self.interview_requests.lock().unwrap().push((
                ids.to_vec(),
                date.to_string(),
                time.to_string(),
                kind,
            ));
            Ok(())
        }

        async fn dispatch_tag(&self, ids: &[Uuid], tag: &str) -> Result<(), EngineError> {
            self.dispatch_result()?;
            self.tag_requests
                .lock()
                .unwrap()
                .push((ids.to_vec(), tag.to_string()));
            Ok(())
        }
    }
}
