//! Upload Job Controller: tracks in-flight upload-and-analyze requests.
//!
//! # Progress estimation
//! The remote analysis duration is unknown to the client, so while a request
//! is awaited a ticker adds +10 to the job's progress on a fixed interval,
//! capped at 90. Liveness without claiming false completion; the real
//! response sets 100/`Succeeded` or 0/`Failed`.
//!
//! # Cancellation
//! Each job owns a `CancellationToken`. Cancelling discards the job's state
//! and stops its ticker; the underlying request is not guaranteed to be
//! aborted, so a late response that finds its job gone mutates nothing.
//! The ticker is cancelled on every terminal transition, so there is no leaked
//! periodic work.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api_client::ScreenerApi;
use crate::errors::EngineError;
use crate::models::candidate::CandidateRecord;
use crate::models::file::FilePayload;
use crate::roster::store::CandidateStore;
use crate::upload::job::{UploadJob, UploadKind, UploadStatus};

/// Progress starts here the moment a job is submitted.
const INITIAL_PROGRESS: u8 = 10;
/// Simulated progress never passes this before the response arrives.
const PROGRESS_CAP: u8 = 90;
const PROGRESS_STEP: u8 = 10;

struct JobEntry {
    job: UploadJob,
    /// Consumed on submission. `None` once the request is in flight.
    payloads: Option<Vec<FilePayload>>,
    token: CancellationToken,
}

type JobMap = Arc<Mutex<HashMap<Uuid, JobEntry>>>;

pub struct UploadJobController {
    api: Arc<dyn ScreenerApi>,
    store: Arc<CandidateStore>,
    jobs: JobMap,
    progress_tick: Duration,
    /// How long a terminal status stays visible before the refresh discards
    /// the job. A display concern; zero is fine non-interactively.
    refresh_delay: Duration,
}

impl UploadJobController {
    pub fn new(
        api: Arc<dyn ScreenerApi>,
        store: Arc<CandidateStore>,
        progress_tick: Duration,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            api,
            store,
            jobs: Arc::new(Mutex::new(HashMap::new())),
            progress_tick,
            refresh_delay,
        }
    }

    /// Registers an `Idle` job holding the staged payloads. Nothing is sent
    /// until `submit`.
    pub fn stage(
        &self,
        kind: UploadKind,
        files: Vec<FilePayload>,
        job_description: Option<String>,
    ) -> Uuid {
        let job_id = Uuid::new_v4();
        let job = UploadJob {
            job_id,
            kind,
            files: files.iter().map(FilePayload::meta).collect(),
            job_description: job_description.clone(),
            status: UploadStatus::Idle,
            progress_percent: 0,
            status_message: String::new(),
        };
        self.lock().insert(
            job_id,
            JobEntry {
                job,
                payloads: Some(files),
                token: CancellationToken::new(),
            },
        );
        job_id
    }

    /// Transitions a staged job to `Uploading` and spawns its driver task.
    ///
    /// Fails with `Validation` (leaving the job `Idle`) when the file
    /// list is empty, or when the job is unknown or already submitted.
    pub fn submit(&self, job_id: Uuid) -> Result<(), EngineError> {
        let (files, job_description, token) = {
            let mut guard = self.lock();
            let entry = guard
                .get_mut(&job_id)
                .ok_or_else(|| EngineError::Validation(format!("unknown upload job {job_id}")))?;
            if entry.job.status != UploadStatus::Idle {
                return Err(EngineError::Validation(format!(
                    "upload job {job_id} already submitted"
                )));
            }
            let files = entry.payloads.take().unwrap_or_default();
            if files.is_empty() {
                entry.payloads = Some(files);
                return Err(EngineError::Validation(
                    "at least one file is required".to_string(),
                ));
            }

            entry.job.status = UploadStatus::Uploading;
            entry.job.progress_percent = INITIAL_PROGRESS;
            entry.job.status_message = match entry.job.kind {
                UploadKind::Single => "Uploading file...".to_string(),
                UploadKind::Bulk => format!("Uploading {} files...", files.len()),
            };
            (
                files,
                entry.job.job_description.clone(),
                entry.token.clone(),
            )
        };

        info!("Upload job {job_id} submitted ({} file(s))", files.len());
        tokio::spawn(drive_job(
            self.api.clone(),
            self.store.clone(),
            self.jobs.clone(),
            job_id,
            files,
            job_description,
            token,
            self.progress_tick,
            self.refresh_delay,
        ));
        Ok(())
    }

    /// Stages and submits in one step.
    pub fn submit_single(
        &self,
        file: FilePayload,
        job_description: Option<String>,
    ) -> Result<Uuid, EngineError> {
        let job_id = self.stage(UploadKind::Single, vec![file], job_description);
        self.submit(job_id)?;
        Ok(job_id)
    }

    pub fn submit_bulk(
        &self,
        files: Vec<FilePayload>,
        job_description: Option<String>,
    ) -> Result<Uuid, EngineError> {
        let job_id = self.stage(UploadKind::Bulk, files, job_description);
        self.submit(job_id)?;
        Ok(job_id)
    }

    /// Abandons a job: state discarded, ticker cancelled. Also how a terminal
    /// (failed) job is dismissed. A response arriving afterwards is ignored.
    pub fn cancel(&self, job_id: Uuid) {
        if let Some(entry) = self.lock().remove(&job_id) {
            entry.token.cancel();
            info!("Upload job {job_id} cancelled");
        }
    }

    /// Cloned snapshot of one job, if it still exists.
    pub fn job(&self, job_id: Uuid) -> Option<UploadJob> {
        self.lock().get(&job_id).map(|e| e.job.clone())
    }

    /// Cloned snapshots of all tracked jobs.
    pub fn jobs(&self) -> Vec<UploadJob> {
        self.lock().values().map(|e| e.job.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, JobEntry>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn lock_jobs(jobs: &JobMap) -> MutexGuard<'_, HashMap<Uuid, JobEntry>> {
    jobs.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs one submitted job to a terminal state.
#[allow(clippy::too_many_arguments)]
async fn drive_job(
    api: Arc<dyn ScreenerApi>,
    store: Arc<CandidateStore>,
    jobs: JobMap,
    job_id: Uuid,
    mut files: Vec<FilePayload>,
    job_description: Option<String>,
    token: CancellationToken,
    progress_tick: Duration,
    refresh_delay: Duration,
) {
    let kind = match lock_jobs(&jobs).get(&job_id) {
        Some(entry) => entry.job.kind,
        None => return, // cancelled between submit and spawn
    };

    let ticker_token = token.child_token();
    let ticker = spawn_progress_ticker(jobs.clone(), job_id, ticker_token.clone(), progress_tick);

    // The request body is handed to the transport here; from the engine's
    // point of view the job is now waiting on remote analysis.
    {
        let mut guard = lock_jobs(&jobs);
        if let Some(entry) = guard.get_mut(&job_id) {
            entry.job.status = UploadStatus::Analyzing;
            entry.job.status_message = match kind {
                UploadKind::Single => "Analyzing resume with AI...".to_string(),
                UploadKind::Bulk => format!("Analyzing {} resumes with AI...", files.len()),
            };
        }
    }

    let result: Result<Vec<CandidateRecord>, EngineError> = match kind {
        UploadKind::Single => {
            let file = files.swap_remove(0);
            api.upload_single(file, job_description.as_deref())
                .await
                .map(|record| vec![record])
        }
        UploadKind::Bulk => api.upload_bulk(files, job_description.as_deref()).await,
    };

    ticker_token.cancel();
    let _ = ticker.await;

    let succeeded = {
        let mut guard = lock_jobs(&jobs);
        if token.is_cancelled() {
            return;
        }
        let Some(entry) = guard.get_mut(&job_id) else {
            // Job discarded while the request was in flight; late response
            // must not mutate anything.
            return;
        };
        match &result {
            Ok(records) => {
                entry.job.status = UploadStatus::Succeeded;
                entry.job.progress_percent = 100;
                entry.job.status_message = match kind {
                    UploadKind::Single => "Analysis complete!".to_string(),
                    UploadKind::Bulk => {
                        format!("Successfully uploaded {} resumes!", records.len())
                    }
                };
                info!("Upload job {job_id} succeeded ({} record(s))", records.len());
                true
            }
            Err(e) => {
                entry.job.status = UploadStatus::Failed;
                entry.job.progress_percent = 0;
                entry.job.status_message = format!("Error: {e}");
                warn!("Upload job {job_id} failed: {e}");
                false
            }
        }
    };

    if succeeded {
        // Let the terminal status render before the roster changes under the
        // user, then refresh once and discard the job.
        tokio::time::sleep(refresh_delay).await;
        if token.is_cancelled() {
            return;
        }
        if let Err(e) = store.load().await {
            warn!("Post-upload roster refresh failed: {e}");
        }
        lock_jobs(&jobs).remove(&job_id);
    }
}

fn spawn_progress_ticker(
    jobs: JobMap,
    job_id: Uuid,
    token: CancellationToken,
    tick: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.tick().await; // the first tick completes immediately
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    let mut guard = lock_jobs(&jobs);
                    match guard.get_mut(&job_id) {
                        Some(entry) if entry.job.is_in_flight() => {
                            if entry.job.progress_percent < PROGRESS_CAP {
                                entry.job.progress_percent += PROGRESS_STEP;
                            }
                        }
                        _ => break,
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::api_client::mock::{make_candidate, MockApi};
    use crate::models::candidate::Recommendation;

    fn make_controller(
        api: Arc<MockApi>,
        refresh_delay: Duration,
    ) -> (UploadJobController, Arc<CandidateStore>) {
        let store = Arc::new(CandidateStore::new(api.clone()));
        let controller = UploadJobController::new(
            api,
            store.clone(),
            Duration::from_secs(2),
            refresh_delay,
        );
        (controller, store)
    }

    fn make_file(name: &str) -> FilePayload {
        FilePayload::new(name, "%PDF-1.4 fixture".as_bytes().to_vec())
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_submit_with_zero_files_is_rejected_and_job_stays_idle() {
        let api = Arc::new(MockApi::default());
        let (controller, _store) = make_controller(api.clone(), Duration::ZERO);

        let job_id = controller.stage(UploadKind::Single, vec![], None);
        let err = controller.submit(job_id).unwrap_err();
        assert!(err.is_validation());

        let job = controller.job(job_id).unwrap();
        assert_eq!(job.status, UploadStatus::Idle);
        assert_eq!(job.progress_percent, 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected() {
        let api = Arc::new(MockApi::default());
        let (controller, _store) = make_controller(api, Duration::ZERO);

        let job_id = controller.stage(UploadKind::Single, vec![make_file("cv.pdf")], None);
        controller.submit(job_id).unwrap();
        assert!(controller.submit(job_id).unwrap_err().is_validation());
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_monotonic_and_capped_until_response() {
        let api = Arc::new(MockApi::default());
        *api.upload_delay.lock().unwrap() = Duration::from_secs(25);
        let (controller, _store) = make_controller(api, Duration::from_millis(1500));

        let job_id = controller
            .submit_single(make_file("cv.pdf"), Some("Rust engineer".to_string()))
            .unwrap();
        settle().await;

        let mut last = controller.job(job_id).unwrap().progress_percent;
        assert_eq!(last, INITIAL_PROGRESS);

        // 2s ticks against a 25s analysis: +10 per tick, parked at 90.
        for _ in 0..11 {
            tokio::time::advance(Duration::from_secs(2)).await;
            settle().await;
            let job = controller.job(job_id).unwrap();
            if job.is_in_flight() {
                assert!(job.progress_percent >= last, "progress must not regress");
                assert!(job.progress_percent <= PROGRESS_CAP);
                last = job.progress_percent;
            }
        }
        let job = controller.job(job_id).unwrap();
        assert_eq!(job.progress_percent, PROGRESS_CAP);
        assert_eq!(job.status, UploadStatus::Analyzing);

        // Response lands: exactly 100 iff Succeeded.
        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        let job = controller.job(job_id).unwrap();
        assert_eq!(job.status, UploadStatus::Succeeded);
        assert_eq!(job.progress_percent, 100);
        assert_eq!(job.status_message, "Analysis complete!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_refreshes_store_after_display_delay_then_discards_job() {
        let api = Arc::new(MockApi::default());
        *api.candidates.lock().unwrap() =
            vec![make_candidate("Fresh", 80.0, Recommendation::Select)];
        let (controller, store) = make_controller(api.clone(), Duration::from_millis(1500));

        let job_id = controller.submit_single(make_file("cv.pdf"), None).unwrap();
        settle().await;

        // Terminal status is still visible during the display window.
        let job = controller.job(job_id).unwrap();
        assert_eq!(job.status, UploadStatus::Succeeded);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);

        tokio::time::advance(Duration::from_millis(1500)).await;
        settle().await;

        assert!(controller.job(job_id).is_none(), "job discarded after delay");
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resets_progress_and_keeps_job_visible() {
        let api = Arc::new(MockApi::default());
        api.fail_upload.store(true, Ordering::SeqCst);
        *api.upload_delay.lock().unwrap() = Duration::from_secs(5);
        let (controller, _store) = make_controller(api.clone(), Duration::ZERO);

        let job_id = controller.submit_single(make_file("cv.pdf"), None).unwrap();
        settle().await;
        tokio::time::advance(Duration::from_secs(6)).await;
        settle().await;

        let job = controller.job(job_id).unwrap();
        assert_eq!(job.status, UploadStatus::Failed);
        assert_eq!(job.progress_percent, 0);
        assert!(job.status_message.starts_with("Error:"));
        // No refresh on failure.
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_job_ignores_late_response() {
        let api = Arc::new(MockApi::default());
        *api.upload_delay.lock().unwrap() = Duration::from_secs(30);
        let (controller, _store) = make_controller(api.clone(), Duration::ZERO);

        let job_id = controller.submit_single(make_file("cv.pdf"), None).unwrap();
        settle().await;
        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;

        controller.cancel(job_id);
        assert!(controller.job(job_id).is_none());

        // Let the abandoned request resolve; nothing may reappear.
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert!(controller.jobs().is_empty());
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_job_reports_batch_progress_and_count() {
        let api = Arc::new(MockApi::default());
        *api.upload_delay.lock().unwrap() = Duration::from_secs(3);
        let (controller, _store) = make_controller(api, Duration::from_millis(1500));

        let files = vec![make_file("a.pdf"), make_file("b.pdf"), make_file("c.pdf")];
        let job_id = controller.submit_bulk(files, None).unwrap();
        settle().await;

        let job = controller.job(job_id).unwrap();
        assert_eq!(job.kind, UploadKind::Bulk);
        assert_eq!(job.files.len(), 3);

        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        let job = controller.job(job_id).unwrap();
        assert_eq!(job.status, UploadStatus::Succeeded);
        assert_eq!(job.status_message, "Successfully uploaded 3 resumes!");
    }
}
