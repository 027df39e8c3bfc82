//! Engine glue: owns the store, selection, upload controller, and
//! dispatcher, and exposes the convenience surface a dashboard shell calls.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api_client::ScreenerApi;
use crate::config::Config;
use crate::dispatch::{BulkActionDispatcher, InterviewKind};
use crate::errors::EngineError;
use crate::export::export_csv;
use crate::models::candidate::CandidateRecord;
use crate::roster::selection::SelectionSet;
use crate::roster::stats::RosterStats;
use crate::roster::store::CandidateStore;
use crate::roster::view::{derive_view, visible_ids, ViewParams};
use crate::upload::controller::UploadJobController;

pub struct Engine {
    pub config: Config,
    pub api: Arc<dyn ScreenerApi>,
    pub store: Arc<CandidateStore>,
    pub uploads: UploadJobController,
    dispatcher: BulkActionDispatcher,
    // tokio Mutex: the guard is held across dispatcher awaits.
    selection: Mutex<SelectionSet>,
}

impl Engine {
    pub fn new(config: Config, api: Arc<dyn ScreenerApi>) -> Self {
        let store = Arc::new(CandidateStore::new(api.clone()));
        let uploads = UploadJobController::new(
            api.clone(),
            store.clone(),
            config.progress_tick,
            config.refresh_delay,
        );
        let dispatcher = BulkActionDispatcher::new(api.clone());
        Self {
            config,
            api,
            store,
            uploads,
            dispatcher,
            selection: Mutex::new(SelectionSet::new()),
        }
    }

    /// Current roster snapshot for view derivation.
    pub fn snapshot(&self) -> Arc<Vec<CandidateRecord>> {
        self.store.records()
    }

    pub async fn load(&self) -> Result<Arc<Vec<CandidateRecord>>, EngineError> {
        self.store.load().await
    }

    pub fn stats(&self) -> RosterStats {
        RosterStats::from_records(&self.snapshot())
    }

    /// Exports the derived view for `params` as a CSV blob.
    pub fn export_view(&self, params: &ViewParams) -> Bytes {
        let snapshot = self.snapshot();
        let view: Vec<CandidateRecord> = derive_view(&snapshot, params)
            .into_iter()
            .cloned()
            .collect();
        export_csv(&view)
    }

    pub async fn toggle_candidate(&self, id: Uuid) -> bool {
        self.selection.lock().await.toggle(id)
    }

    /// Select All / Deselect All against the view derived for `params`.
    pub async fn select_all_visible(&self, params: &ViewParams) -> usize {
        let snapshot = self.snapshot();
        let ids = visible_ids(&derive_view(&snapshot, params));
        let mut selection = self.selection.lock().await;
        selection.select_all_visible(&ids);
        selection.len()
    }

    pub async fn selected_ids(&self) -> Vec<Uuid> {
        self.selection.lock().await.ids()
    }

    pub async fn send_email(&self, subject: &str, body: &str) -> Result<(), EngineError> {
        let mut selection = self.selection.lock().await;
        self.dispatcher
            .send_email(&mut selection, subject, body)
            .await
    }

    pub async fn schedule_interview(
        &self,
        date: &str,
        time: &str,
        kind: InterviewKind,
    ) -> Result<(), EngineError> {
        let mut selection = self.selection.lock().await;
        self.dispatcher
            .schedule_interview(&mut selection, date, time, kind)
            .await
    }

    pub async fn add_tag(&self, tag: &str) -> Result<(), EngineError> {
        let mut selection = self.selection.lock().await;
        self.dispatcher
            .add_tag(&mut selection, &self.store, tag)
            .await
    }
}
