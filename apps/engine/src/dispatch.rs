//! Bulk Action Dispatcher: batched email, interview-scheduling, and tagging
//! requests against the current selection.
//!
//! Every action validates a non-empty selection before anything is sent,
//! issues exactly one request carrying the full id list, and is
//! all-or-nothing from the engine's point of view (the remote contract
//! returns a single status). Success clears the selection; failure retains
//! it so the user can retry without reselecting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api_client::ScreenerApi;
use crate::errors::EngineError;
use crate::roster::selection::SelectionSet;
use crate::roster::store::CandidateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewKind {
    Video,
    Phone,
    #[serde(rename = "inperson")]
    InPerson,
}

pub struct BulkActionDispatcher {
    api: Arc<dyn ScreenerApi>,
}

impl BulkActionDispatcher {
    pub fn new(api: Arc<dyn ScreenerApi>) -> Self {
        Self { api }
    }

    pub async fn send_email(
        &self,
        selection: &mut SelectionSet,
        subject: &str,
        body: &str,
    ) -> Result<(), EngineError> {
        let ids = require_selection(selection)?;
        self.api.dispatch_email(&ids, subject, body).await?;
        info!("Email dispatched to {} candidates", ids.len());
        selection.clear();
        Ok(())
    }

    pub async fn schedule_interview(
        &self,
        selection: &mut SelectionSet,
        date: &str,
        time: &str,
        kind: InterviewKind,
    ) -> Result<(), EngineError> {
        let ids = require_selection(selection)?;
        self.api.dispatch_interview(&ids, date, time, kind).await?;
        info!("Interview scheduled for {} candidates", ids.len());
        selection.clear();
        Ok(())
    }

    /// On success the tag is also applied to the store, so callers observe it
    /// without waiting for the next full load.
    pub async fn add_tag(
        &self,
        selection: &mut SelectionSet,
        store: &CandidateStore,
        tag: &str,
    ) -> Result<(), EngineError> {
        if tag.trim().is_empty() {
            return Err(EngineError::Validation("tag must not be blank".to_string()));
        }
        let ids = require_selection(selection)?;
        self.api.dispatch_tag(&ids, tag).await?;
        info!("Tag '{tag}' dispatched to {} candidates", ids.len());
        store.apply_tag_mutation(&ids, tag);
        selection.clear();
        Ok(())
    }
}

fn require_selection(selection: &SelectionSet) -> Result<Vec<uuid::Uuid>, EngineError> {
    if selection.is_empty() {
        return Err(EngineError::Validation(
            "no candidates selected".to_string(),
        ));
    }
    Ok(selection.ids())
}
