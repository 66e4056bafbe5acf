// ABOUTME: QR modal provider holding at most one open import flow
// ABOUTME: Opening a new flow closes the previous one and releases its camera first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use crate::flow::{FlowDeps, ImportFlow, ScanMode};
use central_vet_core::models::Role;
use tokio::sync::Mutex;
use tracing::debug;

/// Whether the modal is shown, and in which mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// Hidden
    Closed,
    /// Shown with a flow in this mode
    Open(ScanMode),
}

/// Owner of the single QR flow of the application
pub struct QrModal {
    deps: FlowDeps,
    current: Mutex<Option<ImportFlow>>,
}

impl QrModal {
    /// Provider creating flows with `deps`
    #[must_use]
    pub fn new(deps: FlowDeps) -> Self {
        Self {
            deps,
            current: Mutex::new(None),
        }
    }

    /// Show the modal in `mode`, replacing any open flow
    pub async fn open(&self, mode: ScanMode) -> ImportFlow {
        let mut current = self.current.lock().await;
        if let Some(previous) = current.take() {
            debug!("closing previous QR flow");
            previous.close().await;
        }
        let flow = ImportFlow::open(mode, self.deps.clone());
        *current = Some(flow.clone());
        flow
    }

    /// Show the modal in the mode matching `role`
    pub async fn open_for_role(&self, role: Option<Role>) -> ImportFlow {
        self.open(ScanMode::for_role(role)).await
    }

    /// Hide the modal, closing its flow
    pub async fn close(&self) {
        if let Some(flow) = self.current.lock().await.take() {
            flow.close().await;
        }
    }

    /// The open flow, if any
    pub async fn current(&self) -> Option<ImportFlow> {
        let current = self.current.lock().await;
        match current.as_ref() {
            Some(flow) if !flow.is_closed().await => Some(flow.clone()),
            _ => None,
        }
    }

    /// Modal visibility; a flow that closed itself counts as closed
    pub async fn state(&self) -> ModalState {
        match self.current().await {
            Some(flow) => ModalState::Open(flow.mode().await),
            None => ModalState::Closed,
        }
    }
}
