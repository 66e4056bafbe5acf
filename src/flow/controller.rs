// ABOUTME: Scan → lookup → import state machine driving the QR modal
// ABOUTME: Serializes transitions, guards in-flight requests and drops results from a reset flow
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use super::errors::FlowError;
use super::mode::{FlowAction, FlowState, ScanMode};
use super::token::ScanToken;
use crate::api::PetApi;
use crate::cache::{QueryCache, QueryKey};
use crate::camera::{CameraDevice, CameraError, Facing};
use crate::errors::UserFacing;
use crate::scanner::{QrDecoder, QrScanner, ScannerConfig};
use central_vet_core::constants::{endpoints, messages};
use central_vet_core::models::{ImportPetRequest, PetSummary};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Route changes requested by the flow
pub trait Navigator: Send + Sync {
    /// Go to `route` in the host application
    fn navigate(&self, route: &str);
}

/// Collaborators of a flow
#[derive(Clone)]
pub struct FlowDeps {
    /// Pet lookup and import
    pub api: Arc<dyn PetApi>,
    /// Rear camera
    pub camera: Arc<dyn CameraDevice>,
    /// QR decoder
    pub decoder: Arc<dyn QrDecoder>,
    /// Host navigation
    pub navigator: Arc<dyn Navigator>,
    /// Query cache shared with the list views
    pub cache: QueryCache,
    /// Scanner tuning
    pub scanner: ScannerConfig,
}

/// Severity of an inline notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Failure the user can act on
    Error,
    /// Confirmation
    Success,
}

/// Inline message shown under the current step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text
    pub text: String,
}

impl Notice {
    fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }
}

/// Token and edit code submitted together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCredential {
    /// Scanned token
    pub token: ScanToken,
    /// Edit code as entered, trimmed
    pub edit_code: String,
}

impl From<ImportCredential> for ImportPetRequest {
    fn from(credential: ImportCredential) -> Self {
        Self {
            qr_code_token: credential.token.into(),
            edit_code: credential.edit_code,
        }
    }
}

/// Result of handling a decoded payload
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// View mode: the host was sent to the public page and the flow closed
    Navigated {
        /// Route handed to the navigator
        route: String,
    },
    /// Import modes: the pet was found and the flow is at `Info`
    Found(PetSummary),
}

/// Point-in-time view of a flow for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    /// Mode the flow was opened with
    pub mode: ScanMode,
    /// Current step
    pub state: FlowState,
    /// Pet shown at `Info`/`Edit`/`Done`
    pub pet: Option<PetSummary>,
    /// Edit code typed so far
    pub edit_code: String,
    /// Inline notice
    pub notice: Option<Notice>,
    /// Buttons offered
    pub actions: Vec<FlowAction>,
    /// A request of the current step is running
    pub busy: bool,
    /// The flow was closed
    pub closed: bool,
}

struct FlowInner {
    mode: ScanMode,
    state: FlowState,
    closed: bool,
    token: Option<ScanToken>,
    pet: Option<PetSummary>,
    edit_code: String,
    notice: Option<Notice>,
    epoch: u64,
    in_flight: bool,
    armed: bool,
    scanner: QrScanner,
}

impl FlowInner {
    fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.closed {
            return Err(FlowError::Closed);
        }
        if self.in_flight {
            return Err(FlowError::Busy);
        }
        Ok(())
    }

    fn ensure_scanning(&self) -> Result<(), FlowError> {
        self.ensure_idle()?;
        if self.state != FlowState::Scan {
            return Err(FlowError::NotScanning { state: self.state });
        }
        Ok(())
    }

    fn ensure_ready(&self, state: FlowState, action: FlowAction) -> Result<(), FlowError> {
        self.ensure_idle()?;
        if self.state != state {
            return Err(FlowError::InvalidTransition {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn check_epoch(&self, epoch: u64) -> Result<(), FlowError> {
        if self.closed || self.epoch != epoch {
            return Err(FlowError::Cancelled);
        }
        Ok(())
    }

    fn can_import(&self) -> bool {
        self.state == FlowState::Info
            && self
                .pet
                .as_ref()
                .is_some_and(|pet| self.mode.offers_import(pet))
    }

    fn clear_pet(&mut self) {
        self.token = None;
        self.pet = None;
        self.edit_code.clear();
    }

    /// Back to `Scan` with a fresh epoch
    fn reset_to_scan(&mut self) {
        self.clear_pet();
        self.state = FlowState::Scan;
        self.in_flight = false;
        self.epoch += 1;
    }

    /// Restart the camera when the user had started scanning
    async fn rearm(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.scanner.start().await {
            warn!(error = %e, "could not re-arm QR scanner");
            self.armed = false;
        }
    }
}

/// QR scan/import flow
///
/// Clones share the same flow. Every operation takes the internal lock only
/// around state changes; remote calls and the wait for a decoded payload run
/// unlocked so that `close` is never blocked behind them.
#[derive(Clone)]
pub struct ImportFlow {
    inner: Arc<Mutex<FlowInner>>,
    api: Arc<dyn PetApi>,
    navigator: Arc<dyn Navigator>,
    cache: QueryCache,
}

impl ImportFlow {
    /// Open a flow in `Scan`; the camera stays off until [`Self::start_scan`]
    #[must_use]
    pub fn open(mode: ScanMode, deps: FlowDeps) -> Self {
        info!(?mode, "QR flow opened");
        let scanner = QrScanner::new(deps.camera, deps.decoder, deps.scanner);
        Self {
            inner: Arc::new(Mutex::new(FlowInner {
                mode,
                state: FlowState::Scan,
                closed: false,
                token: None,
                pet: None,
                edit_code: String::new(),
                notice: None,
                epoch: 0,
                in_flight: false,
                armed: false,
                scanner,
            })),
            api: deps.api,
            navigator: deps.navigator,
            cache: deps.cache,
        }
    }

    async fn lock(&self) -> MutexGuard<'_, FlowInner> {
        self.inner.lock().await
    }

    /// Turn the camera on
    ///
    /// The camera is acquired without holding the flow, so `close` is not
    /// blocked behind a permission prompt.
    ///
    /// # Errors
    ///
    /// - `FlowError::Camera` when the camera is denied or missing; the flow
    ///   stays in `Scan` with an inline notice
    /// - `FlowError::Cancelled` when the flow was closed or reset while the
    ///   camera was being acquired; the stream is released
    pub async fn start_scan(&self) -> Result<(), FlowError> {
        let (camera, epoch) = {
            let inner = self.lock().await;
            inner.ensure_scanning()?;
            (inner.scanner.device(), inner.epoch)
        };

        let opened = camera.open(Facing::Environment).await;

        let mut inner = self.lock().await;
        let ready = inner
            .check_epoch(epoch)
            .and_then(|()| inner.ensure_scanning());
        match (ready, opened) {
            (Ok(()), Ok(stream)) => {
                inner.scanner.attach(stream).await;
                inner.armed = true;
                Ok(())
            }
            (Ok(()), Err(e)) => {
                warn!(error = %e, "camera unavailable for QR scan");
                inner.notice = Some(Notice::error(e.user_message()));
                Err(e.into())
            }
            (Err(e), opened) => {
                if let Ok(mut stream) = opened {
                    stream.stop();
                }
                debug!(error = %e, "camera acquired after the flow moved on");
                Err(e)
            }
        }
    }

    /// Wait for the scanner's payload and handle it
    ///
    /// # Errors
    ///
    /// `FlowError::Camera(CameraError::Inactive)` when the scanner is off,
    /// `FlowError::Cancelled` when the flow was closed meanwhile, otherwise
    /// see [`Self::handle_decoded`]
    pub async fn next_scan(&self) -> Result<ScanOutcome, FlowError> {
        let (pending, epoch) = {
            let mut inner = self.lock().await;
            inner.ensure_scanning()?;
            let pending = inner
                .scanner
                .take_pending()
                .ok_or(CameraError::Inactive)?;
            (pending, inner.epoch)
        };

        let decoded = match pending.recv().await {
            Ok(text) => text,
            Err(e) => {
                let mut inner = self.lock().await;
                inner.check_epoch(epoch)?;
                inner.notice = Some(Notice::error(e.user_message()));
                return Err(e.into());
            }
        };
        self.handle(&decoded, Some(epoch)).await
    }

    /// Handle a decoded QR payload
    ///
    /// # Errors
    ///
    /// - `FlowError::InvalidToken` when no token is embedded; nothing is sent
    /// - `FlowError::LookupFailed` when the pet cannot be fetched
    /// - `FlowError::Cancelled` when the flow was reset during the lookup
    pub async fn handle_decoded(&self, raw: &str) -> Result<ScanOutcome, FlowError> {
        self.handle(raw, None).await
    }

    async fn handle(&self, raw: &str, expected: Option<u64>) -> Result<ScanOutcome, FlowError> {
        let (token, epoch) = {
            let mut inner = self.lock().await;
            if let Some(epoch) = expected {
                inner.check_epoch(epoch)?;
            }
            inner.ensure_scanning()?;

            let Some(token) = ScanToken::extract(raw) else {
                debug!(len = raw.len(), "decoded text holds no token");
                inner.notice = Some(Notice::error(messages::INVALID_QR));
                inner.rearm().await;
                return Err(FlowError::InvalidToken);
            };

            if !inner.mode.is_import() {
                let route = format!("{}/{token}", endpoints::PUBLIC_PET_ROUTE);
                close_inner(&mut inner).await;
                drop(inner);
                info!(%route, "navigating to public pet page");
                self.navigator.navigate(&route);
                return Ok(ScanOutcome::Navigated { route });
            }

            inner.scanner.stop().await;
            inner.in_flight = true;
            inner.notice = None;
            (token, inner.epoch)
        };

        let result = self.api.lookup_by_token(token.as_str()).await;

        let mut inner = self.lock().await;
        inner.check_epoch(epoch)?;
        inner.in_flight = false;
        match result {
            Ok(pet) => {
                info!(pet_id = pet.profile().id, access = ?pet.access_level(), "pet found");
                inner.token = Some(token);
                inner.pet = Some(pet.clone());
                inner.state = FlowState::Info;
                Ok(ScanOutcome::Found(pet))
            }
            Err(e) => {
                warn!(error = %e, "pet lookup failed");
                inner.notice = Some(Notice::error(messages::PET_NOT_FOUND));
                inner.rearm().await;
                Err(FlowError::LookupFailed(e))
            }
        }
    }

    /// Whether "Importar" is offered right now
    pub async fn can_import(&self) -> bool {
        self.lock().await.can_import()
    }

    /// Buttons offered right now
    pub async fn available_actions(&self) -> Vec<FlowAction> {
        let inner = self.lock().await;
        if inner.closed {
            return Vec::new();
        }
        FlowAction::available(inner.state, inner.mode, inner.pet.as_ref())
    }

    /// `Edit → Info` keeping the code, or `Info → Scan` discarding the pet
    ///
    /// # Errors
    ///
    /// `FlowError::InvalidTransition` at `Scan` and `Done`
    pub async fn back(&self) -> Result<FlowState, FlowError> {
        let mut inner = self.lock().await;
        let state = inner.state;
        match state {
            FlowState::Edit => {
                inner.ensure_ready(FlowState::Edit, FlowAction::Back)?;
                inner.state = FlowState::Info;
            }
            FlowState::Info => {
                inner.ensure_ready(FlowState::Info, FlowAction::Back)?;
                inner.reset_to_scan();
                inner.rearm().await;
            }
            FlowState::Scan | FlowState::Done => {
                return Err(FlowError::InvalidTransition {
                    state,
                    action: FlowAction::Back,
                });
            }
        }
        inner.notice = None;
        debug!(from = %state, to = %inner.state, "flow went back");
        Ok(inner.state)
    }

    /// `Info → Edit`
    ///
    /// # Errors
    ///
    /// `FlowError::ImportNotAllowed` when the pet cannot be imported in this mode
    pub async fn begin_import(&self) -> Result<(), FlowError> {
        let mut inner = self.lock().await;
        inner.ensure_ready(FlowState::Info, FlowAction::Import)?;
        if !inner.can_import() {
            return Err(FlowError::ImportNotAllowed);
        }
        inner.state = FlowState::Edit;
        inner.notice = None;
        Ok(())
    }

    /// Replace the edit code being typed
    ///
    /// # Errors
    ///
    /// `FlowError::InvalidTransition` outside `Edit`, `FlowError::Busy` while submitting
    pub async fn set_edit_code(&self, code: impl Into<String>) -> Result<(), FlowError> {
        let mut inner = self.lock().await;
        inner.ensure_ready(FlowState::Edit, FlowAction::Confirm)?;
        inner.edit_code = code.into();
        Ok(())
    }

    /// Submit token and edit code
    ///
    /// # Errors
    ///
    /// - `FlowError::EmptyEditCode` for a blank code; nothing is sent
    /// - `FlowError::ImportRejected` with the server's message; the flow
    ///   stays in `Edit` with the code kept
    /// - `FlowError::Busy` while a submit is running
    pub async fn submit_import(&self) -> Result<(), FlowError> {
        let (credential, epoch) = {
            let mut inner = self.lock().await;
            inner.ensure_ready(FlowState::Edit, FlowAction::Confirm)?;
            let code = inner.edit_code.trim().to_owned();
            if code.is_empty() {
                inner.notice = Some(Notice::error(messages::EDIT_CODE_REQUIRED));
                return Err(FlowError::EmptyEditCode);
            }
            let Some(token) = inner.token.clone() else {
                return Err(FlowError::InvalidTransition {
                    state: inner.state,
                    action: FlowAction::Confirm,
                });
            };
            inner.in_flight = true;
            inner.notice = None;
            (
                ImportCredential {
                    token,
                    edit_code: code,
                },
                inner.epoch,
            )
        };

        let result = self.api.import_pet(&credential.into()).await;

        let mut inner = self.lock().await;
        inner.check_epoch(epoch)?;
        inner.in_flight = false;
        match result {
            Ok(()) => {
                let removed = self.cache.invalidate(&QueryKey::pets()).await;
                info!(removed, "pet imported");
                inner.state = FlowState::Done;
                inner.notice = Some(Notice::success(messages::IMPORT_SUCCEEDED));
                Ok(())
            }
            Err(e) => {
                let message = e.message_or(messages::IMPORT_FAILED).to_owned();
                warn!(error = %e, "pet import rejected");
                inner.notice = Some(Notice::error(message.clone()));
                Err(FlowError::ImportRejected { message, source: e })
            }
        }
    }

    /// `Done → Scan` with a clean slate
    ///
    /// # Errors
    ///
    /// `FlowError::InvalidTransition` outside `Done`
    pub async fn scan_another(&self) -> Result<(), FlowError> {
        let mut inner = self.lock().await;
        inner.ensure_ready(FlowState::Done, FlowAction::ScanAnother)?;
        inner.reset_to_scan();
        inner.notice = None;
        inner.rearm().await;
        Ok(())
    }

    /// Close the flow, releasing the camera before returning
    pub async fn close(&self) {
        let mut inner = self.lock().await;
        if !inner.closed {
            close_inner(&mut inner).await;
            info!("QR flow closed");
        }
    }

    /// Whether the flow was closed
    pub async fn is_closed(&self) -> bool {
        self.lock().await.closed
    }

    /// Current step
    pub async fn state(&self) -> FlowState {
        self.lock().await.state
    }

    /// Mode the flow was opened with
    pub async fn mode(&self) -> ScanMode {
        self.lock().await.mode
    }

    /// Whether the camera is on
    pub async fn scanning(&self) -> bool {
        self.lock().await.scanner.is_active()
    }

    /// Everything needed to render the flow
    pub async fn snapshot(&self) -> FlowSnapshot {
        let inner = self.lock().await;
        FlowSnapshot {
            mode: inner.mode,
            state: inner.state,
            pet: inner.pet.clone(),
            edit_code: inner.edit_code.clone(),
            notice: inner.notice.clone(),
            actions: if inner.closed {
                Vec::new()
            } else {
                FlowAction::available(inner.state, inner.mode, inner.pet.as_ref())
            },
            busy: inner.in_flight,
            closed: inner.closed,
        }
    }
}

async fn close_inner(inner: &mut FlowInner) {
    inner.scanner.stop().await;
    inner.armed = false;
    inner.reset_to_scan();
    inner.notice = None;
    inner.closed = true;
}
