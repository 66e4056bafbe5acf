// ABOUTME: Shared test utilities for integration tests
// ABOUTME: In-memory API fakes, a recording navigator, a scripted face model and pet builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `central_vet`

use async_trait::async_trait;
use central_vet::api::{AccountApi, PetApi};
use central_vet::cache::QueryCache;
use central_vet::camera::{CameraDevice, CameraError, Facing, ScriptedCamera, VideoStream};
use central_vet::errors::{ApiError, ApiResult};
use central_vet::face::{EncodedImage, FaceError, FaceLandmarker, FaceLandmarks, LandmarkerLoader, Point};
use central_vet::flow::{FlowDeps, Navigator};
use central_vet::models::{
    ClinicDto, ImportPetRequest, PetSummary, PublicPetDto, RegisterVetWithFaceRequest, Role,
    UserDto,
};
use central_vet::scanner::{ScannerConfig, TextDecoder};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use tokio::sync::Semaphore;

static INIT_LOGGER: Once = Once::new();

/// Token printed on the test tags
pub const TOKEN: &str = "3f2b8c1e-9a4d-4e7f-8b6a-1c2d3e4f5a6b";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Public pet DTO as the lookup endpoint would send it
pub fn pet_json(access: &str, can_be_imported: bool) -> serde_json::Value {
    json!({
        "id": 42,
        "name": "Luna",
        "species": "Perro",
        "breed": "Mestizo",
        "sex": "FEMALE",
        "status": "OK",
        "birthdate": "2021-03-04",
        "visibility": "PUBLIC",
        "ownerName": "Ana Pérez",
        "ownerContact": "+56 9 1234 5678",
        "canBeImported": can_be_imported,
        "accessLevelEnum": access,
        "qrCodeToken": TOKEN,
    })
}

/// Validated pet with the given access tag
pub fn pet(access: &str, can_be_imported: bool) -> PetSummary {
    let dto: PublicPetDto = serde_json::from_value(pet_json(access, can_be_imported)).unwrap();
    PetSummary::try_from(dto).unwrap()
}

/// Pet API fake with scripted answers and call counters
pub struct FakePetApi {
    lookup: Mutex<ApiResult<PetSummary>>,
    import: Mutex<ApiResult<()>>,
    delay: Duration,
    pub lookups: AtomicUsize,
    pub imports: Mutex<Vec<ImportPetRequest>>,
    pub looked_up: Mutex<Vec<String>>,
}

impl FakePetApi {
    pub fn returning(pet: PetSummary) -> Self {
        Self::build(Ok(pet), Duration::ZERO)
    }

    pub fn not_found() -> Self {
        Self::build(
            Err(ApiError::NotFound {
                resource: "pet".to_owned(),
            }),
            Duration::ZERO,
        )
    }

    /// Lookups take `delay` before answering
    pub fn slow(pet: PetSummary, delay: Duration) -> Self {
        Self::build(Ok(pet), delay)
    }

    fn build(lookup: ApiResult<PetSummary>, delay: Duration) -> Self {
        Self {
            lookup: Mutex::new(lookup),
            import: Mutex::new(Ok(())),
            delay,
            lookups: AtomicUsize::new(0),
            imports: Mutex::new(Vec::new()),
            looked_up: Mutex::new(Vec::new()),
        }
    }

    pub fn set_import_result(&self, result: ApiResult<()>) {
        *self.import.lock().unwrap() = result;
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn import_requests(&self) -> Vec<ImportPetRequest> {
        self.imports.lock().unwrap().clone()
    }
}

#[async_trait]
impl PetApi for FakePetApi {
    async fn lookup_by_token(&self, token: &str) -> ApiResult<PetSummary> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.looked_up.lock().unwrap().push(token.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.lookup.lock().unwrap().clone()
    }

    async fn import_pet(&self, request: &ImportPetRequest) -> ApiResult<()> {
        self.imports.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.import.lock().unwrap().clone()
    }
}

/// Navigator remembering every route it was sent to
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

/// Flow collaborators over the given fakes
pub fn flow_deps(
    api: &Arc<FakePetApi>,
    camera: &ScriptedCamera,
    navigator: &Arc<RecordingNavigator>,
    cache: QueryCache,
) -> FlowDeps {
    FlowDeps {
        api: Arc::clone(api) as Arc<dyn PetApi>,
        camera: Arc::new(camera.clone()),
        decoder: Arc::new(TextDecoder),
        navigator: Arc::clone(navigator) as Arc<dyn Navigator>,
        cache,
        scanner: ScannerConfig { fps: 50 },
    }
}

/// Camera delivering frames every millisecond
pub fn fast_camera() -> ScriptedCamera {
    ScriptedCamera::new(Duration::from_millis(1))
}

/// Camera whose `open` waits for [`GatedCamera::grant`], like a permission prompt
#[derive(Clone)]
pub struct GatedCamera {
    pub inner: ScriptedCamera,
    gate: Arc<Semaphore>,
    waiting: Arc<AtomicUsize>,
}

impl GatedCamera {
    pub fn new(inner: ScriptedCamera) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
            waiting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let one pending `open` through
    pub fn grant(&self) {
        self.gate.add_permits(1);
    }

    /// Opens that reached the prompt
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for GatedCamera {
    async fn open(&self, facing: Facing) -> Result<Box<dyn VideoStream>, CameraError> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        self.gate
            .acquire()
            .await
            .map_err(|e| CameraError::Unavailable(e.to_string()))?
            .forget();
        self.inner.open(facing).await
    }
}

/// Landmarker that sees a face in every image starting with `face` and two
/// faces in every image starting with `twofaces`
#[derive(Default)]
pub struct FakeLandmarker {
    pub calls: AtomicUsize,
}

impl FakeLandmarker {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FaceLandmarker for FakeLandmarker {
    fn detect(&self, image: &EncodedImage) -> Result<Vec<FaceLandmarks>, FaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let face = FaceLandmarks {
            points: vec![Point { x: 0.5, y: 0.5 }, Point { x: 0.25, y: 0.75 }],
        };
        if image.bytes.starts_with(b"twofaces") {
            Ok(vec![face.clone(), face])
        } else if image.bytes.starts_with(b"face") {
            Ok(vec![face])
        } else {
            Ok(Vec::new())
        }
    }
}

/// Loader resolving after `delay`, or failing when `failure` is set
pub struct FakeLoader {
    pub landmarker: Arc<FakeLandmarker>,
    pub delay: Duration,
    pub failure: Option<String>,
    pub requested_faces: AtomicUsize,
}

impl FakeLoader {
    pub fn ready() -> Self {
        Self {
            landmarker: Arc::new(FakeLandmarker::default()),
            delay: Duration::ZERO,
            failure: None,
            requested_faces: AtomicUsize::new(0),
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ready()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_owned()),
            ..Self::ready()
        }
    }
}

#[async_trait]
impl LandmarkerLoader for FakeLoader {
    async fn load(
        &self,
        _model_url: &str,
        max_faces: usize,
    ) -> Result<Arc<dyn FaceLandmarker>, FaceError> {
        self.requested_faces.store(max_faces, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.failure {
            Some(reason) => Err(FaceError::ModelFailed(reason.clone())),
            None => Ok(Arc::clone(&self.landmarker) as Arc<dyn FaceLandmarker>),
        }
    }
}

/// Account API fake recording registrations
pub struct FakeAccountApi {
    register: Mutex<ApiResult<()>>,
    pub registrations: Mutex<Vec<RegisterVetWithFaceRequest>>,
}

impl Default for FakeAccountApi {
    fn default() -> Self {
        Self {
            register: Mutex::new(Ok(())),
            registrations: Mutex::new(Vec::new()),
        }
    }
}

impl FakeAccountApi {
    pub fn set_register_result(&self, result: ApiResult<()>) {
        *self.register.lock().unwrap() = result;
    }

    pub fn registered(&self) -> Vec<RegisterVetWithFaceRequest> {
        self.registrations.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountApi for FakeAccountApi {
    async fn whoami(&self) -> ApiResult<UserDto> {
        Ok(UserDto {
            id: 1,
            username: "dra.soto".to_owned(),
            role_name: Role::Vet,
        })
    }

    async fn clinics(&self) -> ApiResult<Vec<ClinicDto>> {
        Ok(vec![ClinicDto {
            id: 4,
            name: "Clínica Sur".to_owned(),
            address: None,
            latitude: -33.45,
            longitude: -70.66,
            email: None,
        }])
    }

    async fn register_vet_with_face(&self, request: &RegisterVetWithFaceRequest) -> ApiResult<()> {
        self.registrations.lock().unwrap().push(request.clone());
        self.register.lock().unwrap().clone()
    }
}
