// ABOUTME: Constants for the Central Vet client organized by domain
// ABOUTME: API paths, query cache keys, scanner/face defaults and user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! Constants module
//!
//! Pure data constants grouped by domain.

/// Clinic API paths
pub mod endpoints {
    /// Public lookup of a pet by its QR token (`{token}` appended)
    pub const PUBLIC_PET_BY_QR: &str = "/api/public/pets/qr";
    /// Import (claim) a pet with its edit code
    pub const PET_IMPORT: &str = "/api/pets/import";
    /// Pets visible to the current user
    pub const PETS: &str = "/api/pets";
    /// Current user
    pub const WHOAMI: &str = "/api/auth/whoami";
    /// Vet registration with face image
    pub const VET_WITH_FACE: &str = "/api/auth/vet-with-face";
    /// Clinic registry
    pub const CLINICS: &str = "/api/clinics";
    /// Public detail route of the web app (`{token}` appended)
    pub const PUBLIC_PET_ROUTE: &str = "/qr";
}

/// Query cache keys
pub mod query_keys {
    /// Pet list family, invalidated after a successful import
    pub const PETS: &str = "pets";
    /// Owner detail family (`[OWNER_DETAIL, pet_id]`)
    pub const OWNER_DETAIL: &str = "ownerDetail";
    /// Home clinic family (`[CLINIC_DETAIL, pet_id]`)
    pub const CLINIC_DETAIL: &str = "clinicDetail";
    /// Clinic registry
    pub const CLINICS: &str = "clinics";
}

/// Camera and decoder defaults
pub mod scanner {
    /// Decode attempts per second
    pub const DEFAULT_FPS: u32 = 10;
    /// Upper bound accepted from configuration
    pub const MAX_FPS: u32 = 60;
}

/// Face-landmark detection defaults
pub mod face {
    /// Minimum interval between two live detections in milliseconds
    pub const DEFAULT_DETECT_INTERVAL_MS: u64 = 80;
    /// Face landmark model asset
    pub const DEFAULT_MODEL_URL: &str = "https://storage.googleapis.com/mediapipe-models/face_landmarker/face_landmarker/float16/1/face_landmarker.task";
    /// Faces searched per image
    pub const MAX_FACES: usize = 1;
    /// MIME type used for captured frames
    pub const CAPTURE_MIME: &str = "image/jpeg";
}

/// Cache lifetimes
pub mod cache {
    /// Staleness window for pet list and detail queries
    pub const DEFAULT_STALE_SECS: u64 = 300;
    /// Entries kept before LRU eviction
    pub const DEFAULT_MAX_ENTRIES: usize = 256;
}

/// User-facing messages shown inline by the UI
pub mod messages {
    /// Decoded text holds no token
    pub const INVALID_QR: &str = "QR inválido";
    /// Lookup by token failed
    pub const PET_NOT_FOUND: &str = "Mascota no encontrada";
    /// Import attempted without edit code
    pub const EDIT_CODE_REQUIRED: &str = "Ingresa el código de edición";
    /// Import failed without server message
    pub const IMPORT_FAILED: &str = "Error al importar";
    /// Import succeeded
    pub const IMPORT_SUCCEEDED: &str = "Importación exitosa";
    /// Import not offered for this pet in this mode
    pub const IMPORT_NOT_ALLOWED: &str = "Esta mascota no puede ser importada";
    /// Camera permission denied or no device
    pub const CAMERA_UNAVAILABLE: &str = "No se pudo acceder a la cámara (HTTPS/permisos).";
    /// Face model still loading
    pub const FACE_MODEL_LOADING: &str = "Cargando modelo de rostro, intenta en un momento…";
    /// Face model failed to load
    pub const FACE_MODEL_FAILED: &str = "No se pudo cargar el modelo de rostro";
    /// No face in the live preview
    pub const NO_FACE_LIVE: &str = "No se detectó rostro.";
    /// No face in the captured photo
    pub const NO_FACE_PHOTO: &str = "No se detectó rostro en la foto tomada.";
    /// No face in the uploaded image
    pub const NO_FACE_UPLOAD: &str = "No se detectó rostro en la imagen cargada.";
    /// More than one face in the image
    pub const MULTIPLE_FACES: &str = "Se detectó más de un rostro, debe aparecer solo uno.";
    /// Registration submitted without a valid face
    pub const FACE_REQUIRED: &str = "Necesitas una imagen con rostro válido.";
    /// Another request of this step is still running
    pub const BUSY: &str = "Operación en curso, espera un momento";
}
