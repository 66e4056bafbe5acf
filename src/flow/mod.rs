// ABOUTME: QR scan → lookup → role-gated import flow
// ABOUTME: Re-exports the controller, its modes and errors, and token extraction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

//! # Import flow
//!
//! ```text
//! Scan ──decode──▶ Info ──Importar──▶ Edit ──Confirmar──▶ Done
//!   ▲               │                  │                   │
//!   └────Volver─────┘◀─────Volver──────┘                   │
//!   └──────────────────────Escanear otro───────────────────┘
//! ```
//!
//! In `View` mode a valid scan navigates to the public pet page instead of
//! entering `Info`.

mod controller;
mod errors;
mod mode;
mod token;

pub use controller::{
    FlowDeps, FlowSnapshot, ImportCredential, ImportFlow, Navigator, Notice, NoticeLevel,
    ScanOutcome,
};
pub use errors::FlowError;
pub use mode::{FlowAction, FlowState, ScanMode};
pub use token::ScanToken;
