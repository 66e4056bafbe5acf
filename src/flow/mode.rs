// ABOUTME: Scan modes, flow steps and the actions offered at each step
// ABOUTME: Import is offered to vets always and to owners only for unclaimed pets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use central_vet_core::models::{PetSummary, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a scan is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    /// Open the public page of the scanned pet
    View,
    /// A clinic adds the pet to its patients
    ImportVet,
    /// An owner claims the pet
    ImportOwner,
}

impl ScanMode {
    /// Mode for a signed-in role; anonymous visitors only view
    #[must_use]
    pub const fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Vet | Role::Admin) => Self::ImportVet,
            Some(Role::PetOwner) => Self::ImportOwner,
            None => Self::View,
        }
    }

    /// Whether "Importar" is offered for `pet` in this mode
    #[must_use]
    pub const fn offers_import(self, pet: &PetSummary) -> bool {
        match self {
            Self::ImportVet => true,
            Self::ImportOwner => pet.can_be_imported(),
            Self::View => false,
        }
    }

    /// Lookup happens in this mode (as opposed to navigating away)
    #[must_use]
    pub const fn is_import(self) -> bool {
        !matches!(self, Self::View)
    }
}

/// Step of the scan/import flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    /// Camera preview, waiting for a code
    Scan,
    /// Pet found, summary shown
    Info,
    /// Entering the edit code
    Edit,
    /// Import finished
    Done,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scan => "scan",
            Self::Info => "info",
            Self::Edit => "edit",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Buttons the flow offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowAction {
    /// `Info → Edit`
    Import,
    /// `Edit → Info`, `Info → Scan`
    Back,
    /// Submit the edit code
    Confirm,
    /// `Done → Scan`
    ScanAnother,
    /// Close the flow
    Close,
}

impl FlowAction {
    /// Button label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Import => "Importar",
            Self::Back => "← Volver",
            Self::Confirm => "Confirmar",
            Self::ScanAnother => "Escanear otro",
            Self::Close => "✕ Cerrar",
        }
    }

    /// Actions offered at `state`; `pet` is the summary shown at `Info`
    #[must_use]
    pub fn available(state: FlowState, mode: ScanMode, pet: Option<&PetSummary>) -> Vec<Self> {
        match state {
            FlowState::Scan => vec![Self::Close],
            FlowState::Info if pet.is_some_and(|p| mode.offers_import(p)) => {
                vec![Self::Back, Self::Import, Self::Close]
            }
            FlowState::Info => vec![Self::Back, Self::Close],
            FlowState::Edit => vec![Self::Back, Self::Confirm, Self::Close],
            FlowState::Done => vec![Self::ScanAnother, Self::Close],
        }
    }
}

impl fmt::Display for FlowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
