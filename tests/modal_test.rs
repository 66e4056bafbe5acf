// ABOUTME: Integration tests for the QR modal provider
// ABOUTME: One flow open at a time, role-derived modes and camera release on close
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use central_vet::cache::QueryCache;
use central_vet::camera::ScriptedCamera;
use central_vet::flow::ScanMode;
use central_vet::modal::{ModalState, QrModal};
use central_vet::models::Role;
use common::{fast_camera, flow_deps, init_test_logging, pet, FakePetApi, RecordingNavigator, TOKEN};
use std::sync::Arc;

fn modal() -> (QrModal, ScriptedCamera) {
    init_test_logging();
    let api = Arc::new(FakePetApi::returning(pet("FULL", false)));
    let camera = fast_camera();
    let navigator = Arc::new(RecordingNavigator::default());
    let deps = flow_deps(&api, &camera, &navigator, QueryCache::default());
    (QrModal::new(deps), camera)
}

#[tokio::test]
async fn test_mode_follows_role() {
    let (modal, _) = modal();
    assert_eq!(modal.state().await, ModalState::Closed);

    modal.open_for_role(Some(Role::Vet)).await;
    assert_eq!(modal.state().await, ModalState::Open(ScanMode::ImportVet));

    modal.open_for_role(Some(Role::PetOwner)).await;
    assert_eq!(modal.state().await, ModalState::Open(ScanMode::ImportOwner));

    modal.open_for_role(None).await;
    assert_eq!(modal.state().await, ModalState::Open(ScanMode::View));
}

#[tokio::test]
async fn test_opening_again_closes_previous_flow() {
    let (modal, camera) = modal();
    let first = modal.open(ScanMode::ImportVet).await;
    first.start_scan().await.unwrap();
    assert_eq!(camera.live_streams(), 1);

    let second = modal.open(ScanMode::ImportOwner).await;
    assert!(first.is_closed().await);
    assert!(!second.is_closed().await);
    assert_eq!(camera.live_streams(), 0);
}

#[tokio::test]
async fn test_close_releases_camera_and_clears_current() {
    let (modal, camera) = modal();
    let flow = modal.open(ScanMode::ImportVet).await;
    flow.start_scan().await.unwrap();

    modal.close().await;
    assert!(modal.current().await.is_none());
    assert_eq!(modal.state().await, ModalState::Closed);
    assert_eq!(camera.live_streams(), 0);
    modal.close().await;
}

#[tokio::test]
async fn test_flow_closing_itself_closes_modal() {
    let (modal, _) = modal();
    let flow = modal.open(ScanMode::View).await;
    flow.handle_decoded(TOKEN).await.unwrap();
    assert_eq!(modal.state().await, ModalState::Closed);
}
