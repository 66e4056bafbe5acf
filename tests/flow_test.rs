// ABOUTME: Integration tests for the QR scan/import flow
// ABOUTME: Covers token extraction, role gating, import outcomes, close and stale-result handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use central_vet::cache::{QueryCache, QueryKey};
use central_vet::camera::{CameraError, ScriptedCamera};
use central_vet::constants::messages;
use central_vet::errors::ApiError;
use central_vet::flow::{
    FlowAction, FlowError, FlowState, ImportFlow, NoticeLevel, ScanMode, ScanOutcome,
};
use common::{
    fast_camera, flow_deps, init_test_logging, pet, FakePetApi, GatedCamera, RecordingNavigator,
    TOKEN,
};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    flow: ImportFlow,
    api: Arc<FakePetApi>,
    camera: ScriptedCamera,
    navigator: Arc<RecordingNavigator>,
    cache: QueryCache,
}

fn harness(mode: ScanMode, api: FakePetApi) -> Harness {
    harness_with_camera(mode, api, fast_camera())
}

fn harness_with_camera(mode: ScanMode, api: FakePetApi, camera: ScriptedCamera) -> Harness {
    init_test_logging();
    let api = Arc::new(api);
    let navigator = Arc::new(RecordingNavigator::default());
    let cache = QueryCache::default();
    let flow = ImportFlow::open(mode, flow_deps(&api, &camera, &navigator, cache.clone()));
    Harness {
        flow,
        api,
        camera,
        navigator,
        cache,
    }
}

async fn to_edit(h: &Harness) {
    h.flow.handle_decoded(TOKEN).await.unwrap();
    h.flow.begin_import().await.unwrap();
}

#[tokio::test]
async fn test_view_mode_navigates_to_public_page() {
    let h = harness(ScanMode::View, FakePetApi::returning(pet("NONE", false)));
    h.flow.start_scan().await.unwrap();
    let printed = TOKEN.to_uppercase();
    h.camera.show(format!("https://centralvet.cl/qr/{printed}"));

    let outcome = h.flow.next_scan().await.unwrap();

    let route = format!("/qr/{printed}");
    assert_eq!(outcome, ScanOutcome::Navigated { route: route.clone() });
    assert_eq!(h.navigator.routes(), vec![route]);
    assert_eq!(h.api.lookup_count(), 0);
    assert!(h.flow.is_closed().await);
    assert_eq!(h.camera.live_streams(), 0);
}

#[tokio::test]
async fn test_text_without_token_does_not_look_up() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.flow.start_scan().await.unwrap();
    h.camera.show("https://centralvet.cl/qr/not-a-token");

    let err = h.flow.next_scan().await.unwrap_err();
    assert_eq!(err, FlowError::InvalidToken);
    assert_eq!(h.api.lookup_count(), 0);

    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Scan);
    assert_eq!(snapshot.notice.unwrap().text, messages::INVALID_QR);
    assert!(h.flow.scanning().await, "scanner should be re-armed");

    h.camera.show(format!("Luna {TOKEN}"));
    let outcome = h.flow.next_scan().await.unwrap();
    assert!(matches!(outcome, ScanOutcome::Found(_)));
    assert_eq!(h.api.looked_up.lock().unwrap().clone(), vec![TOKEN.to_owned()]);
}

#[tokio::test]
async fn test_owner_cannot_import_claimed_pet() {
    let h = harness(ScanMode::ImportOwner, FakePetApi::returning(pet("NONE", false)));
    h.flow.handle_decoded(TOKEN).await.unwrap();

    assert_eq!(h.flow.state().await, FlowState::Info);
    assert!(!h.flow.can_import().await);
    assert_eq!(
        h.flow.available_actions().await,
        vec![FlowAction::Back, FlowAction::Close]
    );
    assert_eq!(
        h.flow.begin_import().await.unwrap_err(),
        FlowError::ImportNotAllowed
    );
    assert_eq!(h.flow.state().await, FlowState::Info);
}

#[tokio::test]
async fn test_owner_can_import_unclaimed_pet() {
    let h = harness(ScanMode::ImportOwner, FakePetApi::returning(pet("NONE", true)));
    h.flow.handle_decoded(TOKEN).await.unwrap();
    assert!(h.flow.can_import().await);
    h.flow.begin_import().await.unwrap();
    assert_eq!(h.flow.state().await, FlowState::Edit);
}

#[tokio::test]
async fn test_vet_is_offered_import_regardless_of_flag() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("WRITE", false)));
    h.flow.handle_decoded(TOKEN).await.unwrap();
    assert!(h.flow.can_import().await);
    assert!(h.flow.available_actions().await.contains(&FlowAction::Import));
}

#[tokio::test]
async fn test_rejected_import_stays_in_edit_with_code() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.api.set_import_result(Err(ApiError::Rejected {
        status: 400,
        message: Some("Código de edición incorrecto".to_owned()),
    }));
    to_edit(&h).await;
    h.flow.set_edit_code(" 000000 ").await.unwrap();

    let err = h.flow.submit_import().await.unwrap_err();
    assert!(matches!(
        &err,
        FlowError::ImportRejected { message, .. } if message == "Código de edición incorrecto"
    ));

    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Edit);
    assert_eq!(snapshot.edit_code, " 000000 ");
    let notice = snapshot.notice.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.text, "Código de edición incorrecto");

    let sent = h.api.import_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].qr_code_token, TOKEN);
    assert_eq!(sent[0].edit_code, "000000");
}

#[tokio::test]
async fn test_rejection_without_message_uses_generic_text() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.api.set_import_result(Err(ApiError::Server {
        status: 500,
        message: None,
    }));
    to_edit(&h).await;
    h.flow.set_edit_code("123456").await.unwrap();

    let err = h.flow.submit_import().await.unwrap_err();
    assert!(matches!(err, FlowError::ImportRejected { message, .. } if message == messages::IMPORT_FAILED));
}

#[tokio::test]
async fn test_blank_edit_code_is_not_sent() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    to_edit(&h).await;
    h.flow.set_edit_code("   ").await.unwrap();

    assert_eq!(
        h.flow.submit_import().await.unwrap_err(),
        FlowError::EmptyEditCode
    );
    assert!(h.api.import_requests().is_empty());
    assert_eq!(
        h.flow.snapshot().await.notice.unwrap().text,
        messages::EDIT_CODE_REQUIRED
    );
}

#[tokio::test]
async fn test_successful_import_invalidates_pet_list() {
    let h = harness(ScanMode::ImportOwner, FakePetApi::returning(pet("NONE", true)));
    h.cache.set(QueryKey::pets(), &vec![1, 2, 3]).await.unwrap();
    let owner_key = QueryKey::new(["ownerDetail", "42"]);
    h.cache.set(owner_key.clone(), &"Ana").await.unwrap();

    to_edit(&h).await;
    h.flow.set_edit_code("123456").await.unwrap();
    h.flow.submit_import().await.unwrap();

    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Done);
    let notice = snapshot.notice.unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.text, messages::IMPORT_SUCCEEDED);
    assert_eq!(
        snapshot.actions,
        vec![FlowAction::ScanAnother, FlowAction::Close]
    );
    assert!(!h.cache.contains(&QueryKey::pets()).await);
    assert!(h.cache.contains(&owner_key).await);

    h.flow.scan_another().await.unwrap();
    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Scan);
    assert!(snapshot.pet.is_none());
    assert!(snapshot.edit_code.is_empty());
    assert!(snapshot.notice.is_none());
}

#[tokio::test]
async fn test_back_from_edit_keeps_code_and_back_from_info_rearms() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.flow.start_scan().await.unwrap();
    h.camera.show(TOKEN);
    h.flow.next_scan().await.unwrap();
    assert!(!h.flow.scanning().await, "camera is off while the pet is shown");

    h.flow.begin_import().await.unwrap();
    h.flow.set_edit_code("42").await.unwrap();
    assert_eq!(h.flow.back().await.unwrap(), FlowState::Info);
    assert_eq!(h.flow.snapshot().await.edit_code, "42");

    assert_eq!(h.flow.back().await.unwrap(), FlowState::Scan);
    let snapshot = h.flow.snapshot().await;
    assert!(snapshot.pet.is_none());
    assert!(snapshot.edit_code.is_empty());
    assert!(h.flow.scanning().await);
    assert_eq!(h.camera.opened(), 2);

    assert!(matches!(
        h.flow.back().await.unwrap_err(),
        FlowError::InvalidTransition {
            state: FlowState::Scan,
            action: FlowAction::Back
        }
    ));
}

#[tokio::test]
async fn test_close_releases_camera() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.flow.start_scan().await.unwrap();
    assert_eq!(h.camera.live_streams(), 1);

    h.flow.close().await;
    assert_eq!(h.camera.live_streams(), 0);
    assert!(h.flow.is_closed().await);
    assert!(h.flow.available_actions().await.is_empty());
    assert_eq!(h.flow.start_scan().await.unwrap_err(), FlowError::Closed);

    h.flow.close().await;
    assert_eq!(h.camera.live_streams(), 0);
}

#[tokio::test]
async fn test_close_from_edit_clears_everything() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    to_edit(&h).await;
    h.flow.set_edit_code("99").await.unwrap();

    h.flow.close().await;
    let snapshot = h.flow.snapshot().await;
    assert!(snapshot.closed);
    assert!(snapshot.pet.is_none());
    assert!(snapshot.edit_code.is_empty());
    assert_eq!(h.flow.submit_import().await.unwrap_err(), FlowError::Closed);
    assert!(h.api.import_requests().is_empty());
}

#[tokio::test]
async fn test_duplicate_decodes_trigger_single_lookup() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.flow.start_scan().await.unwrap();
    h.camera.show(TOKEN);
    h.camera.show(TOKEN);

    assert!(matches!(
        h.flow.next_scan().await.unwrap(),
        ScanOutcome::Found(_)
    ));
    assert!(h.flow.next_scan().await.is_err());
    assert_eq!(h.api.lookup_count(), 1);
    assert_eq!(h.camera.opened(), 1);
    assert_eq!(h.camera.live_streams(), 0);
}

#[tokio::test]
async fn test_lookup_result_after_close_is_discarded() {
    let h = harness(
        ScanMode::ImportVet,
        FakePetApi::slow(pet("FULL", false), Duration::from_millis(150)),
    );
    let flow = h.flow.clone();
    let lookup = tokio::spawn(async move { flow.handle_decoded(TOKEN).await });

    tokio::time::sleep(Duration::from_millis(30)).await;
    h.flow.close().await;

    assert_eq!(lookup.await.unwrap().unwrap_err(), FlowError::Cancelled);
    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Scan);
    assert!(snapshot.pet.is_none());
}

#[tokio::test]
async fn test_second_decode_during_lookup_is_busy() {
    let h = harness(
        ScanMode::ImportVet,
        FakePetApi::slow(pet("FULL", false), Duration::from_millis(150)),
    );
    let flow = h.flow.clone();
    let first = tokio::spawn(async move { flow.handle_decoded(TOKEN).await });

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.flow.snapshot().await.busy);
    assert_eq!(
        h.flow.handle_decoded(TOKEN).await.unwrap_err(),
        FlowError::Busy
    );

    assert!(matches!(first.await.unwrap(), Ok(ScanOutcome::Found(_))));
    assert_eq!(h.api.lookup_count(), 1);
    assert!(!h.flow.snapshot().await.busy);
}

#[tokio::test]
async fn test_lookup_failure_rearms_scanner() {
    let h = harness(ScanMode::ImportVet, FakePetApi::not_found());
    h.flow.start_scan().await.unwrap();
    h.camera.show(TOKEN);

    let err = h.flow.next_scan().await.unwrap_err();
    assert!(matches!(err, FlowError::LookupFailed(ApiError::NotFound { .. })));

    let snapshot = h.flow.snapshot().await;
    assert_eq!(snapshot.state, FlowState::Scan);
    assert_eq!(snapshot.notice.unwrap().text, messages::PET_NOT_FOUND);
    assert!(h.flow.scanning().await);
    assert_eq!(h.camera.opened(), 2);

    h.flow.close().await;
    assert_eq!(h.camera.live_streams(), 0);
}

#[tokio::test]
async fn test_camera_denied_keeps_flow_open_with_notice() {
    let h = harness_with_camera(
        ScanMode::ImportOwner,
        FakePetApi::returning(pet("NONE", true)),
        ScriptedCamera::failing(CameraError::PermissionDenied),
    );

    let err = h.flow.start_scan().await.unwrap_err();
    assert_eq!(err, FlowError::Camera(CameraError::PermissionDenied));

    let snapshot = h.flow.snapshot().await;
    assert!(!snapshot.closed);
    assert_eq!(snapshot.state, FlowState::Scan);
    assert_eq!(snapshot.notice.unwrap().text, messages::CAMERA_UNAVAILABLE);
    assert_eq!(snapshot.actions, vec![FlowAction::Close]);
}

#[tokio::test]
async fn test_next_scan_without_camera_is_inactive() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    assert_eq!(
        h.flow.next_scan().await.unwrap_err(),
        FlowError::Camera(CameraError::Inactive)
    );
}

#[tokio::test]
async fn test_import_sends_token_as_printed() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    let printed = TOKEN.to_uppercase();
    h.flow
        .handle_decoded(&format!("https://centralvet.cl/qr/{printed}"))
        .await
        .unwrap();
    h.flow.begin_import().await.unwrap();
    h.flow.set_edit_code("123456").await.unwrap();
    h.flow.submit_import().await.unwrap();

    assert_eq!(h.api.looked_up.lock().unwrap().clone(), vec![printed.clone()]);
    assert_eq!(h.api.import_requests()[0].qr_code_token, printed);
}

#[tokio::test]
async fn test_decode_outside_scan_step_is_rejected() {
    let h = harness(ScanMode::ImportVet, FakePetApi::returning(pet("FULL", false)));
    h.flow.handle_decoded(TOKEN).await.unwrap();

    let err = h.flow.handle_decoded(TOKEN).await.unwrap_err();
    assert_eq!(
        err,
        FlowError::NotScanning {
            state: FlowState::Info
        }
    );
    assert_eq!(
        h.flow.start_scan().await.unwrap_err(),
        FlowError::NotScanning {
            state: FlowState::Info
        }
    );
    assert_eq!(h.api.lookup_count(), 1);
    assert_eq!(h.flow.state().await, FlowState::Info);
}

#[tokio::test]
async fn test_close_is_not_blocked_by_camera_prompt() {
    init_test_logging();
    let gated = GatedCamera::new(fast_camera());
    let api = Arc::new(FakePetApi::returning(pet("FULL", false)));
    let navigator = Arc::new(RecordingNavigator::default());
    let mut deps = flow_deps(&api, &gated.inner, &navigator, QueryCache::default());
    deps.camera = Arc::new(gated.clone());
    let flow = ImportFlow::open(ScanMode::ImportVet, deps);

    let starting = tokio::spawn({
        let flow = flow.clone();
        async move { flow.start_scan().await }
    });
    while gated.waiting() == 0 {
        tokio::task::yield_now().await;
    }

    tokio::time::timeout(Duration::from_secs(1), flow.close())
        .await
        .expect("close waited for the camera prompt");
    assert!(flow.is_closed().await);

    gated.grant();
    assert_eq!(starting.await.unwrap().unwrap_err(), FlowError::Cancelled);
    assert_eq!(gated.inner.opened(), 1);
    assert_eq!(gated.inner.live_streams(), 0);
    assert!(!flow.scanning().await);
}
