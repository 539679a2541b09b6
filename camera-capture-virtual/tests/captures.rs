mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use camera_capture_core::{
    AssetHandle, CameraError, CapturedAsset, CameraEvent, CameraPosition, CaptureOrientation, FlashMode, GeoLocation,
    ImageOrientation, Ignored, MediaKind, MediaPayload, PersistenceGateway, QualityPreset,
    SessionState,
};
use camera_capture_virtual::{
    virtual_camera, virtual_microphone, MemoryAssetLibrary, PhotoDelivery, VirtualRig,
};
use common::{Harness, TIMEOUT};

fn back_only() -> Vec<camera_capture_core::CaptureDevice> {
    vec![
        virtual_camera("back", CameraPosition::Back, &QualityPreset::PREFERRED),
        virtual_microphone("builtin"),
    ]
}

#[test]
fn photo_is_persisted_with_location() {
    let (harness, _) = Harness::start("photo", VirtualRig::builder());
    let location = GeoLocation::new(37.33, -122.03);

    let id = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, Some(location))
        .unwrap();
    let completed = harness.wait_completed();

    assert_eq!(completed.request, id);
    assert_eq!(completed.kind, MediaKind::Photo);
    let asset = completed.asset.expect("photo should be saved");
    let saved = asset.location.unwrap();
    assert_relative_eq!(saved.latitude, 37.33);
    assert_relative_eq!(saved.longitude, -122.03);

    match harness.library.media(&asset.handle) {
        Some(MediaPayload::Photo { orientation, .. }) => {
            assert_eq!(orientation, ImageOrientation::Right)
        }
        other => panic!("expected photo payload, got {:?}", other),
    }
    assert_eq!(harness.camera.diagnostics().captures_completed, 1);
}

#[test]
fn racing_photos_keep_their_own_location() {
    let (harness, _) = Harness::start(
        "racing",
        VirtualRig::builder().photo_delivery(PhotoDelivery::Held),
    );
    let home = GeoLocation::new(51.5, -0.12);
    let away = GeoLocation::new(-33.86, 151.2);

    let first = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, Some(home))
        .unwrap();
    let second = harness
        .camera
        .take_photo(CaptureOrientation::LandscapeLeft, Some(away))
        .unwrap();
    assert_ne!(first, second);

    harness.camera.flush();
    assert_eq!(harness.rig.photo_output.held_count(), 2);
    // Completions arrive in the reverse of request order.
    assert_eq!(harness.rig.photo_output.release_newest_first(), 2);

    let mut by_request = HashMap::new();
    for _ in 0..2 {
        let completed = harness.wait_completed();
        by_request.insert(completed.request, completed.asset.unwrap());
    }

    let first_location = by_request[&first].location.unwrap();
    let second_location = by_request[&second].location.unwrap();
    assert_relative_eq!(first_location.latitude, 51.5);
    assert_relative_eq!(second_location.latitude, -33.86);
    assert_relative_eq!(second_location.longitude, 151.2);
}

#[test]
fn photo_request_snapshots_settings() {
    let (harness, _) = Harness::start(
        "snapshot",
        VirtualRig::builder().photo_delivery(PhotoDelivery::Held),
    );

    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    harness.camera.set_flash(FlashMode::Auto).unwrap();
    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    harness.camera.flush();

    let requests = harness.rig.photo_output.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].settings.flash_mode, FlashMode::Off);
    assert_eq!(requests[1].settings.flash_mode, FlashMode::Auto);
    harness.rig.photo_output.release_in_order();
}

#[test]
fn persistence_failure_reports_no_asset() {
    let (harness, _) = Harness::start("persist_fail", VirtualRig::builder());
    harness.library.fail_saves(true);

    let id = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    let completed = harness.wait_completed();

    assert_eq!(completed.request, id);
    assert!(completed.asset.is_none());
    assert_eq!(harness.camera.state(), SessionState::Running);
    assert_eq!(harness.camera.diagnostics().persistence_failures, 1);

    harness.library.fail_saves(false);
    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    assert!(harness.wait_completed().asset.is_some());
}

#[test]
fn unfetchable_asset_reports_no_asset() {
    let (harness, _) = Harness::start("fetch_fail", VirtualRig::builder());
    harness.library.fail_fetches(true);

    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();

    assert!(harness.wait_completed().asset.is_none());
    assert_eq!(harness.library.len(), 1);
}

#[test]
fn capture_errors_report_no_asset() {
    let (harness, _) = Harness::start("capture_fail", VirtualRig::builder());
    harness
        .rig
        .photo_output
        .fail_next(CameraError::CaptureFailed("sensor overheated".into()));
    harness.rig.photo_output.empty_next();

    for _ in 0..2 {
        harness
            .camera
            .take_photo(CaptureOrientation::Portrait, None)
            .unwrap();
        let completed = harness.wait_completed();
        assert_eq!(completed.kind, MediaKind::Photo);
        assert!(completed.asset.is_none());
    }

    assert!(harness.library.is_empty());
    assert_eq!(harness.camera.diagnostics().capture_failures, 2);
    assert_eq!(harness.camera.state(), SessionState::Running);
}

#[test]
fn saves_run_on_persistence_queue() {
    let (harness, _) = Harness::start("threads", VirtualRig::builder());

    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    harness.wait_completed();

    assert_eq!(
        harness.library.save_threads(),
        vec![Some("camera-persistence".to_string())]
    );
}

#[test]
fn switch_swaps_camera_atomically() {
    let (harness, _) = Harness::start("switch", VirtualRig::builder());
    let (tx, rx) = mpsc::channel();

    harness.camera.switch_camera(move |result| {
        let on = thread::current().name().map(str::to_owned);
        tx.send((result, on)).unwrap();
    });

    let (result, thread_name) = rx.recv_timeout(TIMEOUT).unwrap();
    let input = result.unwrap();
    assert_eq!(input.position(), CameraPosition::Front);
    assert_eq!(thread_name.as_deref(), Some("camera-observer"));

    match harness.next_event() {
        CameraEvent::InputChanged(changed) => assert_eq!(changed, input),
        other => panic!("expected input change, got {:?}", other),
    }

    // Front camera tops out at medium.
    assert_eq!(harness.camera.session_handle().preset, Some(QualityPreset::Medium));
    for snapshot in harness.rig.session.history() {
        assert!(snapshot.video_inputs().len() <= 1);
    }
    assert_eq!(harness.rig.session.snapshot().video_inputs(), vec![&input]);
}

#[test]
fn front_photos_are_mirrored() {
    let (harness, _) = Harness::start("mirrored", VirtualRig::builder());
    let (tx, rx) = mpsc::channel();
    harness.camera.switch_camera(move |result| tx.send(result).unwrap());
    rx.recv_timeout(TIMEOUT).unwrap().unwrap();

    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    let asset = harness.wait_completed().asset.unwrap();

    match harness.library.media(&asset.handle) {
        Some(MediaPayload::Photo { orientation, .. }) => {
            assert_eq!(orientation, ImageOrientation::RightMirrored)
        }
        other => panic!("expected photo payload, got {:?}", other),
    }
}

#[test]
fn switch_without_alternate_is_noop() {
    let (harness, before) = Harness::start(
        "no_alternate",
        VirtualRig::builder().devices(back_only()),
    );
    let (tx, rx) = mpsc::channel();

    harness.camera.switch_camera(move |result| tx.send(result).unwrap());

    let result = rx.recv_timeout(TIMEOUT).unwrap();
    assert_eq!(result.unwrap_err().ignored(), Some(Ignored::NoAlternateCamera));
    assert!(harness
        .drain()
        .iter()
        .all(|event| !matches!(event, CameraEvent::InputChanged(_))));
    assert_eq!(harness.camera.current_input(), before.input);
    assert_eq!(harness.rig.session.history().len(), 1);

    harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    assert!(harness.wait_completed().asset.is_some());
}

#[test]
fn declined_switch_keeps_previous_camera() {
    let (harness, before) = Harness::start("declined", VirtualRig::builder());
    harness
        .rig
        .session
        .decline_input(camera_capture_core::DeviceId::new("front"));
    let (tx, rx) = mpsc::channel();

    harness.camera.switch_camera(move |result| tx.send(result).unwrap());

    let result = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(result, Err(CameraError::ConfigurationFailed(_))));
    assert_eq!(harness.camera.current_input(), before.input);
    let snapshot = harness.rig.session.snapshot();
    assert_eq!(snapshot.video_inputs().len(), 1);
    assert_eq!(
        snapshot.video_inputs()[0].position(),
        CameraPosition::Back
    );
}

#[test]
fn switch_to_camera_without_shared_preset_keeps_previous_camera() {
    let (harness, before) = Harness::start(
        "no_shared_preset",
        VirtualRig::builder()
            .session_presets(&[QualityPreset::High])
            .devices(vec![
                virtual_camera("back", CameraPosition::Back, &[QualityPreset::High]),
                virtual_camera("front", CameraPosition::Front, &[QualityPreset::Low]),
            ]),
    );
    let (tx, rx) = mpsc::channel();

    harness.camera.switch_camera(move |result| tx.send(result).unwrap());

    let result = rx.recv_timeout(TIMEOUT).unwrap();
    assert!(matches!(result, Err(CameraError::ConfigurationFailed(_))));
    assert_eq!(harness.camera.current_input(), before.input);
    assert_eq!(harness.camera.session_handle().preset, Some(QualityPreset::High));
    let snapshot = harness.rig.session.snapshot();
    assert_eq!(snapshot.preset, Some(QualityPreset::High));
    assert_eq!(snapshot.video_inputs().len(), 1);
    assert_eq!(snapshot.video_inputs()[0].position(), CameraPosition::Back);
}

#[test]
fn flash_change_goes_through_device_lock() {
    let (harness, _) = Harness::start("flash", VirtualRig::builder());
    let back = camera_capture_core::DeviceId::new("back");

    harness.camera.set_flash(FlashMode::On).unwrap();
    harness.camera.flush();

    assert_eq!(harness.camera.settings().flash_mode, FlashMode::On);
    assert_eq!(harness.rig.devices.lock_count(), 1);
    assert!(!harness.rig.devices.is_locked(&back));
}

#[test]
fn flash_unsupported_on_front_camera() {
    let (harness, _) = Harness::start("flash_front", VirtualRig::builder());
    let (tx, rx) = mpsc::channel();
    harness.camera.switch_camera(move |result| tx.send(result).unwrap());
    rx.recv_timeout(TIMEOUT).unwrap().unwrap();

    let err = harness.camera.set_flash(FlashMode::On).unwrap_err();
    assert_eq!(err.ignored(), Some(Ignored::FlashModeUnsupported));
    assert!(harness.camera.set_flash(FlashMode::Off).is_ok());
}

#[test]
fn focus_sets_point_under_lock() {
    let (harness, _) = Harness::start("focus", VirtualRig::builder());
    let back = camera_capture_core::DeviceId::new("back");

    harness
        .camera
        .focus(camera_capture_core::FocusPoint::new(0.25, 0.75))
        .unwrap();
    harness.camera.flush();

    let point = harness.rig.devices.focus_point(&back).unwrap();
    assert_relative_eq!(point.x, 0.25);
    assert_relative_eq!(point.y, 0.75);
    assert!(!harness.rig.devices.is_locked(&back));
}

#[test]
fn refused_lock_leaves_settings_unchanged() {
    let (harness, _) = Harness::start("lock_refused", VirtualRig::builder());
    harness.rig.devices.refuse_locks(true);

    harness.camera.set_flash(FlashMode::On).unwrap();
    harness
        .camera
        .focus(camera_capture_core::FocusPoint::new(0.5, 0.5))
        .unwrap();
    harness.camera.flush();

    assert_eq!(harness.camera.settings().flash_mode, FlashMode::Off);
    assert_eq!(harness.camera.diagnostics().device_lock_failures, 2);
    assert_eq!(harness.camera.state(), SessionState::Running);
}

#[test]
fn photo_around_stop_completes_once() {
    let (harness, _) = Harness::start(
        "around_stop",
        VirtualRig::builder().photo_delivery(PhotoDelivery::Held),
    );

    let id = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    harness.camera.stop_session().unwrap();
    harness.camera.flush();

    // Either the request reached the hardware before the stop, or it was
    // dropped from the queue. Both end in exactly one completion.
    let issued = harness.rig.photo_output.release_in_order() == 1;
    let completed = harness.wait_completed();
    assert_eq!(completed.request, id);
    assert_eq!(completed.asset.is_some(), issued);

    assert!(harness
        .drain()
        .iter()
        .all(|event| !matches!(event, CameraEvent::CaptureCompleted(_))));
    assert_eq!(harness.camera.state(), SessionState::Stopped);
}

/// Panics on its first save, then stores into a memory library.
struct PanicsOnce {
    panicked: AtomicBool,
    library: Arc<MemoryAssetLibrary>,
}

impl PersistenceGateway for PanicsOnce {
    fn save(
        &self,
        media: &MediaPayload,
        location: Option<&GeoLocation>,
    ) -> Result<AssetHandle, CameraError> {
        if !self.panicked.swap(true, Ordering::SeqCst) {
            panic!("storage threw");
        }
        self.library.save(media, location)
    }

    fn fetch(&self, handle: &AssetHandle) -> Option<CapturedAsset> {
        self.library.fetch(handle)
    }
}

#[test]
fn panicking_gateway_fails_one_capture_only() {
    let library = Arc::new(MemoryAssetLibrary::new());
    let gateway = Arc::new(PanicsOnce {
        panicked: AtomicBool::new(false),
        library: Arc::clone(&library),
    });
    let harness = Harness::with_gateway(
        "gateway_panic",
        VirtualRig::builder(),
        gateway,
        Arc::clone(&library),
    );
    harness.camera.setup().unwrap();
    harness.wait_started();

    let first = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    let completed = harness.wait_completed();
    assert_eq!(completed.request, first);
    assert!(completed.asset.is_none());

    let second = harness
        .camera
        .take_photo(CaptureOrientation::Portrait, None)
        .unwrap();
    let completed = harness.wait_completed();
    assert_eq!(completed.request, second);
    assert!(completed.asset.is_some());

    assert_eq!(harness.camera.diagnostics().persistence_failures, 1);
    assert_eq!(harness.camera.state(), SessionState::Running);
    assert_eq!(library.len(), 1);
}
