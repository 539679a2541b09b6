//! Virtual still-image output.
//!
//! In `Immediate` mode each capture completes on its own short-lived thread.
//! In `Held` mode captures queue up until the caller releases them, which
//! lets tests choose the order in which completions arrive.

use std::thread;

use parking_lot::Mutex;

use camera_capture_core::models::capture::{CapturedPhoto, PhotoRequest};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::settings::FlashMode;
use camera_capture_core::traits::photo_output::{PhotoCompletion, PhotoOutput};

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoDelivery {
    Immediate,
    Held,
}

/// Outcome forced onto the next capture.
#[derive(Debug, Clone)]
enum Scripted {
    Fail(CameraError),
    Empty,
}

struct HeldCapture {
    request: PhotoRequest,
    outcome: Result<CapturedPhoto, CameraError>,
    completion: PhotoCompletion,
}

pub struct VirtualPhotoOutput {
    flash_modes: Vec<FlashMode>,
    delivery: Mutex<PhotoDelivery>,
    scripted: Mutex<Vec<Scripted>>,
    held: Mutex<Vec<HeldCapture>>,
    requests: Mutex<Vec<PhotoRequest>>,
}

impl VirtualPhotoOutput {
    pub fn new(delivery: PhotoDelivery) -> Self {
        Self::with_flash_modes(delivery, vec![FlashMode::Off, FlashMode::On, FlashMode::Auto])
    }

    pub fn with_flash_modes(delivery: PhotoDelivery, flash_modes: Vec<FlashMode>) -> Self {
        Self {
            flash_modes,
            delivery: Mutex::new(delivery),
            scripted: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_delivery(&self, delivery: PhotoDelivery) {
        *self.delivery.lock() = delivery;
    }

    /// Fail the next capture with `error`.
    pub fn fail_next(&self, error: CameraError) {
        self.scripted.lock().push(Scripted::Fail(error));
    }

    /// Deliver the next capture without image data.
    pub fn empty_next(&self) {
        self.scripted.lock().push(Scripted::Empty);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<PhotoRequest> {
        self.requests.lock().clone()
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Complete held captures, newest first. Returns how many were released.
    pub fn release_newest_first(&self) -> usize {
        let held: Vec<HeldCapture> = self.held.lock().drain(..).rev().collect();
        let count = held.len();
        for capture in held {
            log::trace!("Releasing held photo {}", capture.request.id);
            (capture.completion)(capture.outcome);
        }
        count
    }

    /// Complete held captures in arrival order.
    pub fn release_in_order(&self) -> usize {
        let held: Vec<HeldCapture> = self.held.lock().drain(..).collect();
        let count = held.len();
        for capture in held {
            (capture.completion)(capture.outcome);
        }
        count
    }

    fn next_outcome(&self, request: &PhotoRequest) -> Result<CapturedPhoto, CameraError> {
        let scripted = {
            let mut scripted = self.scripted.lock();
            if scripted.is_empty() {
                None
            } else {
                Some(scripted.remove(0))
            }
        };
        match scripted {
            Some(Scripted::Fail(error)) => Err(error),
            Some(Scripted::Empty) => Ok(CapturedPhoto { data: Vec::new() }),
            None => Ok(CapturedPhoto {
                data: synthetic_jpeg(request),
            }),
        }
    }
}

impl Default for VirtualPhotoOutput {
    fn default() -> Self {
        Self::new(PhotoDelivery::Immediate)
    }
}

impl PhotoOutput for VirtualPhotoOutput {
    fn supported_flash_modes(&self) -> Vec<FlashMode> {
        self.flash_modes.clone()
    }

    fn capture(&self, request: PhotoRequest, completion: PhotoCompletion) {
        self.requests.lock().push(request);
        let outcome = self.next_outcome(&request);

        let delivery = *self.delivery.lock();
        match delivery {
            PhotoDelivery::Held => self.held.lock().push(HeldCapture {
                request,
                outcome,
                completion,
            }),
            PhotoDelivery::Immediate => {
                let spawned = thread::Builder::new()
                    .name("virtual-photo".into())
                    .spawn(move || completion(outcome));
                if let Err(e) = spawned {
                    log::error!("Failed to spawn photo delivery thread: {}", e);
                }
            }
        }
    }
}

/// A minimal JPEG-framed payload tagged with the request id.
fn synthetic_jpeg(request: &PhotoRequest) -> Vec<u8> {
    let mut data = JPEG_SOI.to_vec();
    data.extend_from_slice(request.id.to_string().as_bytes());
    data.extend_from_slice(&JPEG_EOI);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture_core::models::capture::CaptureRequestId;
    use camera_capture_core::models::settings::{CaptureOrientation, CaptureSettings};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    fn request() -> PhotoRequest {
        PhotoRequest {
            id: CaptureRequestId::new(),
            settings: CaptureSettings::default(),
            orientation: CaptureOrientation::Portrait,
        }
    }

    #[test]
    fn immediate_delivery_on_worker_thread() {
        let output = VirtualPhotoOutput::default();
        let (tx, rx) = mpsc::channel();
        let req = request();

        output.capture(
            req,
            Box::new(move |result| {
                let name = thread::current().name().map(str::to_owned);
                tx.send((result, name)).unwrap();
            }),
        );

        let (result, thread_name) = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let photo = result.unwrap();
        assert!(photo.data.starts_with(&JPEG_SOI));
        assert!(photo.data.ends_with(&JPEG_EOI));
        assert_eq!(thread_name.as_deref(), Some("virtual-photo"));
        assert_eq!(output.requests(), vec![req]);
    }

    #[test]
    fn held_captures_release_newest_first() {
        let output = VirtualPhotoOutput::new(PhotoDelivery::Held);
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = request();
        let second = request();

        for req in [first, second] {
            let order = Arc::clone(&order);
            output.capture(req, Box::new(move |_| order.lock().push(req.id)));
        }
        assert_eq!(output.held_count(), 2);
        assert!(order.lock().is_empty());

        assert_eq!(output.release_newest_first(), 2);
        assert_eq!(*order.lock(), vec![second.id, first.id]);
        assert_eq!(output.held_count(), 0);
    }

    #[test]
    fn scripted_outcomes_apply_in_order() {
        let output = VirtualPhotoOutput::new(PhotoDelivery::Held);
        output.fail_next(CameraError::CaptureFailed("sensor".into()));
        output.empty_next();

        let results = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..3 {
            let results = Arc::clone(&results);
            output.capture(request(), Box::new(move |r| results.lock().push(r)));
        }
        output.release_in_order();

        let results = results.lock();
        assert!(matches!(results[0], Err(CameraError::CaptureFailed(_))));
        assert_eq!(results[1].as_ref().map(|p| p.data.len()).ok(), Some(0));
        assert!(results[2].as_ref().is_ok_and(|p| !p.data.is_empty()));
    }
}
