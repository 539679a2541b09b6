use crate::models::device::{DeviceId, FocusPoint};
use crate::models::error::CameraError;
use crate::traits::device_provider::DeviceProvider;

/// Exclusive configuration access to one device, released on drop.
pub struct ConfigurationLock<'a> {
    provider: &'a dyn DeviceProvider,
    device: DeviceId,
}

impl<'a> ConfigurationLock<'a> {
    pub fn acquire(provider: &'a dyn DeviceProvider, device: &DeviceId) -> Result<Self, CameraError> {
        provider.lock_for_configuration(device)?;
        Ok(Self {
            provider,
            device: device.clone(),
        })
    }

    pub fn device(&self) -> &DeviceId {
        &self.device
    }

    pub fn set_focus_point(&self, point: FocusPoint) -> Result<(), CameraError> {
        self.provider.set_focus_point(&self.device, point)
    }
}

impl Drop for ConfigurationLock<'_> {
    fn drop(&mut self) {
        self.provider.unlock_for_configuration(&self.device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use crate::models::device::CaptureDevice;

    #[derive(Default)]
    struct CountingProvider {
        refuse: bool,
        locks: Mutex<u32>,
        unlocks: Mutex<u32>,
        focus: Mutex<Option<FocusPoint>>,
    }

    impl DeviceProvider for CountingProvider {
        fn devices(&self) -> Vec<CaptureDevice> {
            Vec::new()
        }

        fn lock_for_configuration(&self, _device: &DeviceId) -> Result<(), CameraError> {
            if self.refuse {
                return Err(CameraError::ConfigurationFailed("device busy".into()));
            }
            *self.locks.lock() += 1;
            Ok(())
        }

        fn unlock_for_configuration(&self, _device: &DeviceId) {
            *self.unlocks.lock() += 1;
        }

        fn set_focus_point(&self, _device: &DeviceId, point: FocusPoint) -> Result<(), CameraError> {
            *self.focus.lock() = Some(point);
            Ok(())
        }
    }

    #[test]
    fn releases_on_drop() {
        let provider = CountingProvider::default();
        {
            let lock = ConfigurationLock::acquire(&provider, &DeviceId::new("back")).unwrap();
            lock.set_focus_point(FocusPoint::new(0.5, 0.5)).unwrap();
        }
        assert_eq!(*provider.locks.lock(), 1);
        assert_eq!(*provider.unlocks.lock(), 1);
        assert_eq!(*provider.focus.lock(), Some(FocusPoint::new(0.5, 0.5)));
    }

    #[test]
    fn refused_lock_is_not_released() {
        let provider = CountingProvider {
            refuse: true,
            ..Default::default()
        };
        assert!(ConfigurationLock::acquire(&provider, &DeviceId::new("back")).is_err());
        assert_eq!(*provider.unlocks.lock(), 0);
    }

    #[test]
    fn releases_when_mutation_panics() {
        let provider = CountingProvider::default();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _lock = ConfigurationLock::acquire(&provider, &DeviceId::new("back")).unwrap();
            panic!("mutation failed");
        }));
        assert!(outcome.is_err());
        assert_eq!(*provider.unlocks.lock(), 1);
    }
}
