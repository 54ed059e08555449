//! Camera lifecycle management.
//!
//! At most one camera handle exists per session, guarded by a single mutex
//! held for the full duration of every device call. `open` and `close` are
//! idempotent; reading a frame without an open handle is a reported,
//! non-fatal condition.

use crate::app::log_debug;
use crate::error::Error;
use std::sync::Mutex;

/// Device-side camera operations. Production wires in a platform backend;
/// tests inject fakes.
pub trait CameraDevice: Send {
    /// Grab one encoded frame (PNG or JPEG bytes).
    fn read_frame(&mut self) -> Result<Vec<u8>, Error>;

    /// Release the underlying device. Called exactly once, on close.
    fn release(&mut self);
}

/// Creates a fresh device handle on each `open`.
pub type CameraFactory = Box<dyn Fn() -> Result<Box<dyn CameraDevice>, Error> + Send + Sync>;

/// Exclusive-owned camera slot shared across threads.
pub struct CameraManager {
    slot: Mutex<Option<Box<dyn CameraDevice>>>,
    factory: CameraFactory,
}

impl CameraManager {
    pub fn new(factory: CameraFactory) -> Self {
        Self {
            slot: Mutex::new(None),
            factory,
        }
    }

    /// Manager backed by the platform stub; `open` reports a device error.
    /// Used when no camera backend is wired in.
    pub fn unavailable() -> Self {
        Self::new(Box::new(|| {
            Err(Error::Device(
                "no camera backend available on this platform".into(),
            ))
        }))
    }

    pub fn is_open(&self) -> bool {
        self.slot
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Open the device. No-op when already open.
    pub fn open(&self) -> Result<(), Error> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Device("camera lock poisoned".into()))?;
        if slot.is_some() {
            return Ok(());
        }
        *slot = Some((self.factory)()?);
        log_debug("camera opened");
        Ok(())
    }

    /// Close and release the device. No-op when already closed.
    pub fn close(&self) {
        let Ok(mut slot) = self.slot.lock() else {
            return;
        };
        if let Some(mut device) = slot.take() {
            device.release();
            log_debug("camera closed");
        }
    }

    /// Read one frame. Fails with [`Error::CameraNotOpen`] unless `open`
    /// succeeded first.
    pub fn capture_frame(&self) -> Result<Vec<u8>, Error> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Device("camera lock poisoned".into()))?;
        match slot.as_mut() {
            Some(device) => device.read_frame(),
            None => Err(Error::CameraNotOpen),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fake device that counts opens/releases and serves a fixed frame.
    pub struct FakeCamera {
        pub released: Arc<AtomicUsize>,
        pub frame: Vec<u8>,
    }

    impl CameraDevice for FakeCamera {
        fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
            Ok(self.frame.clone())
        }

        fn release(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn fake_manager() -> (CameraManager, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicUsize::new(0));
        let opened_clone = opened.clone();
        let released_clone = released.clone();
        let manager = CameraManager::new(Box::new(move || {
            opened_clone.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeCamera {
                released: released_clone.clone(),
                frame: vec![0x89, b'P', b'N', b'G'],
            }) as Box<dyn CameraDevice>)
        }));
        (manager, opened, released)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fake_manager;
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn capture_before_open_is_reported_not_fatal() {
        let (manager, _, _) = fake_manager();
        match manager.capture_frame() {
            Err(Error::CameraNotOpen) => {}
            other => panic!("expected CameraNotOpen, got {other:?}"),
        }
    }

    #[test]
    fn open_then_capture_succeeds() {
        let (manager, opened, _) = fake_manager();
        manager.open().expect("open");
        assert!(manager.is_open());
        let frame = manager.capture_frame().expect("frame");
        assert!(!frame.is_empty());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn open_is_idempotent() {
        let (manager, opened, _) = fake_manager();
        manager.open().expect("open");
        manager.open().expect("second open is a no-op");
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_releases_device_and_capture_fails_again() {
        let (manager, _, released) = fake_manager();
        manager.open().expect("open");
        manager.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(!manager.is_open());
        assert!(matches!(
            manager.capture_frame(),
            Err(Error::CameraNotOpen)
        ));
        // Closing again is a no-op.
        manager.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unavailable_backend_reports_device_error_on_open() {
        let manager = CameraManager::unavailable();
        assert!(matches!(manager.open(), Err(Error::Device(_))));
        assert!(!manager.is_open());
    }
}
