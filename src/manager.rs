//! Per-image registry of reprojection operations.
//!
//! At most one operation runs per image. The registry is keyed by the address
//! of the image's `Arc` allocation and only holds `Weak` references, so it
//! never keeps an image alive. Entries for dropped images are pruned on the
//! next start.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use image::RgbaImage;

use crate::error::{OperationError, Result};
use crate::logger;
use crate::operation::{AbortHandle, Operation, OperationState, ProgressSink};
use crate::projection::ProjectionConfig;
use crate::reproject::{ReprojectOptions, Reprojection};
use crate::surface::SurfaceFactory;

/// An image shared between the manager, its driver, and any viewer.
pub type SharedImage = Arc<Mutex<RgbaImage>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(image: &SharedImage) -> usize {
    Arc::as_ptr(image) as usize
}

struct Slot {
    image: Weak<Mutex<RgbaImage>>,
    /// Handle to the latest operation on this image, finished or not.
    latest: Option<AbortHandle>,
    /// Pixels from before the first completed conversion.
    original: Option<RgbaImage>,
}

impl Slot {
    fn is_busy(&self) -> bool {
        self.latest.as_ref().is_some_and(AbortHandle::is_in_progress)
    }
}

/// A started conversion, ready to be driven.
///
/// Dropping it before it finishes aborts the operation and restores the image.
pub struct Conversion<F: SurfaceFactory> {
    image: SharedImage,
    before: RgbaImage,
    operation: Operation,
    run: Reprojection<F>,
}

impl<F: SurfaceFactory> Conversion<F> {
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.operation.abort_handle()
    }

    fn restore(&mut self) {
        *lock(&self.image) = std::mem::take(&mut self.before);
    }
}

impl<F: SurfaceFactory> std::fmt::Debug for Conversion<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversion")
            .field("label", &self.operation.label())
            .field("state", &self.operation.state())
            .field("run", &self.run)
            .finish()
    }
}

impl<F: SurfaceFactory> Drop for Conversion<F> {
    fn drop(&mut self) {
        if self.operation.state() == OperationState::InProgress {
            self.operation.token().cancel();
            self.restore();
            self.operation.abort_finished();
        }
    }
}

/// Serializes conversions per image and remembers originals for revert.
#[derive(Default)]
pub struct OperationManager {
    slots: Mutex<HashMap<usize, Slot>>,
}

impl OperationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start reprojecting `image` into `config`'s projection.
    ///
    /// Fails with [`OperationError::AlreadyInProgress`] if another conversion
    /// of the same image hasn't finished, or with the reprojection's own
    /// precondition error. In both cases the image is left untouched.
    pub fn start<F: SurfaceFactory<Surface = RgbaImage>>(
        &self,
        image: &SharedImage,
        config: ProjectionConfig,
        options: ReprojectOptions,
        factory: F,
        sink: Box<dyn ProgressSink>,
    ) -> Result<Conversion<F>> {
        let mut slots = lock(&self.slots);
        slots.retain(|_, slot| slot.image.strong_count() > 0);

        let slot = slots.entry(key(image)).or_insert_with(|| Slot {
            image: Arc::downgrade(image),
            latest: None,
            original: None,
        });
        if slot.is_busy() {
            return Err(OperationError::AlreadyInProgress.into());
        }

        let before = lock(image).clone();
        let label = config.projection.name().to_string();
        let operation = Operation::new(label, sink);
        let run = Reprojection::new(before.clone(), config, factory, operation.token(), options)?;

        slot.latest = Some(operation.abort_handle());
        Ok(Conversion {
            image: Arc::clone(image),
            before,
            operation,
            run,
        })
    }

    /// Run a conversion to its end, publishing every frame into the image.
    ///
    /// Yields to the runtime between frames so abort requests can arrive. On
    /// failure or abort the image gets its pre-conversion pixels back.
    pub async fn drive<F: SurfaceFactory<Surface = RgbaImage>>(
        &self,
        conversion: &mut Conversion<F>,
    ) -> OperationState {
        if conversion.operation.state().is_terminal() {
            return conversion.operation.state();
        }

        let outcome = loop {
            match conversion.run.next() {
                Some(Ok(frame)) => {
                    let done = frame.is_complete();
                    let progress = frame.progress();
                    *lock(&conversion.image) = frame.surface;
                    conversion.operation.update_progress(progress);
                    if done {
                        break Ok(true);
                    }
                    tokio::task::yield_now().await;
                }
                Some(Err(e)) => break Err(e),
                None => break Ok(false),
            }
        };

        match outcome {
            Ok(true) => {
                conversion.operation.complete();
                let before = std::mem::take(&mut conversion.before);
                let mut slots = lock(&self.slots);
                if let Some(slot) = slots.get_mut(&key(&conversion.image)) {
                    slot.original.get_or_insert(before);
                }
            }
            Ok(false) => {
                conversion.restore();
                conversion.operation.abort_finished();
            }
            Err(e) => {
                logger::warn(&format!(
                    "Reprojection to {} failed: {}",
                    conversion.operation.label(),
                    e
                ));
                conversion.restore();
                conversion.operation.fail(e);
            }
        }

        conversion.operation.state()
    }

    /// Restore the image to how it was before its first completed conversion.
    pub fn revert(&self, image: &SharedImage) -> std::result::Result<(), OperationError> {
        let mut slots = lock(&self.slots);
        let slot = slots
            .get_mut(&key(image))
            .filter(|slot| slot.image.strong_count() > 0)
            .ok_or(OperationError::NothingToRevert)?;
        if slot.is_busy() {
            return Err(OperationError::AlreadyInProgress);
        }
        let original = slot.original.take().ok_or(OperationError::NothingToRevert)?;
        *lock(image) = original;
        logger::debug("Image reverted to its original pixels");
        Ok(())
    }

    /// State of the latest operation on `image`, if it ever had one.
    pub fn state(&self, image: &SharedImage) -> Option<OperationState> {
        let slots = lock(&self.slots);
        slots
            .get(&key(image))
            .filter(|slot| slot.image.strong_count() > 0)
            .and_then(|slot| slot.latest.as_ref())
            .map(AbortHandle::state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReprojectError;
    use crate::operation::NoProgress;
    use crate::projection::ProjectionKind;
    use crate::surface::RasterSurfaces;
    use image::{ImageBuffer, Rgba};
    use std::sync::OnceLock;
    use std::time::Duration;

    fn shared(width: u32, height: u32) -> SharedImage {
        Arc::new(Mutex::new(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, 100, 255])
        })))
    }

    fn fast() -> ReprojectOptions {
        ReprojectOptions {
            yield_interval: Duration::ZERO,
            ..ReprojectOptions::default()
        }
    }

    /// Materializes the first frame, then fails.
    #[derive(Default)]
    struct FlakySurfaces {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl SurfaceFactory for FlakySurfaces {
        type Surface = RgbaImage;

        fn blank(&self, width: u32, height: u32, fill: Rgba<u8>) -> Result<RgbaImage> {
            RasterSurfaces.blank(width, height, fill)
        }

        fn materialize(&self, pixels: &RgbaImage) -> Result<RgbaImage> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 {
                Ok(pixels.clone())
            } else {
                Err(ReprojectError::Surface("display lost".to_string()))
            }
        }
    }

    /// Aborts its operation on the first partial progress update.
    struct AbortOnProgress {
        handle: Arc<OnceLock<AbortHandle>>,
        seen: Arc<Mutex<Vec<f64>>>,
    }

    impl ProgressSink for AbortOnProgress {
        fn update_progress(&mut self, fraction: f64) {
            self.seen.lock().unwrap().push(fraction);
            if fraction < 1.0 {
                if let Some(handle) = self.handle.get() {
                    handle.abort().unwrap();
                }
            }
        }

        fn finished(&mut self, _state: OperationState) {}
    }

    #[tokio::test]
    async fn test_completed_conversion_replaces_pixels() {
        let manager = OperationManager::new();
        let image = shared(32, 32);
        let mut conversion = manager
            .start(
                &image,
                ProjectionKind::Equirectangular.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap();

        let state = manager.drive(&mut conversion).await;
        assert_eq!(state, OperationState::Completed);
        assert_eq!(conversion.operation().progress(), 1.0);
        assert_eq!(image.lock().unwrap().dimensions(), (32, 16));
        assert_eq!(manager.state(&image), Some(OperationState::Completed));
    }

    #[tokio::test]
    async fn test_second_start_is_rejected_while_in_progress() {
        let manager = OperationManager::new();
        let image = shared(16, 16);
        let mut first = manager
            .start(
                &image,
                ProjectionKind::Sinusoidal.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap();

        let err = manager
            .start(
                &image,
                ProjectionKind::Mollweide.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ReprojectError::Operation(OperationError::AlreadyInProgress)
        ));

        // A different image is independent
        let other = shared(16, 16);
        assert!(manager
            .start(
                &other,
                ProjectionKind::Mollweide.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .is_ok());

        manager.drive(&mut first).await;
        assert!(manager
            .start(
                &image,
                ProjectionKind::Mollweide.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .is_ok());
    }

    #[tokio::test]
    async fn test_abort_on_first_progress_restores_image() {
        let manager = OperationManager::new();
        let image = shared(16, 16);
        let original = image.lock().unwrap().clone();

        let handle = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = AbortOnProgress {
            handle: Arc::clone(&handle),
            seen: Arc::clone(&seen),
        };
        let mut conversion = manager
            .start(
                &image,
                ProjectionKind::Equirectangular.config(),
                fast(),
                RasterSurfaces,
                Box::new(sink),
            )
            .unwrap();
        handle.set(conversion.abort_handle()).unwrap();

        let state = manager.drive(&mut conversion).await;
        assert_eq!(state, OperationState::Aborted);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(*image.lock().unwrap(), original);
        assert_eq!(
            conversion.abort_handle().abort(),
            Err(OperationError::NotInProgress("aborted".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failure_restores_image_and_keeps_error() {
        let manager = OperationManager::new();
        let image = shared(16, 16);
        let original = image.lock().unwrap().clone();

        let mut conversion = manager
            .start(
                &image,
                ProjectionKind::Equirectangular.config(),
                fast(),
                FlakySurfaces::default(),
                Box::new(NoProgress),
            )
            .unwrap();

        let state = manager.drive(&mut conversion).await;
        assert_eq!(state, OperationState::Failed);
        assert!(conversion
            .operation()
            .error()
            .unwrap()
            .to_string()
            .contains("display lost"));
        assert_eq!(*image.lock().unwrap(), original);
        assert!(matches!(
            manager.revert(&image),
            Err(OperationError::NothingToRevert)
        ));
    }

    #[test]
    fn test_precondition_failure_leaves_image_idle() {
        let manager = OperationManager::new();
        let image = shared(0, 0);
        let err = manager
            .start(
                &image,
                ProjectionKind::Mercator.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap_err();
        assert!(matches!(err, ReprojectError::EmptyImage { .. }));
        assert_eq!(manager.state(&image), None);
    }

    #[tokio::test]
    async fn test_revert_after_chained_conversions() {
        let manager = OperationManager::new();
        let image = shared(32, 32);
        let original = image.lock().unwrap().clone();

        for kind in [ProjectionKind::Equirectangular, ProjectionKind::Sinusoidal] {
            let mut conversion = manager
                .start(&image, kind.config(), fast(), RasterSurfaces, Box::new(NoProgress))
                .unwrap();
            assert_eq!(manager.drive(&mut conversion).await, OperationState::Completed);
        }
        assert_ne!(*image.lock().unwrap(), original);

        manager.revert(&image).unwrap();
        assert_eq!(*image.lock().unwrap(), original);
        assert_eq!(manager.revert(&image), Err(OperationError::NothingToRevert));
    }

    #[test]
    fn test_revert_rejected_while_in_progress() {
        let manager = OperationManager::new();
        let image = shared(16, 16);
        let _conversion = manager
            .start(
                &image,
                ProjectionKind::Mercator.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap();
        assert_eq!(manager.revert(&image), Err(OperationError::AlreadyInProgress));
    }

    #[test]
    fn test_dropping_undriven_conversion_frees_the_image() {
        let manager = OperationManager::new();
        let image = shared(16, 16);
        let conversion = manager
            .start(
                &image,
                ProjectionKind::Mercator.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap();
        drop(conversion);
        assert_eq!(manager.state(&image), Some(OperationState::Aborted));
        assert_eq!(image.lock().unwrap().dimensions(), (16, 16));
    }

    #[test]
    fn test_dropped_images_are_pruned() {
        let manager = OperationManager::new();
        {
            let image = shared(8, 8);
            let _ = manager.start(
                &image,
                ProjectionKind::Mercator.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            );
        }
        let image = shared(8, 8);
        let _ = manager.start(
            &image,
            ProjectionKind::Mercator.config(),
            fast(),
            RasterSurfaces,
            Box::new(NoProgress),
        );
        assert_eq!(lock(&manager.slots).len(), 1);
    }

    #[test]
    fn test_conversion_debug_names_operation() {
        let manager = OperationManager::new();
        let image = shared(8, 8);
        let conversion = manager
            .start(
                &image,
                ProjectionKind::Mollweide.config(),
                fast(),
                RasterSurfaces,
                Box::new(NoProgress),
            )
            .unwrap();
        let text = format!("{:?}", conversion);
        assert!(text.contains("mollweide"));
        assert!(text.contains("InProgress"));
    }

    #[test]
    fn test_state_ignores_dead_slot() {
        let manager = OperationManager::new();
        let image = shared(8, 8);
        let dead = Arc::downgrade(&shared(8, 8));
        let mut finished = Operation::new("stale", Box::new(NoProgress));
        finished.complete();

        lock(&manager.slots).insert(
            key(&image),
            Slot {
                image: dead,
                latest: Some(finished.abort_handle()),
                original: None,
            },
        );
        assert_eq!(manager.state(&image), None);
    }
}
