use std::ops::Deref;

use super::controller::CaptureController;
use super::device::MediaDevice;

/// Scoped use of a [`CaptureController`]: whatever happens inside the scope,
/// the camera is closed when the scope ends.
///
/// ```ignore
/// let scope = controller.scope();
/// scope.open().await?;
/// let frame = scope.capture()?;
/// // camera released here even if `capture` failed
/// ```
pub struct CaptureScope<'a, D: MediaDevice> {
    controller: &'a CaptureController<D>,
}

impl<'a, D: MediaDevice> CaptureScope<'a, D> {
    pub(super) fn new(controller: &'a CaptureController<D>) -> Self {
        Self { controller }
    }
}

impl<D: MediaDevice> Deref for CaptureScope<'_, D> {
    type Target = CaptureController<D>;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<D: MediaDevice> Drop for CaptureScope<'_, D> {
    fn drop(&mut self) {
        self.controller.close();
    }
}

#[cfg(test)]
mod tests {
    use crate::capture::mock::{MockBehavior, MockCamera};
    use crate::capture::{CaptureController, CaptureError, CaptureState};

    #[tokio::test]
    async fn test_scope_closes_on_early_return() {
        let camera = MockCamera::new(8, 8).with_failing_grab();
        let controller = CaptureController::new(camera.clone());

        async fn scan(controller: &CaptureController<MockCamera>) -> Result<(), CaptureError> {
            let scope = controller.scope();
            scope.open().await?;
            scope.capture()?;
            Ok(())
        }

        assert!(scan(&controller).await.is_err());
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_scope_closes_live_stream() {
        let camera = MockCamera::default();
        let controller = CaptureController::new(camera.clone());

        {
            let scope = controller.scope();
            scope.open().await.unwrap();
            assert_eq!(camera.live_tracks(), 1);
        }

        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(camera.live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_scope_cancels_abandoned_request() {
        let camera = MockCamera::default().with_behavior(MockBehavior::Pending);
        let controller = CaptureController::new(camera.clone());

        {
            let scope = controller.scope();
            let abandoned =
                tokio::time::timeout(std::time::Duration::from_millis(20), scope.open()).await;
            assert!(abandoned.is_err());
            assert_eq!(scope.state(), CaptureState::Idle);
        }

        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(camera.live_tracks(), 0);
    }
}
