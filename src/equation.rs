use egui::{Color32, Pos2, Vec2};
use futures::channel::oneshot;
use log::{info, warn};
use thiserror::Error;

use crate::raster::RasterImage;

/// Where an explicit "insert" places the equation, mirroring the fixed
/// top-left placement of the insert shortcut.
pub const DEFAULT_INSERT_POS: Pos2 = Pos2::new(50.0, 50.0);

/// Errors produced by the equation-rendering boundary.
#[derive(Debug, Error)]
pub enum EquationError {
    #[error("equation rendering failed: {0}")]
    RenderFailed(String),
    #[error("equation renderer dropped the request")]
    Dropped,
}

/// A typeset equation: raster pixels plus the natural (unscaled) pixel
/// dimensions reported by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEquation {
    pub image: RasterImage,
    pub natural_size: Vec2,
}

/// How a finished render should be applied.
///
/// "Insert" and "position" are two independent, explicitly triggered
/// placement actions; neither implies the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Place immediately at [`DEFAULT_INSERT_POS`].
    InsertAtDefault,
    /// Arm positioning mode; the next canvas press places the equation.
    Position,
    /// Update the editor preview only; nothing is placed.
    Preview,
}

/// Wrap LaTeX in a color directive so the rendered equation picks up the
/// current drawing color.
pub fn with_color_directive(latex: &str, color: Color32) -> String {
    format!(
        "\\color{{#{:02x}{:02x}{:02x}}}{{{latex}}}",
        color.r(),
        color.g(),
        color.b()
    )
}

/// The "LaTeX in, raster image out" collaborator.
///
/// `render` must eventually fulfil `reply`, possibly from another thread;
/// fulfilment may simply fail if the receiver has since been dropped, which
/// is how stale requests are discarded.
pub trait EquationRenderer {
    fn render(&self, latex: &str, reply: oneshot::Sender<Result<RenderedEquation, EquationError>>);
}

/// A renderer for builds without a typesetting collaborator wired in: every
/// request fails with a clear message, which surfaces through the normal
/// error path (logged, preview stays blank).
pub struct NullEquationRenderer;

impl EquationRenderer for NullEquationRenderer {
    fn render(&self, latex: &str, reply: oneshot::Sender<Result<RenderedEquation, EquationError>>) {
        warn!("no equation renderer configured, rejecting: {latex}");
        let _ = reply.send(Err(EquationError::RenderFailed(
            "no equation renderer is configured".into(),
        )));
    }
}

struct PendingRequest {
    id: u64,
    mode: PlacementMode,
    reply: oneshot::Receiver<Result<RenderedEquation, EquationError>>,
}

/// Drives the asynchronous rendering boundary.
///
/// Each request gets a monotonically increasing id and only the newest one
/// is kept: issuing a new request drops the previous receiver, so a late
/// result for a superseded request fails to deliver and is discarded.
pub struct EquationService {
    renderer: Box<dyn EquationRenderer>,
    next_id: u64,
    pending: Option<PendingRequest>,
}

impl EquationService {
    pub fn new(renderer: Box<dyn EquationRenderer>) -> Self {
        Self {
            renderer,
            next_id: 0,
            pending: None,
        }
    }

    /// Ask the renderer for `latex` in the given color. Returns the request
    /// id; any previously pending request becomes stale.
    pub fn request(&mut self, latex: &str, color: Color32, mode: PlacementMode) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if let Some(stale) = self.pending.take() {
            info!("superseding equation request {}", stale.id);
        }
        let (tx, rx) = oneshot::channel();
        info!("equation request {id}: {latex}");
        self.renderer.render(&with_color_directive(latex, color), tx);
        self.pending = Some(PendingRequest {
            id,
            mode,
            reply: rx,
        });
        id
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget the pending request, if any; its result will be discarded.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Poll the newest request once per frame. Returns the outcome together
    /// with its placement mode when the renderer has replied.
    pub fn poll(&mut self) -> Option<(PlacementMode, Result<RenderedEquation, EquationError>)> {
        let pending = self.pending.as_mut()?;
        match pending.reply.try_recv() {
            Ok(None) => None,
            Ok(Some(result)) => {
                let pending = self.pending.take().expect("pending request exists");
                info!("equation request {} resolved", pending.id);
                Some((pending.mode, result))
            }
            Err(oneshot::Canceled) => {
                let pending = self.pending.take().expect("pending request exists");
                warn!("equation request {} dropped by renderer", pending.id);
                Some((pending.mode, Err(EquationError::Dropped)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type ReplySender = oneshot::Sender<Result<RenderedEquation, EquationError>>;

    /// Captures requests so the test controls when each one resolves.
    struct CapturingRenderer {
        requests: Rc<RefCell<Vec<(String, ReplySender)>>>,
    }

    fn capturing() -> (Rc<RefCell<Vec<(String, ReplySender)>>>, EquationService) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let renderer = CapturingRenderer {
            requests: requests.clone(),
        };
        (requests, EquationService::new(Box::new(renderer)))
    }

    impl EquationRenderer for CapturingRenderer {
        fn render(&self, latex: &str, reply: ReplySender) {
            self.requests.borrow_mut().push((latex.to_owned(), reply));
        }
    }

    fn solid(w: usize, h: usize) -> RenderedEquation {
        RenderedEquation {
            image: RasterImage::new([w, h], vec![Color32::BLACK; w * h]),
            natural_size: egui::vec2(w as f32, h as f32),
        }
    }

    #[test]
    fn test_color_directive_wraps_latex() {
        assert_eq!(
            with_color_directive("x^2", Color32::from_rgb(0xff, 0x00, 0x7f)),
            "\\color{#ff007f}{x^2}"
        );
    }

    #[test]
    fn test_request_ids_increase() {
        let (_requests, mut service) = capturing();
        let a = service.request("a", Color32::BLACK, PlacementMode::Position);
        let b = service.request("b", Color32::BLACK, PlacementMode::Position);
        assert!(b > a);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let (requests, mut service) = capturing();
        service.request("old", Color32::BLACK, PlacementMode::InsertAtDefault);
        service.request("new", Color32::BLACK, PlacementMode::Position);

        let mut captured = requests.borrow_mut();
        let (_, old_reply) = captured.remove(0);
        // The old receiver is gone; the late fulfilment has nowhere to go.
        assert!(old_reply.send(Ok(solid(2, 2))).is_err());

        let (_, new_reply) = captured.remove(0);
        new_reply.send(Ok(solid(4, 4))).unwrap();
        drop(captured);

        let (mode, result) = service.poll().expect("newest result is delivered");
        assert_eq!(mode, PlacementMode::Position);
        assert_eq!(result.unwrap().natural_size, egui::vec2(4.0, 4.0));
        assert!(service.poll().is_none());
    }

    #[test]
    fn test_poll_reports_dropped_renderer() {
        let (requests, mut service) = capturing();
        service.request("x", Color32::BLACK, PlacementMode::Position);
        requests.borrow_mut().clear();

        let (_, result) = service.poll().expect("drop is reported");
        assert!(matches!(result, Err(EquationError::Dropped)));
    }

    #[test]
    fn test_cancel_forgets_pending() {
        let (_requests, mut service) = capturing();
        service.request("x", Color32::BLACK, PlacementMode::Position);
        assert!(service.has_pending());
        service.cancel();
        assert!(!service.has_pending());
        assert!(service.poll().is_none());
    }
}
