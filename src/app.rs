use eframe::egui::{self, Color32, Pos2, Rect, TextureHandle, TextureOptions};
use log::{error, info, warn};

use crate::background::{Background, BlobStore};
use crate::controller::{self, Controller, PointerEvent, Redraw};
use crate::document::ActionLog;
use crate::equation::{
    EquationRenderer, EquationService, PlacementMode, DEFAULT_INSERT_POS,
};
use crate::file_handler::FileHandler;
use crate::panels;
use crate::raster::Surface;
use crate::renderer::{self, CanvasTexture};
use crate::tool::ToolContext;

// eframe's key-value storage is the app's blob store: one string per key,
// persisted by the framework.
impl<'a> BlobStore for (dyn eframe::Storage + 'a) {
    fn get(&self, key: &str) -> Option<String> {
        self.get_string(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.set_string(key, value);
    }
}

/// How long the LaTeX/color must stay unchanged before the preview is
/// re-typeset.
const PREVIEW_DEBOUNCE_SECS: f64 = 0.25;

/// UI state of the equation editor window.
pub struct EquationEditor {
    pub open: bool,
    pub latex: String,
    /// Preview of the most recent successful render; stays `None` (blank)
    /// after a failure.
    pub preview: Option<TextureHandle>,
    pub status: String,
    /// The (latex, color) pair the current preview or in-flight request
    /// corresponds to.
    preview_source: Option<(String, Color32)>,
    /// Candidate for the next preview request and when it was first seen;
    /// any change to the candidate restarts the clock.
    debounce: Option<(String, Color32, f64)>,
}

impl Default for EquationEditor {
    fn default() -> Self {
        Self {
            open: false,
            latex: String::new(),
            preview: None,
            status: String::new(),
            preview_source: None,
            debounce: None,
        }
    }
}

impl EquationEditor {
    /// The (latex, color) pair that should be re-typeset for the preview,
    /// once the content has been stable for the debounce interval. The
    /// preview tracks edits and color changes while the editor is open.
    fn due_preview(&mut self, color: Color32, now: f64) -> Option<(String, Color32)> {
        if !self.open {
            self.debounce = None;
            return None;
        }
        let latex = self.latex.trim();
        if latex.is_empty() {
            self.preview = None;
            self.preview_source = None;
            self.debounce = None;
            return None;
        }
        if self
            .preview_source
            .as_ref()
            .is_some_and(|(l, c)| l == latex && *c == color)
        {
            self.debounce = None;
            return None;
        }
        match &self.debounce {
            Some((l, c, since)) if l == latex && *c == color => {
                if now - since >= PREVIEW_DEBOUNCE_SECS {
                    let source = (latex.to_owned(), color);
                    self.debounce = None;
                    self.preview_source = Some(source.clone());
                    Some(source)
                } else {
                    None
                }
            }
            _ => {
                self.debounce = Some((latex.to_owned(), color, now));
                None
            }
        }
    }

    fn debounce_pending(&self) -> bool {
        self.debounce.is_some()
    }

    /// Record that a request for this content is already in flight, so the
    /// preview logic does not immediately supersede it.
    fn note_requested(&mut self, latex: &str, color: Color32) {
        self.preview_source = Some((latex.to_owned(), color));
        self.debounce = None;
    }
}

pub struct WhiteboardApp {
    pub(crate) tool_ctx: ToolContext,
    pub(crate) log: ActionLog,
    pub(crate) controller: Controller,
    pub(crate) editor: EquationEditor,
    pub(crate) equations: EquationService,
    pub(crate) notice: Option<String>,

    surface: Surface,
    /// How many log entries are already painted on `surface`.
    painted: usize,
    canvas_dirty: bool,
    canvas_texture: CanvasTexture,
    canvas_size: [usize; 2],
    last_pointer: Option<Pos2>,

    background: Background,
    background_texture: Option<TextureHandle>,
    file_handler: FileHandler,
}

impl WhiteboardApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, renderer: Box<dyn EquationRenderer>) -> Self {
        let tool_ctx = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let background = match cc.storage {
            Some(storage) => Background::load(storage),
            None => Background::new(),
        };

        Self {
            tool_ctx,
            log: ActionLog::new(),
            controller: Controller::new(),
            editor: EquationEditor::default(),
            equations: EquationService::new(renderer),
            notice: None,
            surface: Surface::new(1, 1),
            painted: 0,
            canvas_dirty: true,
            canvas_texture: CanvasTexture::new("whiteboard_canvas"),
            canvas_size: [1, 1],
            last_pointer: None,
            background,
            background_texture: None,
            file_handler: FileHandler::new(),
        }
    }

    /// Empty the log and the raster in one step.
    pub fn clear_canvas(&mut self) {
        info!("clearing canvas ({} actions)", self.log.len());
        self.log.clear();
        self.surface.clear();
        self.painted = 0;
        self.canvas_dirty = true;
    }

    /// Match the surface to the canvas rect, replaying on any size change.
    pub(crate) fn ensure_canvas_size(&mut self, rect: Rect) {
        let size = [
            (rect.width().round() as usize).max(1),
            (rect.height().round() as usize).max(1),
        ];
        if size != self.canvas_size {
            self.canvas_size = size;
            self.replay_canvas();
        }
    }

    fn replay_canvas(&mut self) {
        self.surface = renderer::replay(&self.log, self.canvas_size);
        self.painted = self.log.len();
        self.canvas_dirty = true;
    }

    pub(crate) fn apply_event(&mut self, event: PointerEvent) {
        match self.controller.handle_event(event, &self.tool_ctx, &mut self.log) {
            Redraw::Full => self.replay_canvas(),
            Redraw::Appended | Redraw::None => {}
        }
    }

    /// Paint any not-yet-painted log entries and re-upload the texture if
    /// the raster changed this frame.
    pub(crate) fn sync_canvas(&mut self, ctx: &egui::Context) {
        while self.painted < self.log.len() {
            if let Some(action) = self.log.get(self.painted) {
                renderer::draw_action(&mut self.surface, action);
            }
            self.painted += 1;
            self.canvas_dirty = true;
        }
        if self.canvas_dirty {
            self.canvas_texture.upload(ctx, &self.surface);
            self.canvas_dirty = false;
        }
    }

    pub(crate) fn canvas_texture(&self) -> Option<&TextureHandle> {
        self.canvas_texture.handle()
    }

    pub(crate) fn background_texture(&mut self, ctx: &egui::Context) -> Option<&TextureHandle> {
        if self.background_texture.is_none() {
            if let Some(image) = self.background.image() {
                self.background_texture = Some(ctx.load_texture(
                    "whiteboard_background",
                    image.to_color_image(),
                    TextureOptions::LINEAR,
                ));
            }
        }
        self.background_texture.as_ref()
    }

    /// Issue an equation render request for the editor's current LaTeX.
    pub(crate) fn request_equation(&mut self, mode: PlacementMode) {
        let latex = self.editor.latex.trim().to_owned();
        if latex.is_empty() {
            self.editor.status = "Enter an equation first".to_owned();
            return;
        }
        self.equations.request(&latex, self.tool_ctx.color, mode);
        self.editor.note_requested(&latex, self.tool_ctx.color);
        self.editor.status = "Rendering…".to_owned();
    }

    /// Apply any finished equation render.
    fn poll_equations(&mut self, ctx: &egui::Context) {
        if let Some((mode, result)) = self.equations.poll() {
            match result {
                Ok(rendered) => {
                    self.editor.preview = Some(ctx.load_texture(
                        "equation_preview",
                        rendered.image.to_color_image(),
                        TextureOptions::LINEAR,
                    ));
                    self.editor.status.clear();
                    match mode {
                        PlacementMode::InsertAtDefault => {
                            controller::place_equation(
                                &mut self.log,
                                rendered,
                                DEFAULT_INSERT_POS,
                                self.tool_ctx.equation_scale,
                            );
                        }
                        PlacementMode::Position => {
                            self.controller.begin_positioning(rendered);
                            self.editor.open = false;
                        }
                        // Preview-only renders just refresh the texture.
                        PlacementMode::Preview => {}
                    }
                }
                Err(e) => {
                    // The preview simply stays blank; nothing else changes.
                    warn!("equation rendering failed: {e}");
                    self.editor.status = "Rendering failed".to_owned();
                }
            }
        }
        if self.equations.has_pending() {
            ctx.request_repaint();
        }
    }

    /// Keep the preview in step with the editor: a settled change to the
    /// LaTeX or the drawing color triggers a fresh preview render.
    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        if let Some((latex, color)) = self.editor.due_preview(self.tool_ctx.color, now) {
            self.equations.request(&latex, color, PlacementMode::Preview);
        }
        if self.editor.debounce_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }

    fn process_dropped_background(&mut self, ctx: &egui::Context) {
        self.file_handler.check_for_dropped_files(ctx);
        if let Some(bytes) = self.file_handler.take_background_candidate() {
            match self.background.set_from_bytes(&bytes) {
                Ok(()) => {
                    self.background_texture = None;
                }
                Err(e) => {
                    error!("could not set background image: {e}");
                    self.notice = Some(format!("Could not set the background image: {e}"));
                }
            }
        }
        self.file_handler.preview_files_being_dropped(ctx);
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.notice.clone() {
            egui::Window::new("Notice")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("Close").clicked() {
                        self.notice = None;
                    }
                });
        }
    }

    /// Convert this frame's raw pointer input into canvas-local events.
    pub(crate) fn gather_pointer_events(
        &mut self,
        ctx: &egui::Context,
        canvas_rect: Rect,
    ) -> Vec<PointerEvent> {
        ctx.input(|i| {
            pointer_events(
                canvas_rect,
                i.pointer.hover_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                &mut self.last_pointer,
            )
        })
    }
}

/// Translate one frame of raw pointer state into canvas-local events.
///
/// `last_pointer` carries the previous frame's hover position across calls.
/// Crossing the canvas edge emits `Left` even while the button is held, so
/// a stroke ends at the edge instead of resuming with a straight segment
/// from the exit point when the pointer comes back.
fn pointer_events(
    canvas_rect: Rect,
    hover: Option<Pos2>,
    pressed: bool,
    released: bool,
    last_pointer: &mut Option<Pos2>,
) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let to_local = |pos: Pos2| (pos - canvas_rect.min).to_pos2();
    let was_inside = last_pointer.is_some_and(|prev| canvas_rect.contains(prev));

    if pressed {
        if let Some(pos) = hover.filter(|pos| canvas_rect.contains(*pos)) {
            events.push(PointerEvent::Pressed(to_local(pos)));
        }
    }

    match hover {
        Some(pos) if canvas_rect.contains(pos) => {
            if *last_pointer != Some(pos) {
                events.push(PointerEvent::Moved(to_local(pos)));
            }
            *last_pointer = Some(pos);
        }
        Some(pos) => {
            if was_inside {
                events.push(PointerEvent::Left);
            }
            *last_pointer = Some(pos);
        }
        None => {
            if last_pointer.is_some() {
                events.push(PointerEvent::Left);
                *last_pointer = None;
            }
        }
    }

    if released {
        events.push(PointerEvent::Released);
    }
    events
}

impl eframe::App for WhiteboardApp {
    /// Called by the framework to persist state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.tool_ctx);
        self.background.save(storage);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_equations(ctx);
        self.refresh_preview(ctx);
        self.process_dropped_background(ctx);

        panels::tools_panel(self, ctx);
        panels::equation_editor(self, ctx);
        panels::central_panel(self, ctx);

        self.show_notice(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolContext;
    use egui::{pos2, vec2};

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(100.0, 0.0), vec2(200.0, 200.0))
    }

    #[test]
    fn test_crossing_the_canvas_edge_emits_left() {
        let mut last = None;

        let inside = pointer_events(canvas(), Some(pos2(150.0, 50.0)), false, false, &mut last);
        assert_eq!(inside, vec![PointerEvent::Moved(pos2(50.0, 50.0))]);

        // Onto the side panel: still hovered by the window, off the canvas.
        let exit = pointer_events(canvas(), Some(pos2(50.0, 50.0)), false, false, &mut last);
        assert_eq!(exit, vec![PointerEvent::Left]);

        // Staying outside emits nothing further.
        let outside = pointer_events(canvas(), Some(pos2(40.0, 50.0)), false, false, &mut last);
        assert!(outside.is_empty());
    }

    #[test]
    fn test_leaving_the_window_emits_left() {
        let mut last = None;
        let _ = pointer_events(canvas(), Some(pos2(150.0, 50.0)), false, false, &mut last);
        let gone = pointer_events(canvas(), None, false, false, &mut last);
        assert_eq!(gone, vec![PointerEvent::Left]);
        assert_eq!(last, None);
    }

    #[test]
    fn test_stroke_ends_at_canvas_edge_and_does_not_resume() {
        let mut last = None;
        let mut controller = Controller::new();
        let tool_ctx = ToolContext::default();
        let mut log = ActionLog::new();

        // Press and draw one segment, drag off onto the side panel with the
        // button still down, then come back and keep moving.
        let frames = [
            (Some(pos2(150.0, 50.0)), false, false),
            (Some(pos2(150.0, 50.0)), true, false),
            (Some(pos2(160.0, 50.0)), false, false),
            (Some(pos2(50.0, 50.0)), false, false),
            (Some(pos2(170.0, 50.0)), false, false),
            (Some(pos2(180.0, 50.0)), false, false),
            (None, false, true),
        ];
        for (hover, pressed, released) in frames {
            for event in pointer_events(canvas(), hover, pressed, released, &mut last) {
                let _ = controller.handle_event(event, &tool_ctx, &mut log);
            }
        }

        // Only the pre-exit segment exists; re-entry without a new press
        // must not draw a stroke across the canvas.
        assert_eq!(log.len(), 1);
        let line = log.get(0).unwrap().as_line().unwrap();
        assert_eq!(line.start, pos2(50.0, 50.0));
        assert_eq!(line.end, pos2(60.0, 50.0));
    }

    #[test]
    fn test_preview_retypesets_after_edit_settles() {
        let mut editor = EquationEditor {
            open: true,
            latex: "x".to_owned(),
            ..Default::default()
        };

        assert_eq!(editor.due_preview(Color32::BLACK, 0.0), None);
        assert_eq!(editor.due_preview(Color32::BLACK, 0.1), None);
        assert_eq!(
            editor.due_preview(Color32::BLACK, 0.3),
            Some(("x".to_owned(), Color32::BLACK))
        );
        // Stable content does not re-request.
        assert_eq!(editor.due_preview(Color32::BLACK, 0.6), None);

        // A color change re-typesets the same latex.
        assert_eq!(editor.due_preview(Color32::RED, 0.6), None);
        assert_eq!(
            editor.due_preview(Color32::RED, 1.0),
            Some(("x".to_owned(), Color32::RED))
        );
    }

    #[test]
    fn test_edits_restart_the_preview_debounce() {
        let mut editor = EquationEditor {
            open: true,
            latex: "x".to_owned(),
            ..Default::default()
        };

        assert_eq!(editor.due_preview(Color32::BLACK, 0.0), None);
        editor.latex = "x^2".to_owned();
        assert_eq!(editor.due_preview(Color32::BLACK, 0.2), None);
        assert_eq!(editor.due_preview(Color32::BLACK, 0.4), None);
        assert_eq!(
            editor.due_preview(Color32::BLACK, 0.5),
            Some(("x^2".to_owned(), Color32::BLACK))
        );
    }

    #[test]
    fn test_in_flight_request_is_not_superseded_by_preview() {
        let mut editor = EquationEditor {
            open: true,
            latex: "x".to_owned(),
            ..Default::default()
        };
        editor.note_requested("x", Color32::BLACK);
        assert_eq!(editor.due_preview(Color32::BLACK, 10.0), None);
        assert_eq!(editor.due_preview(Color32::BLACK, 20.0), None);
    }

    #[test]
    fn test_clearing_the_latex_clears_the_preview_state() {
        let mut editor = EquationEditor {
            open: true,
            latex: "x".to_owned(),
            ..Default::default()
        };
        let _ = editor.due_preview(Color32::BLACK, 0.0);
        let _ = editor.due_preview(Color32::BLACK, 0.5);

        editor.latex = "  ".to_owned();
        assert_eq!(editor.due_preview(Color32::BLACK, 1.0), None);
        assert!(editor.preview_source.is_none());
        assert!(!editor.debounce_pending());
    }
}
