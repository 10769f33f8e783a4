//! Capture session
//!
//! [`CaptureSession`] wires the host bridge to the selection controller and
//! the annotation canvas. It owns:
//! - the once-only screenshot fetch (`ready`)
//! - the window candidate snapshot taken at `start`
//! - routing of pointer, keyboard and toolbar input
//! - application of selection effects (toolbar visibility, canvas setup, exit)

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::OnceCell;

use crate::annotations::{AnnotationCanvas, CanvasSettings};
use crate::capture::image::ScreenImage;
use crate::config::PixmarkConfig;
use crate::core::bridge::HostBridge;
use crate::domain::{Mode, Point, Rect, Size};
use crate::render::geometry::rect_for_window;
use crate::session::layout;
use crate::session::messages::{Effect, Key, KeyAction, Modifiers, SelectionEvent, ToolbarAction};
use crate::session::shortcuts::handle_key_event;
use crate::session::state::{Environment, SelectionController};

/// Outcome of the shared screenshot fetch, failures included
pub type SharedImage = Result<Arc<ScreenImage>, Arc<anyhow::Error>>;

pub struct CaptureSession<B: HostBridge> {
    bridge: B,
    config: PixmarkConfig,
    image: OnceCell<SharedImage>,
    /// Snap candidates in priority order, full desktop last
    windows: Vec<Rect>,
    container: Size,
    selection: SelectionController,
    canvas: AnnotationCanvas,
    toolbar_visible: bool,
    exited: bool,
}

impl<B: HostBridge> CaptureSession<B> {
    pub fn new(bridge: B, config: PixmarkConfig) -> Self {
        let canvas = AnnotationCanvas::new(CanvasSettings::from(&config));
        Self {
            bridge,
            config,
            image: OnceCell::new(),
            windows: Vec::new(),
            container: Size::default(),
            selection: SelectionController::new(),
            canvas,
            toolbar_visible: false,
            exited: false,
        }
    }

    /// Screenshot from the host, fetched at most once
    ///
    /// Concurrent callers share the in-flight request and every caller sees
    /// the same result, a failed fetch included.
    pub async fn ready(&self) -> SharedImage {
        self.image
            .get_or_init(|| async move {
                match self.bridge.get_image().await {
                    Ok(image) => Ok(Arc::new(image)),
                    Err(err) => {
                        log::error!("Failed to get screenshot: {:?}", err);
                        Err(Arc::new(err))
                    }
                }
            })
            .await
            .clone()
    }

    /// Fetch the screenshot and take the window candidate snapshot
    pub async fn start(&mut self) -> anyhow::Result<()> {
        let image = self
            .ready()
            .await
            .map_err(|err| anyhow::anyhow!("screenshot unavailable: {:#}", err))?;
        self.container = image.logical_size();

        let host_scale = self.bridge.window_scale();
        let mut windows: Vec<Rect> = match self.bridge.get_windows().await {
            Ok(list) => list
                .iter()
                .map(|w| rect_for_window(w.bounds, host_scale, self.container))
                .filter(|rect| !rect.is_empty())
                .collect(),
            Err(err) => {
                log::warn!("Window enumeration failed, snapping disabled: {:?}", err);
                Vec::new()
            }
        };
        windows.push(Rect::new(0.0, 0.0, self.container.width, self.container.height));
        log::debug!("{} window candidates", windows.len());
        self.windows = windows;
        Ok(())
    }

    pub fn pointer_down(&mut self, pos: Point) -> anyhow::Result<Vec<Effect>> {
        if self.mode() == Mode::Edit {
            self.canvas.pointer_down(pos);
            return Ok(Vec::new());
        }
        self.dispatch(SelectionEvent::PointerDown(pos))
    }

    pub fn pointer_move(&mut self, pos: Point) -> anyhow::Result<Vec<Effect>> {
        if self.mode() == Mode::Edit {
            self.canvas.pointer_move(pos);
            return Ok(Vec::new());
        }
        self.dispatch(SelectionEvent::PointerMove(pos))
    }

    pub fn pointer_up(&mut self, pos: Point) -> anyhow::Result<Vec<Effect>> {
        if self.mode() == Mode::Edit {
            self.canvas.pointer_move(pos);
            self.canvas.pointer_up();
            return Ok(Vec::new());
        }
        self.dispatch(SelectionEvent::PointerUp(pos))
    }

    pub fn pointer_leave(&mut self, pos: Point) -> anyhow::Result<Vec<Effect>> {
        if self.mode() == Mode::Edit {
            return Ok(Vec::new());
        }
        self.dispatch(SelectionEvent::PointerLeave(pos))
    }

    /// Run a toolbar item; failures are logged and returned
    pub async fn toolbar(&mut self, action: ToolbarAction) -> anyhow::Result<Vec<Effect>> {
        let result = self.run_toolbar(action).await;
        if let Err(err) = &result {
            log::error!("Toolbar action {:?} failed: {:?}", action, err);
        }
        result
    }

    pub async fn key(&mut self, key: Key, modifiers: Modifiers) -> anyhow::Result<Vec<Effect>> {
        let has_selection = !self.selection().is_empty();
        match handle_key_event(key, modifiers, self.mode(), has_selection) {
            Some(KeyAction::Exit) => self.dispatch(SelectionEvent::Cancel),
            Some(KeyAction::Toolbar(action)) => self.toolbar(action).await,
            None => Ok(Vec::new()),
        }
    }

    async fn run_toolbar(&mut self, action: ToolbarAction) -> anyhow::Result<Vec<Effect>> {
        match action {
            ToolbarAction::SelectTool(kind) => {
                let effects = self.enter_edit()?;
                self.canvas.set_tool(kind);
                Ok(effects)
            }
            ToolbarAction::Undo => {
                if !self.canvas.undo() {
                    log::debug!("Nothing to undo");
                }
                Ok(Vec::new())
            }
            ToolbarAction::Copy => {
                let mut effects = self.enter_edit()?;
                let png = self.canvas.export_png().context("exporting annotated region")?;
                self.bridge
                    .copy_to_clipboard(png)
                    .await
                    .context("copying to clipboard")?;
                effects.extend(self.finish_export()?);
                Ok(effects)
            }
            ToolbarAction::Save => {
                let mut effects = self.enter_edit()?;
                let png = self.canvas.export_png().context("exporting annotated region")?;
                let path = self
                    .bridge
                    .save_image_to_folder(png)
                    .await
                    .context("saving to folder")?;
                log::info!("Screenshot saved to {}", path.display());
                effects.extend(self.finish_export()?);
                Ok(effects)
            }
            ToolbarAction::Cancel => self.dispatch(SelectionEvent::Cancel),
        }
    }

    /// Freeze the selection for annotating; a no-op when already editing
    fn enter_edit(&mut self) -> anyhow::Result<Vec<Effect>> {
        if self.mode() == Mode::Edit {
            return Ok(Vec::new());
        }
        let selection = self.selection.clone();
        let toolbar_visible = self.toolbar_visible;
        let effects = match self.dispatch(SelectionEvent::EnterEdit) {
            Ok(effects) => effects,
            Err(err) => {
                // stay in the previous mode when the canvas cannot be set up
                self.selection = selection;
                self.toolbar_visible = toolbar_visible;
                return Err(err);
            }
        };
        if self.mode() != Mode::Edit {
            anyhow::bail!("no region selected");
        }
        Ok(effects)
    }

    fn finish_export(&mut self) -> anyhow::Result<Vec<Effect>> {
        if self.config.exit_after_export {
            self.dispatch(SelectionEvent::Cancel)
        } else {
            Ok(Vec::new())
        }
    }

    fn dispatch(&mut self, event: SelectionEvent) -> anyhow::Result<Vec<Effect>> {
        let env = Environment {
            container: self.container,
            windows: &self.windows,
        };
        let effects = self.selection.handle(event, &env);
        for effect in &effects {
            self.apply(*effect)?;
        }
        Ok(effects)
    }

    fn apply(&mut self, effect: Effect) -> anyhow::Result<()> {
        match effect {
            Effect::ToolbarVisible(visible) => self.toolbar_visible = visible,
            Effect::BeginAnnotation(region) => {
                let Some(Ok(image)) = self.image.get() else {
                    anyhow::bail!("no screenshot to annotate");
                };
                self.canvas.install_background(image, region)?;
            }
            Effect::Exit => {
                if !self.exited {
                    self.exited = true;
                    self.bridge.exit();
                }
            }
            Effect::Redraw(_) | Effect::SetCursor { .. } => {}
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.selection.mode()
    }

    pub fn selection(&self) -> Rect {
        self.selection.selection()
    }

    pub fn windows(&self) -> &[Rect] {
        &self.windows
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn canvas(&self) -> &AnnotationCanvas {
        &self.canvas
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn toolbar_visible(&self) -> bool {
        self.toolbar_visible
    }

    pub fn is_exited(&self) -> bool {
        self.exited
    }

    /// Size label for the current selection in device pixels
    pub fn size_label(&self) -> Option<String> {
        let scale = match self.image.get() {
            Some(Ok(image)) => image.scale,
            _ => 1.0,
        };
        layout::size_label(self.selection(), scale)
    }

    pub fn toolbar_anchor(&self, toolbar_width: f32) -> Point {
        layout::toolbar_anchor(self.selection(), toolbar_width, self.container.height)
    }
}
