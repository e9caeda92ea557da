//! Application context.
//!
//! [`AnnotationApp`] owns the viewport, the point store, the interaction
//! controller and the session state (selection, editor, image viewer, pending
//! confirmation). File dialogs, image resizing and drawing are injected
//! collaborators. Every state change ends with a call to
//! [`Renderer::render`] carrying a read-only [`Scene`].

use thiserror::Error;
use web_time::Instant;

use crate::config::AppConfig;
use crate::constants::{MAX_POINT_NUMBER, VIEWER_KEY_DEBOUNCE};
use crate::file_io::{FileOutcome, FileService};
use crate::format::{BackgroundImage, FormatError, Project, ProjectFormat};
use crate::imaging::{self, ImageResizer, RasterResizer};
use crate::interaction::{InteractionController, InteractionOutcome, PointerEvent};
use crate::model::{
    Direction, NumberChange, Point, PointEdit, PointId, PointStore, Position, StoreError,
};
use crate::viewport::{Size, Viewport};


/// Errors returned by application operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input that is not a valid point number
    #[error("Invalid number {input:?}: enter a whole number between 1 and {max}")]
    InvalidNumberInput { input: String, max: u32 },

    /// Save requested before a background image was loaded
    #[error("Nothing to save: load a background image first")]
    NothingToSave,

    /// Operation needs a background image
    #[error("No background image loaded")]
    NoBackground,

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An action waiting for the user to confirm it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Give `id` a number that `holder` already has, shifting later points.
    Renumber {
        id: PointId,
        number: u32,
        holder: PointId,
    },
    /// Renumber every point from the new starting number.
    RenumberAll { starting_number: u32 },
}

/// Result of a numbering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRequest {
    Applied,
    /// The requested value was already in effect.
    Unchanged,
    /// Parked as a [`Confirmation`]; call [`AnnotationApp::confirm`] to apply.
    NeedsConfirmation,
}

/// Keys understood by the image viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    Left,
    Right,
}

/// Read-only snapshot handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub viewport: &'a Viewport,
    pub background: Option<&'a BackgroundImage>,
    /// Ascending by number.
    pub points: &'a [Point],
    /// Whether points changed since the previous render.
    pub points_changed: bool,
    /// Point shown in the details panel.
    pub selected: Option<&'a PointId>,
    /// Point open in the editor.
    pub editing: Option<&'a PointId>,
    /// Point shown in the image viewer.
    pub viewer: Option<&'a PointId>,
    pub add_mode: bool,
    pub add_preview: Option<Position>,
    /// Point being dragged and where to draw it instead of its stored position.
    pub drag_preview: Option<(&'a PointId, Position)>,
    pub confirmation: Option<&'a Confirmation>,
}

/// Draws the current state.
pub trait Renderer {
    fn render(&mut self, scene: &Scene<'_>);
}

/// The annotation session: one background, its points and the UI state
/// around them.
pub struct AnnotationApp<F: FileService, R: Renderer> {
    config: AppConfig,
    viewport: Viewport,
    store: PointStore,
    controller: InteractionController,
    background: Option<BackgroundImage>,
    selected: Option<PointId>,
    editing: Option<PointId>,
    viewer: Option<PointId>,
    confirmation: Option<Confirmation>,
    save_handle: Option<F::Handle>,
    last_viewer_key: Option<Instant>,
    format: ProjectFormat,
    files: F,
    renderer: R,
    resizer: Box<dyn ImageResizer>,
}

impl<F: FileService, R: Renderer> AnnotationApp<F, R> {
    /// Create the application. An invalid configuration is replaced by the
    /// defaults.
    pub fn new(config: AppConfig, files: F, renderer: R) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid configuration ({}), using defaults", e);
                AppConfig::default()
            }
        };
        let viewport = Viewport::new(config.scale_limits());
        let store = PointStore::with_starting_number(config.preferences.starting_point_number);
        let controller =
            InteractionController::new(config.interaction.drag_threshold, config.viewport.zoom_step);
        Self {
            config,
            viewport,
            store,
            controller,
            background: None,
            selected: None,
            editing: None,
            viewer: None,
            confirmation: None,
            save_handle: None,
            last_viewer_key: None,
            format: ProjectFormat,
            files,
            renderer,
            resizer: Box::new(RasterResizer),
        }
    }

    /// Replace the image resizer used for attached images.
    pub fn with_resizer(mut self, resizer: Box<dyn ImageResizer>) -> Self {
        self.resizer = resizer;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }

    pub fn selected(&self) -> Option<&PointId> {
        self.selected.as_ref()
    }

    pub fn editing(&self) -> Option<&PointId> {
        self.editing.as_ref()
    }

    pub fn viewer(&self) -> Option<&PointId> {
        self.viewer.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Handle of the file the project was last saved to.
    pub fn save_handle(&self) -> Option<&F::Handle> {
        self.save_handle.as_ref()
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Snapshot for serialization, `None` until a background is loaded.
    pub fn project(&self) -> Option<Project> {
        self.background
            .as_ref()
            .map(|background| Project::new(background.clone(), &self.store))
    }

    // ========================================================================
    // Background and view
    // ========================================================================

    /// Use uploaded PNG or JPEG bytes as the background. Points are kept.
    pub fn load_background(&mut self, bytes: &[u8]) -> Result<(), AppError> {
        let background = BackgroundImage::from_bytes(bytes)?;
        let (width, height) = background.size();
        log::info!("Loaded {}x{} background image", width, height);

        self.background = Some(background);
        self.viewport.reset();
        self.layout_background();
        self.store.mark_dirty();
        self.render();
        Ok(())
    }

    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.viewport.set_container_size(Size::new(width, height));
        self.layout_background();
        self.render();
    }

    /// Feed a pointer event to the interaction controller.
    ///
    /// Ignored until a background is loaded. A clicked point is selected; a
    /// newly added point is selected and opened in the editor.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InteractionOutcome {
        if self.background.is_none() {
            return InteractionOutcome::Ignored;
        }

        let outcome = self
            .controller
            .handle(event, &mut self.viewport, &mut self.store);
        match &outcome {
            InteractionOutcome::PointClicked(id) => {
                self.selected = Some(id.clone());
            }
            InteractionOutcome::PointAdded(id) => {
                self.selected = Some(id.clone());
                self.editing = Some(id.clone());
            }
            _ => {}
        }

        if outcome != InteractionOutcome::Ignored {
            self.render();
        }
        outcome
    }

    /// Toggle add-point mode. Returns whether it is now on.
    pub fn toggle_add_point(&mut self) -> Result<bool, AppError> {
        if self.background.is_none() {
            return Err(AppError::NoBackground);
        }
        let adding = self.controller.toggle_add_point();
        self.render();
        Ok(adding)
    }

    pub fn zoom_in(&mut self) -> bool {
        let step = self.controller.zoom_step();
        self.zoom_by(step)
    }

    pub fn zoom_out(&mut self) -> bool {
        let step = self.controller.zoom_step();
        self.zoom_by(1.0 / step)
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        self.render();
    }

    fn zoom_by(&mut self, factor: f64) -> bool {
        if self.background.is_none() {
            return false;
        }
        let changed = self.viewport.zoom_at_center(factor);
        if changed {
            self.render();
        }
        changed
    }

    fn layout_background(&mut self) {
        let Some(background) = &self.background else {
            return;
        };
        let (width, height) = background.size();
        let natural = Size::new(f64::from(width), f64::from(height));
        let container = self.viewport.container_size();
        let content = if container.is_empty() {
            natural
        } else {
            natural.fit_within(container)
        };
        self.viewport.set_content_size(content);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Show a point in the details panel.
    pub fn select(&mut self, id: &PointId) -> Result<(), AppError> {
        self.require_point(id)?;
        self.selected = Some(id.clone());
        self.render();
        Ok(())
    }

    /// Select the point before the selected one. Returns the new selection.
    pub fn select_previous(&mut self) -> Option<PointId> {
        self.step_selection(Direction::Previous)
    }

    /// Select the point after the selected one. Returns the new selection.
    pub fn select_next(&mut self) -> Option<PointId> {
        self.step_selection(Direction::Next)
    }

    fn step_selection(&mut self, direction: Direction) -> Option<PointId> {
        let current = self.selected.as_ref()?;
        let next = self.store.step(current, direction)?.id.clone();
        self.selected = Some(next.clone());
        self.render();
        Some(next)
    }

    /// Hide the details panel and the editor.
    pub fn close_details(&mut self) {
        self.selected = None;
        self.editing = None;
        self.render();
    }

    // ========================================================================
    // Point edits
    // ========================================================================

    /// Open the editor for a point.
    pub fn open_editor(&mut self, id: &PointId) -> Result<(), AppError> {
        self.require_point(id)?;
        self.editing = Some(id.clone());
        self.render();
        Ok(())
    }

    pub fn close_editor(&mut self) {
        self.editing = None;
        self.render();
    }

    /// Save title and description (both trimmed), close the editor and show
    /// the point's details.
    pub fn edit_point(&mut self, id: &PointId, title: &str, description: &str) -> Result<(), AppError> {
        self.store.edit(
            id,
            PointEdit::new()
                .title(title.trim())
                .description(description.trim()),
        )?;
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        self.selected = Some(id.clone());
        self.render();
        Ok(())
    }

    /// Attach an uploaded PNG or JPEG to a point, downscaled to the
    /// configured maximum size.
    pub fn attach_point_image(&mut self, id: &PointId, bytes: &[u8]) -> Result<(), AppError> {
        self.require_point(id)?;
        let data_url = imaging::downscale_to_data_url(
            self.resizer.as_ref(),
            bytes,
            self.config.images.max_image_size,
        )?;
        self.store.edit(id, PointEdit::new().image(data_url))?;
        log::debug!("Attached image to point {}", id);
        self.render();
        Ok(())
    }

    pub fn remove_point_image(&mut self, id: &PointId) -> Result<(), AppError> {
        self.store.edit(id, PointEdit::new().clear_image())?;
        if self.viewer.as_ref() == Some(id) {
            self.viewer = None;
        }
        self.render();
        Ok(())
    }

    /// Delete a point; remaining points are renumbered.
    ///
    /// If the deleted point was selected, the first remaining point becomes
    /// selected. Asking the user first is up to the caller.
    pub fn delete_point(&mut self, id: &PointId) -> Result<Point, AppError> {
        let removed = self
            .store
            .remove(id)
            .ok_or_else(|| StoreError::PointNotFound { id: id.clone() })?;

        if self.selected.as_ref() == Some(id) {
            self.selected = self.store.first().map(|p| p.id.clone());
        }
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }
        if self.viewer.as_ref() == Some(id) {
            self.viewer = None;
        }
        let stale = matches!(
            &self.confirmation,
            Some(Confirmation::Renumber { id: target, holder, .. }) if target == id || holder == id
        );
        if stale {
            self.confirmation = None;
        }

        log::info!("Deleted point {} ({})", removed.number, removed.id);
        self.render();
        Ok(removed)
    }

    fn require_point(&self, id: &PointId) -> Result<&Point, AppError> {
        self.store
            .get(id)
            .ok_or_else(|| StoreError::PointNotFound { id: id.clone() }.into())
    }

    // ========================================================================
    // Numbering
    // ========================================================================

    /// Parse a point number typed by the user.
    pub fn parse_number(input: &str) -> Result<u32, AppError> {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_POINT_NUMBER).contains(n))
            .ok_or_else(|| AppError::InvalidNumberInput {
                input: input.to_string(),
                max: MAX_POINT_NUMBER,
            })
    }

    /// Give a point the number typed by the user.
    ///
    /// A number held by another point is not applied; it is parked as a
    /// [`Confirmation::Renumber`] instead.
    pub fn request_number(&mut self, id: &PointId, input: &str) -> Result<NumberRequest, AppError> {
        let number = Self::parse_number(input)?;

        if let Some(holder) = self.store.number_conflict(id, number)? {
            self.confirmation = Some(Confirmation::Renumber {
                id: id.clone(),
                number,
                holder: holder.id.clone(),
            });
            self.render();
            return Ok(NumberRequest::NeedsConfirmation);
        }

        let request = match self.store.set_number(id, number)? {
            NumberChange::Unchanged => NumberRequest::Unchanged,
            _ => NumberRequest::Applied,
        };
        self.render();
        Ok(request)
    }

    /// Adopt a new starting number typed by the user.
    ///
    /// If points exist, renumbering them is parked as a
    /// [`Confirmation::RenumberAll`].
    pub fn request_starting_number(&mut self, input: &str) -> Result<NumberRequest, AppError> {
        let starting_number = Self::parse_number(input)?;
        if starting_number == self.store.starting_number() {
            return Ok(NumberRequest::Unchanged);
        }

        self.store.set_starting_number(starting_number)?;
        log::info!("Starting number set to {}", starting_number);

        if self.store.is_empty() {
            self.render();
            return Ok(NumberRequest::Applied);
        }
        self.confirmation = Some(Confirmation::RenumberAll { starting_number });
        self.render();
        Ok(NumberRequest::NeedsConfirmation)
    }

    /// Apply the pending confirmation. Returns `false` if there was none.
    pub fn confirm(&mut self) -> Result<bool, AppError> {
        let Some(confirmation) = self.confirmation.take() else {
            return Ok(false);
        };

        match confirmation {
            Confirmation::Renumber { id, number, .. } => {
                self.store.set_number(&id, number)?;
            }
            Confirmation::RenumberAll { starting_number } => {
                self.store.set_starting_number(starting_number)?;
                self.store.renumber_all()?;
            }
        }
        self.render();
        Ok(true)
    }

    /// Drop the pending confirmation without applying it.
    pub fn dismiss_confirmation(&mut self) {
        if self.confirmation.take().is_some() {
            self.render();
        }
    }

    // ========================================================================
    // Image viewer
    // ========================================================================

    /// Show a point's image. Returns `false` if the point has no image.
    pub fn open_image_viewer(&mut self, id: &PointId) -> Result<bool, AppError> {
        if !self.require_point(id)?.has_image() {
            return Ok(false);
        }
        self.viewer = Some(id.clone());
        self.render();
        Ok(true)
    }

    pub fn close_image_viewer(&mut self) {
        if self.viewer.take().is_some() {
            self.render();
        }
    }

    /// Show the previous or next point that has an image, wrapping around.
    pub fn viewer_step(&mut self, direction: Direction) -> bool {
        let Some(current) = &self.viewer else {
            return false;
        };
        let Some(next) = self.store.cycle_image(current, direction) else {
            return false;
        };
        self.viewer = Some(next.id.clone());
        self.render();
        true
    }

    /// Handle a key press while the image viewer is open.
    pub fn handle_viewer_key(&mut self, key: ViewerKey) -> bool {
        self.handle_viewer_key_at(key, Instant::now())
    }

    /// [`AnnotationApp::handle_viewer_key`] with an explicit timestamp.
    ///
    /// Presses closer than the debounce interval to the last handled press
    /// are dropped.
    pub fn handle_viewer_key_at(&mut self, key: ViewerKey, now: Instant) -> bool {
        if self.viewer.is_none() {
            return false;
        }
        let too_soon = self
            .last_viewer_key
            .is_some_and(|last| now.saturating_duration_since(last) < VIEWER_KEY_DEBOUNCE);
        if too_soon {
            log::trace!("Debounced viewer key {:?}", key);
            return false;
        }
        self.last_viewer_key = Some(now);

        match key {
            ViewerKey::Escape => {
                self.close_image_viewer();
                true
            }
            ViewerKey::Left => self.viewer_step(Direction::Previous),
            ViewerKey::Right => self.viewer_step(Direction::Next),
        }
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Save the project, overwriting the last saved file if there is one.
    pub async fn save_project(&mut self) -> Result<FileOutcome<()>, AppError> {
        self.save(false).await
    }

    /// Save the project to a newly chosen file.
    pub async fn save_project_as(&mut self) -> Result<FileOutcome<()>, AppError> {
        self.save(true).await
    }

    async fn save(&mut self, choose_file: bool) -> Result<FileOutcome<()>, AppError> {
        let project = self.project().ok_or(AppError::NothingToSave)?;
        let bytes = self.format.serialize(&project)?;
        let name = self.format.suggested_file_name();
        let existing = if choose_file {
            None
        } else {
            self.save_handle.as_ref()
        };

        let result = self.files.save(bytes, &name, existing).await;
        match result {
            Ok(FileOutcome::Completed(handle)) => {
                log::info!("Saved project with {} points", project.points.len());
                self.save_handle = Some(handle);
                Ok(FileOutcome::Completed(()))
            }
            Ok(FileOutcome::Cancelled) => Ok(FileOutcome::Cancelled),
            Err(e) => {
                log::error!("Saving project failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Let the user pick a project file and load it.
    ///
    /// The current project is only replaced once the file has been read and
    /// validated; on any failure it stays as it was.
    pub async fn open_project(&mut self) -> Result<FileOutcome<()>, AppError> {
        let bytes = match self.files.open_for_read().await {
            Ok(FileOutcome::Completed(bytes)) => bytes,
            Ok(FileOutcome::Cancelled) => return Ok(FileOutcome::Cancelled),
            Err(e) => {
                log::error!("Reading project failed: {}", e);
                return Err(e.into());
            }
        };

        let project = self.format.deserialize(&bytes).inspect_err(|e| {
            log::error!("Loading project failed: {}", e);
        })?;
        self.apply_project(project)?;
        Ok(FileOutcome::Completed(()))
    }

    fn apply_project(&mut self, project: Project) -> Result<(), AppError> {
        self.store
            .replace_all(project.starting_number, project.points)?;
        self.background = Some(project.background);

        self.viewport.reset();
        self.layout_background();
        self.controller.reset();
        self.selected = self.store.first().map(|p| p.id.clone());
        self.editing = None;
        self.viewer = None;
        self.confirmation = None;
        self.save_handle = None;
        self.last_viewer_key = None;

        log::info!(
            "Opened project with {} points starting at {}",
            self.store.len(),
            self.store.starting_number()
        );
        self.render();
        Ok(())
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render(&mut self) {
        let scene = Scene {
            viewport: &self.viewport,
            background: self.background.as_ref(),
            points: self.store.points(),
            points_changed: self.store.is_dirty(),
            selected: self.selected.as_ref(),
            editing: self.editing.as_ref(),
            viewer: self.viewer.as_ref(),
            add_mode: self.controller.is_adding_point(),
            add_preview: self.controller.add_preview(),
            drag_preview: self.controller.drag_preview(),
            confirmation: self.confirmation.as_ref(),
        };
        self.renderer.render(&scene);
        self.store.clear_dirty();
    }
}

impl<F: FileService, R: Renderer> std::fmt::Debug for AnnotationApp<F, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationApp")
            .field("points", &self.store.len())
            .field("has_background", &self.background.is_some())
            .field("selected", &self.selected)
            .field("state", self.controller.state())
            .finish_non_exhaustive()
    }
}
