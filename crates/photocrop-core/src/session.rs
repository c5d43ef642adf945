//! A crop session: one picked image in one crop target.
//!
//! The session owns everything a crop target needs: the loaded source and
//! its orientation descriptor, the viewport, the gesture interpreter and
//! the registered event listeners. Hosts forward touch contact lists and
//! redraw when told to.
//!
//! # Redraw signalling
//!
//! With `use_animation_frame` enabled (the default), viewport changes only
//! raise a pending flag; the host drains it once per animation tick with
//! [`CropSession::take_redraw`], so several gesture samples between two
//! frames cost one redraw. With it disabled, every change is announced
//! immediately as [`CropEvent::ViewportChanged`].

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, CropConfig};
use crate::decode::{self, DecodeError, DecodedImage, SourceImage};
use crate::encode::ExportFormat;
use crate::export::{self, ExportError};
use crate::gesture::{GestureInterpreter, GestureState, TouchPoint};
use crate::orientation::OrientationDescriptor;
use crate::viewport::{DisplayBox, OutputSize, Viewport, ViewportError, VisibleWindow};

/// Errors surfaced by a crop session.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Viewport(#[from] ViewportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// The operation needs a loaded image.
    #[error("No image loaded")]
    NoImage,
}

/// Lifecycle notifications delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropEvent {
    ImageLoading,
    ImageLoaded,
    /// The picked bytes are not an image.
    FileTypeError,
    /// The image is too small for the requested output.
    ImageSizeError,
    /// The viewport changed and should be redrawn.
    ViewportChanged,
}

impl CropEvent {
    /// Event name as used by the JavaScript host.
    pub fn name(self) -> &'static str {
        match self {
            CropEvent::ImageLoading => "image.loading",
            CropEvent::ImageLoaded => "image.loaded",
            CropEvent::FileTypeError => "error.filetype",
            CropEvent::ImageSizeError => "error.size",
            CropEvent::ViewportChanged => "viewport.changed",
        }
    }

    /// Parse an event name produced by [`CropEvent::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        [
            CropEvent::ImageLoading,
            CropEvent::ImageLoaded,
            CropEvent::FileTypeError,
            CropEvent::ImageSizeError,
            CropEvent::ViewportChanged,
        ]
        .into_iter()
        .find(|e| e.name() == name)
    }
}

/// Handle returned by [`CropSession::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

impl ListenerId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ListenerId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

struct Listener {
    id: ListenerId,
    filter: Option<CropEvent>,
    callback: Box<dyn FnMut(CropEvent)>,
}

/// State that only exists while an image is shown.
#[derive(Debug, Clone)]
struct Loaded {
    source: SourceImage,
    descriptor: OrientationDescriptor,
    display: DisplayBox,
    output: OutputSize,
    viewport: Viewport,
}

/// One crop target with its image, viewport and gesture state.
pub struct CropSession {
    config: CropConfig,
    gesture: GestureInterpreter,
    loaded: Option<Loaded>,
    listeners: Vec<Listener>,
    next_listener: u32,
    redraw_pending: bool,
}

impl CropSession {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns `CropError::Config` if the configuration is invalid.
    pub fn new(config: CropConfig) -> Result<Self, CropError> {
        config.validate()?;
        Ok(Self {
            gesture: GestureInterpreter::new(config.gesture),
            config,
            loaded: None,
            listeners: Vec::new(),
            next_listener: 0,
            redraw_pending: false,
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    /// Register a listener for one event, or for all events when `filter`
    /// is `None`.
    pub fn add_listener<F>(&mut self, filter: Option<CropEvent>, callback: F) -> ListenerId
    where
        F: FnMut(CropEvent) + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        self.listeners.push(Listener {
            id,
            filter,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Notify listeners, most recently added first.
    fn emit(&mut self, event: CropEvent) {
        for listener in self.listeners.iter_mut().rev() {
            if listener.filter.is_none() || listener.filter == Some(event) {
                (listener.callback)(event);
            }
        }
    }

    /// Decode picked bytes and show them in a box of the given size.
    ///
    /// Replaces any previously loaded image. On failure the session is left
    /// without an image.
    pub fn read(&mut self, bytes: &[u8], display: DisplayBox) -> Result<(), CropError> {
        let readable = image::guess_format(bytes).is_ok_and(|f| f.reading_enabled());
        if !readable {
            warn!(len = bytes.len(), "Rejected file: not an image");
            self.reset();
            self.emit(CropEvent::FileTypeError);
            return Err(DecodeError::InvalidFormat.into());
        }

        self.emit(CropEvent::ImageLoading);

        let source = match decode::load_image(bytes) {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "Failed to decode image");
                self.reset();
                if matches!(e, DecodeError::InvalidFormat) {
                    self.emit(CropEvent::FileTypeError);
                }
                return Err(e.into());
            }
        };

        self.show(source, display)
    }

    /// Show an already decoded image in a box of the given size.
    ///
    /// The viewport starts at minimum zoom with the window at the origin.
    ///
    /// # Errors
    ///
    /// Returns `CropError::Viewport` (and emits `ImageSizeError` for a too
    /// small image) when no valid viewport exists.
    pub fn show(&mut self, source: SourceImage, display: DisplayBox) -> Result<(), CropError> {
        let descriptor = source.descriptor();
        let output = self.config.output_size(display);

        let viewport = match Viewport::initialize(
            source.image.metrics(),
            display.oriented(&descriptor),
            output.oriented(&descriptor),
        ) {
            Ok(viewport) => viewport.with_anchor(self.config.zoom_anchor),
            Err(e) => {
                warn!(error = %e, "Cannot show image");
                self.reset();
                if matches!(e, ViewportError::ImageTooSmall { .. }) {
                    self.emit(CropEvent::ImageSizeError);
                }
                return Err(e.into());
            }
        };

        debug!(
            scale = viewport.scale(),
            min_scale = viewport.min_scale(),
            max_scale = viewport.max_scale(),
            orientation = source.orientation.code(),
            "Image shown"
        );

        self.gesture.reset();
        self.loaded = Some(Loaded {
            source,
            descriptor,
            display,
            output,
            viewport,
        });
        self.request_redraw();
        self.emit(CropEvent::ImageLoaded);
        Ok(())
    }

    /// Drop the loaded image and all gesture state.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.gesture.reset();
        self.redraw_pending = false;
    }

    fn request_redraw(&mut self) {
        if self.config.use_animation_frame {
            self.redraw_pending = true;
        } else {
            self.emit(CropEvent::ViewportChanged);
        }
    }

    /// Consume the pending redraw, if any.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// A contact was added. `active` lists all current contacts.
    pub fn touch_start(&mut self, active: &[TouchPoint]) -> GestureState {
        self.gesture.on_contacts_changed(active)
    }

    /// A contact was lifted or cancelled. `active` lists the remaining ones.
    pub fn touch_end(&mut self, active: &[TouchPoint]) -> GestureState {
        self.gesture.on_contacts_changed(active)
    }

    /// Contacts moved. Returns whether the viewport changed.
    pub fn touch_move(&mut self, active: &[TouchPoint]) -> bool {
        let Some(loaded) = self.loaded.as_mut() else {
            return false;
        };

        let changed = self
            .gesture
            .on_move(active, &mut loaded.viewport, &loaded.descriptor);
        if changed {
            self.request_redraw();
        }
        changed
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.loaded.as_ref().map(|l| &l.viewport)
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.loaded.as_mut().map(|l| &mut l.viewport)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.loaded.as_ref().map(|l| &l.source)
    }

    pub fn orientation(&self) -> Option<OrientationDescriptor> {
        self.loaded.as_ref().map(|l| l.descriptor)
    }

    pub fn display_box(&self) -> Option<DisplayBox> {
        self.loaded.as_ref().map(|l| l.display)
    }

    pub fn output_size(&self) -> Option<OutputSize> {
        self.loaded.as_ref().map(|l| l.output)
    }

    pub fn visible_window(&self) -> Option<VisibleWindow> {
        self.viewport().map(Viewport::visible_window)
    }

    fn loaded(&self) -> Result<&Loaded, CropError> {
        self.loaded.as_ref().ok_or(CropError::NoImage)
    }

    /// Rasterize the current view at display-box size.
    pub fn render(&self) -> Result<DecodedImage, CropError> {
        let loaded = self.loaded()?;
        let size = OutputSize::new(
            loaded.display.width.round() as u32,
            loaded.display.height.round() as u32,
        );
        Ok(export::export(
            &loaded.viewport,
            &loaded.source.image,
            size,
            loaded.descriptor.draw_transform,
            self.config.export_filter,
        )?)
    }

    /// Export the visible region at the configured output size.
    pub fn export(&self) -> Result<DecodedImage, CropError> {
        let loaded = self.loaded()?;
        Ok(export::export(
            &loaded.viewport,
            &loaded.source.image,
            loaded.output,
            loaded.descriptor.draw_transform,
            self.config.export_filter,
        )?)
    }

    /// Export the visible region and encode it.
    pub fn export_encoded(&self, format: ExportFormat) -> Result<Vec<u8>, CropError> {
        let loaded = self.loaded()?;
        Ok(export::export_encoded(
            &loaded.viewport,
            &loaded.source.image,
            loaded.output,
            loaded.descriptor.draw_transform,
            self.config.export_filter,
            format,
        )?)
    }
}
