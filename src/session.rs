//! Session state for one grading run: the two inputs, the graded original,
//! the adjusted preview, and the sequencing rules between them.
//!
//! The session owns the busy guard and the debounce deadline, so the UI layer
//! only forwards events and uploads textures.

use std::path::Path;
use std::time::Duration;

use image::RgbaImage;
use log::{debug, error, warn};
use web_time::{Instant, SystemTime};

use crate::adjust::{self, AdjustParams};
use crate::error::{GradeError, Result};
use crate::image_io;
use crate::pipeline::{self, GradeOptions};

/// Longest preview side. Adjustments preview on a copy capped to this; the
/// export path always runs from the full-resolution original.
pub const MAX_PREVIEW_SIZE: u32 = 1000;

/// Thumbnail cap for the source/reference strips.
pub const THUMBNAIL_SIZE: u32 = 300;

/// Quiescence window for slider input. Consecutive changes inside the window
/// coalesce into one recompute; only the latest parameter snapshot survives.
pub const DEBOUNCE: Duration = Duration::from_millis(50);

/// Where the session currently is, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No inputs selected yet.
    Empty,
    /// Picking inputs: one or both are present, nothing processed yet.
    /// Processing only unlocks once both exist ([`Session::can_process`]).
    SourcesSelected,
    /// A graded original exists and adjustments are live.
    Processed,
    /// Last action failed; the message is user-visible.
    Error(String),
}

impl Default for Status {
    fn default() -> Self {
        Self::Empty
    }
}

#[derive(Default)]
pub struct Session {
    source: Option<RgbaImage>,
    reference: Option<RgbaImage>,

    pub options: GradeOptions,
    pub params: AdjustParams,

    /// Full-resolution graded output. Replaced only by the next process call.
    original: Option<RgbaImage>,
    /// Downscaled copy of `original` that adjustment previews run from.
    preview_base: Option<RgbaImage>,
    /// `preview_base` with the current parameters applied.
    current: Option<RgbaImage>,

    status: Status,
    busy: bool,
    /// Debounce deadline; `Some` while a recompute is pending.
    pending: Option<Instant>,
    last_process_ms: f64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // --- input selection ---

    /// Decode the source image from disk. On failure nothing changes except
    /// the status message.
    pub fn load_source(&mut self, path: &Path) -> Result<()> {
        let img = self.load(path)?;
        self.set_source(img);
        Ok(())
    }

    /// Decode the reference image from disk.
    pub fn load_reference(&mut self, path: &Path) -> Result<()> {
        let img = self.load(path)?;
        self.set_reference(img);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<RgbaImage> {
        match image_io::load_image(path) {
            Ok(img) => Ok(img.to_rgba8()),
            Err(e) => {
                warn!("decode failed: {e}");
                self.status = Status::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Set an already-decoded source image.
    pub fn set_source(&mut self, img: RgbaImage) {
        self.source = Some(img);
        if !matches!(self.status, Status::Processed) {
            self.status = Status::SourcesSelected;
        }
    }

    /// Set an already-decoded reference image.
    pub fn set_reference(&mut self, img: RgbaImage) {
        self.reference = Some(img);
        if !matches!(self.status, Status::Processed) {
            self.status = Status::SourcesSelected;
        }
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    pub fn reference(&self) -> Option<&RgbaImage> {
        self.reference.as_ref()
    }

    /// Process is only offered once both inputs exist.
    pub fn can_process(&self) -> bool {
        self.source.is_some() && self.reference.is_some()
    }

    // --- processing ---

    /// Run the color transfer: grade the source against the reference, store
    /// the full-resolution result, and reset the adjustment sliders.
    ///
    /// Reprocessing discards the previous original and current result. On
    /// failure the previous results are kept and the busy guard is released.
    pub fn process(&mut self) -> Result<()> {
        let (Some(source), Some(reference)) = (&self.source, &self.reference) else {
            return Err(GradeError::MissingInput);
        };

        self.busy = true;
        let start = Instant::now();
        let outcome = pipeline::process(source, reference, &self.options);
        self.busy = false;

        match outcome {
            Ok(graded) => {
                self.last_process_ms = start.elapsed().as_secs_f64() * 1000.0;
                debug!(
                    "processed {}x{} in {:.0}ms",
                    graded.width(),
                    graded.height(),
                    self.last_process_ms
                );
                let base = image_io::fit_within(&graded, MAX_PREVIEW_SIZE);
                self.current = Some(base.clone());
                self.preview_base = Some(base);
                self.original = Some(graded);
                self.params = AdjustParams::default();
                self.pending = None;
                self.status = Status::Processed;
                Ok(())
            }
            Err(e) => {
                error!("processing failed: {e}");
                self.status = Status::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// The graded, unadjusted full-resolution result.
    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    /// The preview with the current adjustments applied.
    pub fn current(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    pub fn is_processed(&self) -> bool {
        self.original.is_some()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn last_process_ms(&self) -> f64 {
        self.last_process_ms
    }

    // --- adjustments ---

    /// Note a slider change: arm (or push back) the debounce deadline. The
    /// recompute itself happens in [`Session::tick`] once the window closes.
    pub fn request_adjust(&mut self) {
        if self.original.is_some() {
            self.pending = Some(Instant::now() + DEBOUNCE);
        }
    }

    /// Deadline of the pending recompute, if any, so the frame loop can ask
    /// to be woken then.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Fire the pending recompute if its deadline has passed. Requests that
    /// arrive while a recompute is in flight are dropped, not queued.
    ///
    /// Returns true when the current preview was replaced.
    pub fn tick(&mut self) -> bool {
        let Some(deadline) = self.pending else {
            return false;
        };
        if Instant::now() < deadline {
            return false;
        }
        if self.busy {
            // Dropped; the slider will arm a fresh deadline on its next move.
            self.pending = None;
            return false;
        }
        self.pending = None;

        let Some(base) = &self.preview_base else {
            return false;
        };
        self.busy = true;
        self.current = Some(adjust::apply_adjustments(base, &self.params));
        self.busy = false;
        true
    }

    /// Zero all sliders and restore the current preview to the unadjusted
    /// original. Cancels any pending recompute.
    pub fn reset(&mut self) -> bool {
        self.params = AdjustParams::default();
        self.pending = None;
        if let Some(base) = &self.preview_base {
            self.current = Some(base.clone());
            true
        } else {
            false
        }
    }

    // --- export ---

    /// Render the export image: the full-resolution original with the current
    /// adjustments applied. Never touches the stored original.
    pub fn export_image(&self) -> Result<RgbaImage> {
        let original = self.original.as_ref().ok_or(GradeError::NothingProcessed)?;
        Ok(adjust::apply_adjustments(original, &self.params))
    }

    /// Write the export image as a JPEG.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        let img = self.export_image()?;
        if let Err(e) = image_io::save_jpeg(&img, path) {
            error!("export failed: {e}");
            self.status = Status::Error(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// `result_<unix ms>.jpg` for the untouched grade, `styled_<unix ms>.jpg`
    /// once any slider is non-zero.
    pub fn suggested_filename(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let prefix = if self.params.is_default() {
            "result"
        } else {
            "styled"
        };
        format!("{prefix}_{millis}.jpg")
    }
}
