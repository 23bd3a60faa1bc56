use eframe::egui;
use image::RgbaImage;

use crate::adjust::AdjustParams;
use crate::color::transfer::TransferMode;
use crate::image_io;
use crate::session::{Session, Status, THUMBNAIL_SIZE};

pub struct TonematchApp {
    session: Session,
    source_thumb: Option<egui::TextureHandle>,
    reference_thumb: Option<egui::TextureHandle>,
    preview_texture: Option<egui::TextureHandle>,
    preview_width: usize,
    preview_height: usize,
}

impl TonematchApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: Session::new(),
            source_thumb: None,
            reference_thumb: None,
            preview_texture: None,
            preview_width: 0,
            preview_height: 0,
        }
    }

    fn pick_source(&mut self, ctx: &egui::Context) {
        if let Some(path) = image_dialog().pick_file() {
            if self.session.load_source(&path).is_ok() {
                let thumb = self.session.source().map(|img| thumbnail(img));
                self.source_thumb = thumb.map(|t| upload(ctx, "source_thumb", &t));
            }
        }
    }

    fn pick_reference(&mut self, ctx: &egui::Context) {
        if let Some(path) = image_dialog().pick_file() {
            if self.session.load_reference(&path).is_ok() {
                let thumb = self.session.reference().map(|img| thumbnail(img));
                self.reference_thumb = thumb.map(|t| upload(ctx, "reference_thumb", &t));
            }
        }
    }

    fn save_result(&mut self) {
        if !self.session.is_processed() {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JPEG", &["jpg", "jpeg"])
            .set_file_name(self.session.suggested_filename())
            .save_file()
        {
            // Failures land in the session status line.
            let _ = self.session.save_to(&path);
        }
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        if let Some(current) = self.session.current() {
            self.preview_width = current.width() as usize;
            self.preview_height = current.height() as usize;
            self.preview_texture = Some(upload(ctx, "preview", current));
        }
    }

    fn status_text(&self) -> String {
        match self.session.status() {
            Status::Empty => "Pick a source and a reference image".to_owned(),
            Status::SourcesSelected => {
                if self.session.can_process() {
                    "Ready to process".to_owned()
                } else {
                    "Pick the second image".to_owned()
                }
            }
            Status::Processed => {
                // Full-resolution output size, not the capped preview.
                let (w, h) = self
                    .session
                    .original()
                    .map(|img| img.dimensions())
                    .unwrap_or_default();
                format!("{}x{} | {:.0}ms", w, h, self.session.last_process_ms())
            }
            Status::Error(msg) => format!("Error: {msg}"),
        }
    }
}

fn image_dialog() -> rfd::FileDialog {
    rfd::FileDialog::new().add_filter(
        "Images",
        &["png", "jpg", "jpeg", "tiff", "tif", "bmp", "webp"],
    )
}

fn thumbnail(img: &RgbaImage) -> RgbaImage {
    image_io::fit_within(img, THUMBNAIL_SIZE)
}

fn upload(ctx: &egui::Context, name: &str, img: &RgbaImage) -> egui::TextureHandle {
    let size = [img.width() as usize, img.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

impl eframe::App for TonematchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top panel: file selection, process/reset/save, status
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Source Image").clicked() {
                    self.pick_source(ctx);
                }
                if ui.button("Reference Image").clicked() {
                    self.pick_reference(ctx);
                }
                ui.separator();

                let process = ui.add_enabled(
                    self.session.can_process(),
                    egui::Button::new("Process"),
                );
                if process.clicked() && self.session.process().is_ok() {
                    self.refresh_preview(ctx);
                }

                let reset = ui.add_enabled(
                    self.session.is_processed(),
                    egui::Button::new("Reset"),
                );
                if reset.clicked() && self.session.reset() {
                    self.refresh_preview(ctx);
                }

                if ui
                    .add_enabled(
                        self.session.is_processed(),
                        egui::Button::new("Save Result"),
                    )
                    .clicked()
                {
                    self.save_result();
                }

                ui.separator();
                ui.label(self.status_text());
            });
        });

        // Left panel: transfer options, adjustment sliders, input thumbnails
        egui::SidePanel::left("controls")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui_transfer(ui, &mut self.session);

                    let is_processed = self.session.is_processed();
                    let changed = ui_adjustments(
                        ui,
                        &mut self.session.params,
                        is_processed,
                    );
                    if changed {
                        self.session.request_adjust();
                    }

                    ui_thumbnails(ui, &self.source_thumb, &self.reference_thumb);
                });
            });

        // Fire a due debounced recompute; keep repainting until the deadline.
        if self.session.tick() {
            self.refresh_preview(ctx);
        }
        if let Some(deadline) = self.session.next_deadline() {
            let wait = deadline.saturating_duration_since(web_time::Instant::now());
            ctx.request_repaint_after(wait);
        }

        // Central panel: result preview
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.preview_texture {
                egui::ScrollArea::both().show(ui, |ui| {
                    let available = ui.available_size();
                    let img_w = self.preview_width as f32;
                    let img_h = self.preview_height as f32;
                    let scale = f32::min(available.x / img_w, available.y / img_h).min(1.0);
                    let display_size = egui::vec2(img_w * scale, img_h * scale);
                    ui.image(egui::load::SizedTexture::new(tex.id(), display_size));
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("Pick a source and a reference image, then press Process");
                });
            }
        });
    }
}

// --- UI Section Builders ---

fn ui_transfer(ui: &mut egui::Ui, session: &mut Session) {
    egui::CollapsingHeader::new("Color Transfer")
        .default_open(true)
        .show(ui, |ui| {
            let current_name = session.options.mode.name();
            egui::ComboBox::from_label("Mode")
                .selected_text(current_name)
                .show_ui(ui, |ui| {
                    for &mode in TransferMode::ALL {
                        ui.selectable_value(&mut session.options.mode, mode, mode.name());
                    }
                });

            if session.options.mode == TransferMode::LabChroma {
                ui.add(
                    egui::Slider::new(&mut session.options.lab_strength, 0..=100)
                        .text("Strength"),
                );
            }
            // Transfer settings take effect on the next Process.
        });
}

fn ui_adjustments(ui: &mut egui::Ui, params: &mut AdjustParams, enabled: bool) -> bool {
    let mut changed = false;
    egui::CollapsingHeader::new("Adjustments")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                changed |= ui
                    .add(egui::Slider::new(&mut params.brightness, -100..=100).text("Brightness"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.contrast, -100..=100).text("Contrast"))
                    .changed();
                changed |= ui
                    .add(egui::Slider::new(&mut params.saturation, -100..=100).text("Saturation"))
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut params.temperature, -100..=100).text("Temperature"),
                    )
                    .changed();
            });
        });
    changed
}

fn ui_thumbnails(
    ui: &mut egui::Ui,
    source: &Option<egui::TextureHandle>,
    reference: &Option<egui::TextureHandle>,
) {
    egui::CollapsingHeader::new("Inputs")
        .default_open(true)
        .show(ui, |ui| {
            ui.label("Source");
            match source {
                Some(tex) => {
                    ui.image(egui::load::SizedTexture::new(tex.id(), tex.size_vec2()));
                }
                None => {
                    ui.weak("not selected");
                }
            }
            ui.separator();
            ui.label("Reference");
            match reference {
                Some(tex) => {
                    ui.image(egui::load::SizedTexture::new(tex.id(), tex.size_vec2()));
                }
                None => {
                    ui.weak("not selected");
                }
            }
        });
}
