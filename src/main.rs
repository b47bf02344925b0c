//! levelplot-rs demo - live gain reduction meter
//!
//! Listens to the default input device, runs a peak detector and a
//! soft-knee gain computer on it, and shows the result as a scrolling gain
//! reduction plot with the compressor curve and threshold guide on top.

use eframe::egui;

mod audio;
mod settings;

use audio::AudioEngine;
use levelplot::{
    CompressorCurveParams, CompressorCurvePlotter, ConfigError, CurveStyle, DbRange,
    GainReductionPlotter, GainReductionStyle, LayerStack, PlotConfiguration, PlotLayer,
    PlotSurface, Plotter, Resolution, ThresholdOverlay, ThresholdStyle,
};
use settings::AppSettings;

/// Layer order in the stack, bottom first
const GAIN_REDUCTION_LAYER: usize = 0;

/// Logical plot size used until the first layout pass
const INITIAL_PLOT_SIZE: (f64, f64) = (600.0, 300.0);

fn main() -> eframe::Result<()> {
    env_logger::init();
    log::info!("Starting levelplot-rs");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 500.0])
            .with_title("levelplot-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "levelplot-rs",
        options,
        Box::new(|cc| Ok(Box::new(LevelPlotApp::new(cc)))),
    )
}

/// Main application state
pub struct LevelPlotApp {
    audio: AudioEngine,
    stack: LayerStack,
    surface: Option<PlotSurface>,
    texture: Option<egui::TextureHandle>,
    show_settings: bool,

    // Plot state mirrored into the layers
    plot_config: PlotConfiguration,
    compressor: CompressorCurveParams,
    gain_reduction_style: GainReductionStyle,
    curve_style: CurveStyle,
    threshold_style: ThresholdStyle,
    layers_need_update: bool,
}

impl LevelPlotApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let compressor = CompressorCurveParams::default();
        let plot_config = default_plot_config();

        let mut app = Self {
            audio: AudioEngine::new(compressor.clone()),
            stack: LayerStack::new(),
            surface: None,
            texture: None,
            show_settings: true,
            plot_config,
            compressor,
            gain_reduction_style: GainReductionStyle::default(),
            curve_style: CurveStyle::default(),
            threshold_style: ThresholdStyle::default(),
            layers_need_update: false,
        };

        AppSettings::load().apply(&mut app);
        app.stack = match app.build_stack() {
            Ok(stack) => stack,
            Err(e) => {
                log::warn!("Saved plot settings are invalid ({}), using defaults", e);
                app.plot_config = default_plot_config();
                app.compressor = CompressorCurveParams::default();
                app.build_stack().unwrap_or_default()
            }
        };
        app.audio.set_params(&app.compressor);
        app
    }

    /// Create the layers from the current settings
    ///
    /// The gain reduction plot starts without a feed; starting the audio
    /// engine swaps in one that is connected to the input.
    fn build_stack(&self) -> Result<LayerStack, ConfigError> {
        let (gain_reduction, _feed) =
            GainReductionPlotter::new(self.plot_config.clone(), self.gain_reduction_style.clone())?;
        let curve = CompressorCurvePlotter::new(
            self.plot_config.clone(),
            self.curve_style.clone(),
            self.compressor.clone(),
        )?;
        let threshold = ThresholdOverlay::new(
            self.plot_config.clone(),
            self.threshold_style.clone(),
            self.compressor.threshold_db,
        )?;

        let mut stack = LayerStack::new();
        stack.push(gain_reduction).push(curve).push(threshold);
        Ok(stack)
    }

    /// Push the current settings into every layer
    fn update_layers(&mut self) {
        self.layers_need_update = false;

        if let Err(e) = self.stack.set_config(&self.plot_config) {
            self.audio.status = format!("Plot error: {}", e);
            return;
        }
        for layer in self.stack.layers_mut() {
            match layer {
                PlotLayer::GainReduction(p) => p.set_style(self.gain_reduction_style.clone()),
                PlotLayer::CompressorCurve(p) => p.set_style(self.curve_style.clone()),
                PlotLayer::Threshold(p) => p.set_style(self.threshold_style.clone()),
                PlotLayer::Level(_) | PlotLayer::Values(_) => {}
            }
        }
        if let Err(e) = self.stack.recompute(&self.compressor) {
            self.audio.status = format!("Compressor error: {}", e);
            return;
        }
        self.audio.set_params(&self.compressor);
    }

    fn toggle_audio(&mut self) {
        if self.audio.is_running() {
            self.audio.stop();
            return;
        }

        match self.audio.start(&self.plot_config, self.gain_reduction_style.clone()) {
            Ok(plotter) => {
                self.plot_config.sample_rate = plotter.config().sample_rate;
                if let Some(layer) = self.stack.layers_mut().get_mut(GAIN_REDUCTION_LAYER) {
                    *layer = PlotLayer::GainReduction(plotter);
                }
                // Keep the static layers on the device rate too
                self.layers_need_update = true;
            }
            Err(e) => {
                log::error!("Failed to start audio: {}", e);
                self.audio.status = format!("Error: {}", e);
            }
        }
    }

    /// Follow the size of the area the plot is shown in
    fn track_plot_size(&mut self, available: egui::Vec2) {
        let width = available.x.floor() as f64;
        let height = available.y.floor() as f64;
        if width < 1.0 || height < 1.0 {
            return;
        }
        if width != self.plot_config.width || height != self.plot_config.height {
            self.plot_config.width = width;
            self.plot_config.height = height;
            self.layers_need_update = true;
        }
    }

    /// Render the stack and upload it as a texture
    fn render_plot(&mut self, ctx: &egui::Context) -> Option<egui::TextureId> {
        let scale = ctx.pixels_per_point() as f64;
        if self.surface.is_none() {
            match PlotSurface::new(self.plot_config.width, self.plot_config.height, scale) {
                Ok(surface) => self.surface = Some(surface),
                Err(e) => {
                    self.audio.status = format!("Plot error: {}", e);
                    return None;
                }
            }
        }
        let surface = self.surface.as_mut()?;

        if let Err(e) = self.stack.render(surface, scale) {
            self.audio.status = format!("Plot error: {}", e);
            return None;
        }

        let frame = surface.present();
        let image = egui::ColorImage::from_rgba_premultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.as_bytes(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture = Some(ctx.load_texture("levelplot", image, egui::TextureOptions::LINEAR));
            }
        }
        self.texture.as_ref().map(|t| t.id())
    }

    fn save_snapshot(&mut self) {
        let Some(surface) = &self.surface else {
            return;
        };
        self.audio.status = match settings::save_snapshot(surface.present()) {
            Ok(path) => format!("Snapshot saved to {}", path.display()),
            Err(e) => {
                log::warn!("Failed to save snapshot: {}", e);
                format!("Snapshot failed: {}", e)
            }
        };
    }
}

fn default_plot_config() -> PlotConfiguration {
    let (width, height) = INITIAL_PLOT_SIZE;
    PlotConfiguration {
        width,
        height,
        time_scale_secs: levelplot::config::DEFAULT_TIME_SCALE,
        sample_rate: 48_000.0,
        resolution: Resolution::default(),
        db_range: DbRange::default(),
        headroom_db: levelplot::config::DEFAULT_HEADROOM_DB,
        dpi_scale: 1.0,
    }
}

impl eframe::App for LevelPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        if ctx.input(|i| i.viewport().close_requested()) {
            AppSettings::from_app(self).save();
        }

        // Top panel
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("levelplot-rs");
                ui.separator();

                let button_text = if self.audio.is_running() {
                    "⏹ Stop"
                } else {
                    "▶ Listen"
                };
                if ui.button(button_text).clicked() {
                    self.toggle_audio();
                }

                ui.separator();
                ui.toggle_value(&mut self.show_settings, "⚙ Settings");
                ui.separator();
                ui.label(&self.audio.status);
            });
        });

        // Settings panel
        if self.show_settings {
            egui::SidePanel::left("settings_panel")
                .min_width(220.0)
                .show(ctx, |ui| {
                    ui.heading("Plot");
                    ui.separator();

                    egui::ComboBox::from_label("Resolution")
                        .selected_text(self.plot_config.resolution.name())
                        .show_ui(ui, |ui| {
                            for resolution in Resolution::all() {
                                if ui
                                    .selectable_value(
                                        &mut self.plot_config.resolution,
                                        *resolution,
                                        resolution.name(),
                                    )
                                    .clicked()
                                {
                                    self.layers_need_update = true;
                                }
                            }
                        });

                    egui::ComboBox::from_label("Range")
                        .selected_text(self.plot_config.db_range.name())
                        .show_ui(ui, |ui| {
                            for range in DbRange::all() {
                                if ui
                                    .selectable_value(&mut self.plot_config.db_range, *range, range.name())
                                    .clicked()
                                {
                                    self.layers_need_update = true;
                                }
                            }
                        });

                    if ui
                        .add(
                            egui::Slider::new(&mut self.plot_config.time_scale_secs, 1.0..=20.0)
                                .text("Time (s)"),
                        )
                        .changed()
                    {
                        self.layers_need_update = true;
                    }
                    if ui
                        .add(egui::Slider::new(&mut self.plot_config.headroom_db, 0.0..=6.0).text("Headroom (dB)"))
                        .changed()
                    {
                        self.layers_need_update = true;
                    }

                    ui.separator();

                    ui.collapsing("Compressor", |ui| {
                        let mut changed = false;
                        changed |= ui
                            .add(egui::Slider::new(&mut self.compressor.threshold_db, -48.0..=0.0).text("Threshold"))
                            .changed();
                        changed |= ui
                            .add(
                                egui::Slider::new(&mut self.compressor.ratio, 1.0..=20.0)
                                    .text("Ratio")
                                    .logarithmic(true),
                            )
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut self.compressor.knee_width_db, 0.0..=24.0).text("Knee"))
                            .changed();
                        if changed {
                            self.compressor = CompressorCurveParams::from_knee_width(
                                self.compressor.threshold_db,
                                self.compressor.ratio,
                                self.compressor.knee_width_db,
                            );
                            self.layers_need_update = true;
                        }
                    });

                    ui.separator();

                    ui.collapsing("Display", |ui| {
                        let style = &mut self.gain_reduction_style;
                        let mut changed = false;
                        changed |= ui
                            .add(egui::Slider::new(&mut style.line_weight, 0.5..=5.0).text("Line weight"))
                            .changed();
                        changed |= ui.checkbox(&mut style.gradient_fill, "Gradient fill").changed();
                        changed |= ui.checkbox(&mut style.anti_alias, "Antialiasing").changed();

                        let mut background = self.curve_style.background.is_some();
                        if ui.checkbox(&mut background, "Curve background").changed() {
                            self.curve_style.background =
                                background.then_some(levelplot::PlotColor::rgba(0.05, 0.05, 0.08, 1.0));
                            changed = true;
                        }
                        if changed {
                            self.layers_need_update = true;
                        }
                    });

                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button("Save settings").clicked() {
                            AppSettings::from_app(self).save();
                        }
                        if ui.button("Save snapshot").clicked() {
                            self.save_snapshot();
                        }
                    });
                });
        }

        // Main plot display
        egui::CentralPanel::default().show(ctx, |ui| {
            self.track_plot_size(ui.available_size());
            if self.layers_need_update {
                self.update_layers();
            }

            if let Some(texture) = self.render_plot(ctx) {
                let size = egui::vec2(self.plot_config.width as f32, self.plot_config.height as f32);
                ui.add(egui::Image::new(egui::load::SizedTexture::new(texture, size)));
            }
        });
    }
}
