use crate::components::tools::Tool;
use crate::compositor::{self, BACKGROUND};
use crate::io::ExportFormat;
use crate::ops::canvas_ops::ZoomDirection;
use crate::session::{InputEvent, Session};
use crate::settings::AppSettings;
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions};

pub struct GridPaintApp {
    session: Session,
    frame_texture: Option<TextureHandle>,
}

impl GridPaintApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        Self {
            session: Session::new(settings),
            frame_texture: None,
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let (events, shift, screen) =
            ctx.input(|i| (i.events.clone(), i.modifiers.shift, i.screen_rect()));

        let (w, h) = (screen.width().round() as u32, screen.height().round() as u32);
        if w > 0 && h > 0 {
            self.session.handle(InputEvent::Resize { width: w, height: h });
        }
        self.session.set_modifiers(shift);

        let mut wheel = 0.0;
        for event in &events {
            if let egui::Event::Scroll(delta) = event {
                wheel += delta.y;
                continue;
            }
            if let Some(input) = map_event(event) {
                self.session.handle(input);
            }
        }
        // One zoom step per frame at most; trackpads report many small deltas
        if wheel > 0.0 {
            self.session.handle(InputEvent::Zoom(ZoomDirection::Out));
        } else if wheel < 0.0 {
            self.session.handle(InputEvent::Zoom(ZoomDirection::In));
        }
    }

    fn paint(&mut self, ctx: &egui::Context, ui: &egui::Ui) {
        let image = compositor::render_frame(&self.session.frame());
        let size = [image.width() as usize, image.height() as usize];
        let color_image = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        if let Some(tex) = self.frame_texture.as_mut() {
            tex.set(color_image, TextureOptions::NEAREST);
        } else {
            self.frame_texture =
                Some(ctx.load_texture("gridpaint_frame", color_image, TextureOptions::NEAREST));
        }

        let painter = ui.painter();
        let screen = Rect::from_min_size(Pos2::ZERO, egui::vec2(size[0] as f32, size[1] as f32));
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        if let Some(texture) = &self.frame_texture {
            painter.image(texture.id(), screen, uv, Color32::WHITE);
        }

        let font = egui::FontId::proportional(13.0);
        for (rect, tool) in self.session.toolbar().buttons() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                tool.label(),
                font.clone(),
                Color32::from_rgb(40, 44, 52),
            );
        }

        if let Some(status) = self.session.export_status() {
            let color = if status.ok {
                Color32::from_rgb(39, 140, 70)
            } else {
                Color32::from_rgb(200, 30, 40)
            };
            painter.text(
                Pos2::new(360.0, 72.0),
                egui::Align2::LEFT_TOP,
                &status.message,
                font,
                color,
            );
        }
    }
}

/// Translate one backend event into a session event.  Scroll is handled by
/// the caller so it can be rate-limited per frame.
pub fn map_event(event: &egui::Event) -> Option<InputEvent> {
    match event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            ..
        } => Some(if *pressed {
            InputEvent::PointerDown { pos: *pos }
        } else {
            InputEvent::PointerUp { pos: *pos }
        }),
        egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMove { pos: *pos }),
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => map_key(*key, *modifiers),
        _ => None,
    }
}

fn map_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<InputEvent> {
    match key {
        egui::Key::Z => return Some(InputEvent::Undo),
        egui::Key::Delete => return Some(InputEvent::Clear),
        egui::Key::S if modifiers.command => {
            let format = if modifiers.shift { ExportFormat::Jpeg } else { ExportFormat::Png };
            return Some(InputEvent::Export(format));
        }
        _ => {}
    }
    if modifiers.command {
        return None;
    }
    Tool::all()
        .iter()
        .find(|tool| key.name().eq_ignore_ascii_case(&tool.shortcut().to_string()))
        .map(|&tool| InputEvent::SelectTool(tool))
}

impl eframe::App for GridPaintApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let c = BACKGROUND;
        [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0, 1.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.session.tick();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.paint(ctx, ui));

        if self.session.export_status().is_some() {
            ctx.request_repaint();
        }
    }
}
