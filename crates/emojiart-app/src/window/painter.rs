//! Draws a [`Scene`] with egui and shows the palette strip.

use egui::{
    Align2, Color32, Context, CornerRadius, FontId, Frame, Id, LayerId, Margin, Pos2, Rect, Stroke, StrokeKind,
    TextureHandle, TextureOptions, Vec2,
};
use emojiart_core::{BackgroundImage, DELETE_HANDLE_RADIUS, DocumentEvent, Palette, Scene};
use std::cell::Cell;
use std::rc::Rc;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 122, 255);
const DELETE_COLOR: Color32 = Color32::from_rgb(230, 57, 70);
const PALETTE_GLYPH_SIZE: f32 = 40.0;
const PALETTE_MAX_WIDTH: f32 = 720.0;
/// Glyphs above this size are drawn clamped; egui rasterizes each size separately.
const MAX_GLYPH_SIZE: f32 = 512.0;

fn to_pos(point: kurbo::Point) -> Pos2 {
    Pos2::new(point.x as f32, point.y as f32)
}

fn to_rect(rect: kurbo::Rect) -> Rect {
    Rect::from_min_max(
        Pos2::new(rect.x0 as f32, rect.y0 as f32),
        Pos2::new(rect.x1 as f32, rect.y1 as f32),
    )
}

/// GPU copy of the background image, rebuilt after the document's background changes.
pub struct BackgroundTexture {
    stale: Rc<Cell<bool>>,
    texture: Option<TextureHandle>,
}

impl Default for BackgroundTexture {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundTexture {
    pub fn new() -> Self {
        Self {
            stale: Rc::new(Cell::new(true)),
            texture: None,
        }
    }

    /// Document observer that marks the texture stale.
    pub fn invalidator(&self) -> impl FnMut(&DocumentEvent) + 'static {
        let stale = Rc::clone(&self.stale);
        move |event| {
            if *event == DocumentEvent::BackgroundChanged {
                stale.set(true);
            }
        }
    }

    /// The texture for `image`, decoding it once per background change.
    pub fn get(&mut self, ctx: &Context, image: Option<&BackgroundImage>) -> Option<&TextureHandle> {
        if self.stale.replace(false) {
            self.texture = image.and_then(|image| match decode_rgba(image.data()) {
                Ok(pixels) => Some(ctx.load_texture("background", pixels, TextureOptions::LINEAR)),
                Err(e) => {
                    log::warn!("Background could not be rasterized: {}", e);
                    None
                }
            });
        }
        self.texture.as_ref()
    }
}

fn decode_rgba(data: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::load_from_memory(data)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Paint the scene behind every egui area.
pub fn paint_scene(ctx: &Context, scene: &Scene, background: Option<&TextureHandle>) {
    let painter = ctx.layer_painter(LayerId::background());
    let viewport = Rect::from_min_size(
        Pos2::ZERO,
        Vec2::new(scene.viewport.width as f32, scene.viewport.height as f32),
    );
    painter.rect_filled(viewport, 0.0, Color32::WHITE);

    if let (Some(placement), Some(texture)) = (scene.background, background) {
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        painter.image(texture.id(), to_rect(placement.bounds()), uv, Color32::WHITE);
    }

    for emoji in &scene.emojis {
        let size = emoji.font_size as f32;
        if size >= 1.0 {
            painter.text(
                to_pos(emoji.position),
                Align2::CENTER_CENTER,
                &emoji.text,
                FontId::proportional(size.min(MAX_GLYPH_SIZE)),
                Color32::BLACK,
            );
        }
        if emoji.selected {
            painter.rect_stroke(
                to_rect(emoji.bounds()),
                0.0,
                Stroke::new(2.0, SELECTION_COLOR),
                StrokeKind::Inside,
            );
        }
        if let Some(handle) = emoji.delete_handle {
            delete_button(&painter, to_pos(handle));
        }
    }

    if scene.loading {
        egui::Area::new(Id::new("background_loading"))
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .interactable(false)
            .show(ctx, |ui| {
                ui.add(egui::Spinner::new().size(32.0));
            });
    }
}

fn delete_button(painter: &egui::Painter, center: Pos2) {
    let radius = DELETE_HANDLE_RADIUS as f32 * 0.75;
    painter.circle_filled(center, radius, DELETE_COLOR);
    let arm = radius * 0.45;
    let stroke = Stroke::new(2.0, Color32::WHITE);
    painter.line_segment([center + Vec2::new(-arm, -arm), center + Vec2::new(arm, arm)], stroke);
    painter.line_segment([center + Vec2::new(-arm, arm), center + Vec2::new(arm, -arm)], stroke);
}

fn panel_frame() -> Frame {
    Frame::new()
        .fill(Color32::from_rgba_unmultiplied(250, 250, 252, 250))
        .corner_radius(CornerRadius::same(8))
        .stroke(Stroke::new(1.0, Color32::from_gray(220)))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 6,
            offset: [0, 2],
            color: Color32::from_black_alpha(10),
        })
        .inner_margin(Margin::symmetric(12, 6))
}

/// Show the palette along the bottom edge.
///
/// Returns the index of a glyph dragged out of the strip and released over
/// the canvas, with the release position.
pub fn palette_strip(ctx: &Context, palette: &Palette) -> Option<(usize, Pos2)> {
    let strip = egui::Area::new(Id::new("palette"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.set_max_width(PALETTE_MAX_WIDTH);
                egui::ScrollArea::horizontal().show(ui, |ui| {
                    ui.horizontal(|ui| {
                        for (index, glyph) in palette.glyphs().iter().enumerate() {
                            ui.dnd_drag_source(Id::new(("palette", index)), index, |ui| {
                                ui.label(egui::RichText::new(glyph).size(PALETTE_GLYPH_SIZE));
                            });
                        }
                    });
                });
            });
        })
        .response;

    let released = ctx.input(|i| i.pointer.any_released().then(|| i.pointer.interact_pos()).flatten())?;
    if strip.rect.contains(released) {
        return None;
    }
    let index = egui::DragAndDrop::take_payload::<usize>(ctx)?;
    Some((*index, released))
}
