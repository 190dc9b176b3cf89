//! Rasterization capability and the built-in card rasterizer.
//!
//! The built-in rasterizer lays cards out along a vertical rail using the
//! per-type palette. Text runs are drawn as skeleton bars sized by character
//! count; font shaping belongs to richer `Rasterizer` implementations.

use crate::export::canvas::Canvas;
use crate::export::view::{CardView, RenderedTimeline, EMPTY_TIMELINE_TEXT};
use crate::export::ExportError;
use crate::model::event::EventType;
use image::{Rgba, RgbaImage};

/// Upscale factor applied when no option overrides it.
pub const DEFAULT_SCALE: u32 = 2;
/// Largest accepted upscale factor.
pub const MAX_SCALE: u32 = 4;
/// Tallest raster, in physical pixels, the built-in rasterizer allocates.
pub const MAX_RASTER_HEIGHT: u32 = 32_768;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRAY_200: Rgba<u8> = Rgba([229, 231, 235, 255]);
const GRAY_400: Rgba<u8> = Rgba([156, 163, 175, 255]);
const GRAY_600: Rgba<u8> = Rgba([75, 85, 99, 255]);
const GRAY_800: Rgba<u8> = Rgba([31, 41, 55, 255]);
const GRAY_900: Rgba<u8> = Rgba([17, 24, 39, 255]);

const SURFACE_WIDTH: u32 = 720;
const OUTER_PADDING: u32 = 16;
const RAIL_OFFSET: u32 = 24;
const CARD_OFFSET: u32 = 48;
const ICON_RADIUS: u32 = 20;
const CARD_PADDING: u32 = 24;
const BADGE_HEIGHT: u32 = 28;
const TITLE_HEIGHT: u32 = 32;
const ROW_HEIGHT: u32 = 24;
const ROW_GAP: u32 = 12;
const BLOCK_GAP: u32 = 16;
const ITEM_GAP: u32 = 24;
const EMPTY_BOX_HEIGHT: u32 = 72;
const BODY_CHAR_WIDTH: u32 = 8;
const TITLE_CHAR_WIDTH: u32 = 14;

/// Raster output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterOptions {
    /// Physical pixels per logical pixel.
    pub scale: u32,
    /// Opaque page background.
    pub background: Rgba<u8>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            background: WHITE,
        }
    }
}

impl RasterOptions {
    /// Checks the scale is within `1..=MAX_SCALE`.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(ExportError::InvalidScale(self.scale));
        }
        Ok(())
    }
}

/// Produces a raster image from a rendered timeline.
pub trait Rasterizer {
    fn rasterize(
        &self,
        surface: &RenderedTimeline,
        options: &RasterOptions,
    ) -> Result<RgbaImage, ExportError>;
}

/// Card/rail layout rasterizer shipped with the core.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardRasterizer;

impl CardRasterizer {
    /// Logical surface size for `surface`.
    pub fn logical_size(surface: &RenderedTimeline) -> (u32, u32) {
        let content = if surface.is_empty() {
            EMPTY_BOX_HEIGHT
        } else {
            surface
                .cards
                .iter()
                .map(|card| card_height(card) + ITEM_GAP)
                .fold(0u32, u32::saturating_add)
                - ITEM_GAP
        };
        (SURFACE_WIDTH, content.saturating_add(OUTER_PADDING * 2))
    }
}

impl Rasterizer for CardRasterizer {
    fn rasterize(
        &self,
        surface: &RenderedTimeline,
        options: &RasterOptions,
    ) -> Result<RgbaImage, ExportError> {
        options.validate()?;
        let (width, height) = Self::logical_size(surface);
        match height.checked_mul(options.scale) {
            Some(physical) if physical <= MAX_RASTER_HEIGHT => {}
            _ => {
                return Err(ExportError::RasterTooLarge {
                    width: width.saturating_mul(options.scale),
                    height: height.saturating_mul(options.scale),
                })
            }
        }
        let mut canvas = Canvas::new(width, height, options.scale, options.background);

        let rail_x = OUTER_PADDING + RAIL_OFFSET;
        canvas.fill_rect(rail_x, OUTER_PADDING, 1, height - OUTER_PADDING * 2, GRAY_200);

        let card_x = OUTER_PADDING + CARD_OFFSET;
        let card_width = width - card_x - OUTER_PADDING;
        if surface.is_empty() {
            draw_empty_state(&mut canvas, card_x, OUTER_PADDING, card_width);
        }

        let mut y = OUTER_PADDING;
        for card in &surface.cards {
            let card_height = card_height(card);
            draw_icon(&mut canvas, rail_x, y + card_height / 2, card.kind);
            draw_card(&mut canvas, card, card_x, y, card_width, card_height);
            y += card_height + ITEM_GAP;
        }

        Ok(canvas.into_image())
    }
}

fn card_height(card: &CardView) -> u32 {
    let rows = card.detail_rows();
    let mut height = CARD_PADDING * 2
        + BADGE_HEIGHT
        + BLOCK_GAP
        + TITLE_HEIGHT
        + BLOCK_GAP
        + rows * ROW_HEIGHT
        + (rows - 1) * ROW_GAP;
    if card.description.is_some() {
        height += BLOCK_GAP + ROW_HEIGHT;
    }
    height
}

fn draw_empty_state(canvas: &mut Canvas, x: u32, y: u32, width: u32) {
    canvas.stroke_rect(x, y, width, EMPTY_BOX_HEIGHT, GRAY_200);
    let text_width = text_width(EMPTY_TIMELINE_TEXT, BODY_CHAR_WIDTH, width - CARD_PADDING * 2);
    let text_x = x + (width - text_width) / 2;
    canvas.fill_rect(text_x, y + (EMPTY_BOX_HEIGHT - 12) / 2, text_width, 12, GRAY_400);
}

fn draw_icon(canvas: &mut Canvas, cx: u32, cy: u32, kind: EventType) {
    let palette = palette(kind);
    canvas.fill_circle(cx, cy, ICON_RADIUS, GRAY_200);
    canvas.fill_circle(cx, cy, ICON_RADIUS - 1, palette.tint);
    canvas.fill_rect(cx - 5, cy - 5, 10, 10, palette.accent);
}

fn draw_card(canvas: &mut Canvas, card: &CardView, x: u32, y: u32, width: u32, height: u32) {
    let palette = palette(card.kind);
    let inner_x = x + CARD_PADDING;
    let inner_width = width - CARD_PADDING * 2;

    canvas.fill_rect(x, y, width, height, WHITE);
    canvas.stroke_rect(x, y, width, height, GRAY_200);

    let mut cursor = y + CARD_PADDING;
    let badge_text = text_width(card.type_label, BODY_CHAR_WIDTH, inner_width);
    canvas.fill_rect(inner_x, cursor, badge_text + 32, BADGE_HEIGHT, palette.badge);
    canvas.fill_rect(inner_x + 16, cursor + 8, badge_text, 12, palette.accent);
    cursor += BADGE_HEIGHT + BLOCK_GAP;

    let title_width = text_width(&card.title, TITLE_CHAR_WIDTH, inner_width);
    canvas.fill_rect(inner_x, cursor + 6, title_width, TITLE_HEIGHT - 12, GRAY_900);
    cursor += TITLE_HEIGHT + BLOCK_GAP;

    let mut rows = vec![card.date_label.as_str()];
    rows.extend(card.time_label.as_deref());
    rows.push(card.location.as_str());
    for (index, row) in rows.iter().enumerate() {
        if index > 0 {
            cursor += ROW_GAP;
        }
        canvas.fill_rect(inner_x, cursor + 4, 16, 16, GRAY_400);
        let row_width = text_width(row, BODY_CHAR_WIDTH, inner_width - 28);
        canvas.fill_rect(inner_x + 28, cursor + 6, row_width, 12, GRAY_600);
        cursor += ROW_HEIGHT;
    }

    if let Some(description) = &card.description {
        cursor += BLOCK_GAP;
        let width = text_width(description, BODY_CHAR_WIDTH, inner_width);
        canvas.fill_rect(inner_x, cursor + 6, width, 12, GRAY_800);
    }
}

fn text_width(text: &str, char_width: u32, max: u32) -> u32 {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    chars.saturating_mul(char_width).min(max)
}

struct Palette {
    /// Icon background (50 shade).
    tint: Rgba<u8>,
    /// Badge background (100 shade).
    badge: Rgba<u8>,
    /// Badge text and icon glyph (700 shade).
    accent: Rgba<u8>,
}

fn palette(kind: EventType) -> Palette {
    let (tint, badge, accent) = match kind {
        EventType::Flight => ([239, 246, 255], [219, 234, 254], [29, 78, 216]),
        EventType::Hotel => ([250, 245, 255], [243, 232, 255], [126, 34, 206]),
        EventType::Activity => ([240, 253, 244], [220, 252, 231], [21, 128, 61]),
        EventType::Transport => ([255, 251, 235], [254, 243, 199], [180, 83, 9]),
        EventType::Food => ([255, 241, 242], [255, 228, 230], [190, 18, 60]),
        EventType::Other => ([248, 250, 252], [241, 245, 249], [51, 65, 85]),
    };
    Palette {
        tint: opaque(tint),
        badge: opaque(badge),
        accent: opaque(accent),
    }
}

fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}
