//! Rendering: draws the notes canvas to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads engine state through [`EngineCore`]'s query methods and produces
//! pixels. It does not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::camera::Camera;
use crate::doc::{DocStore, Note};
use crate::engine::EngineCore;
use crate::graph::ConnectionGraph;
use crate::input::InteractionState;

/// Background grid spacing in world units.
const GRID_STEP: f64 = 20.0;

/// Padding between a note's border and its text, in world units.
const NOTE_PADDING: f64 = 12.0;
const TITLE_FONT_PX: f64 = 15.0;
const BODY_FONT_PX: f64 = 13.0;
const LINE_HEIGHT: f64 = 1.35;

const CONNECTION_STROKE: &str = "#64748B";
const CONNECT_SOURCE_STROKE: &str = "#0D9488";
const CONNECT_DASH_PX: f64 = 6.0;

/// Draw the full scene: grid, connections, notes, connect-mode highlight.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore) -> Result<(), JsValue> {
    let (viewport_w, viewport_h, dpr) = core.viewport();
    let camera = core.camera();

    // Layer 1: clear and set up transforms.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, viewport_w, viewport_h);
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    draw_grid(ctx, core, &camera);

    // Layer 2: connection lines beneath the notes.
    draw_connections(ctx, core.doc(), core.graph(), camera.zoom);

    // Layer 3: notes in z-order (bottom first).
    for note in core.doc().iter() {
        draw_note(ctx, note, camera.zoom)?;
    }

    // Layer 4: connect-mode source highlight.
    if let InteractionState::ConnectSelecting { from: Some(id) } = core.state() {
        if let Some(note) = core.note(id) {
            draw_connect_source(ctx, note, camera.zoom)?;
        }
    }

    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, core: &EngineCore, camera: &Camera) {
    let bounds = core.doc().bounds();
    ctx.save();
    ctx.set_fill_style_str("#F3F4F6");
    ctx.fill_rect(0.0, 0.0, bounds.max_x, bounds.max_y);

    ctx.set_stroke_style_str("rgba(0, 0, 0, 0.06)");
    ctx.set_line_width(1.0 / camera.zoom);
    ctx.begin_path();
    let mut x = 0.0;
    while x <= bounds.max_x {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, bounds.max_y);
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y <= bounds.max_y {
        ctx.move_to(0.0, y);
        ctx.line_to(bounds.max_x, y);
        y += GRID_STEP;
    }
    ctx.stroke();
    ctx.restore();
}

fn draw_connections(ctx: &CanvasRenderingContext2d, doc: &DocStore, graph: &ConnectionGraph, zoom: f64) {
    ctx.save();
    ctx.set_stroke_style_str(CONNECTION_STROKE);
    ctx.set_line_width(2.0 / zoom);
    for conn in graph.iter() {
        let (Some(a), Some(b)) = (doc.get(&conn.from_note_id), doc.get(&conn.to_note_id)) else {
            continue;
        };
        let (ca, cb) = (a.center(), b.center());
        ctx.begin_path();
        ctx.move_to(ca.x, ca.y);
        ctx.line_to(cb.x, cb.y);
        ctx.stroke();
    }
    ctx.restore();
}

fn draw_note(ctx: &CanvasRenderingContext2d, note: &Note, zoom: f64) -> Result<(), JsValue> {
    ctx.save();

    ctx.set_fill_style_str("rgba(0, 0, 0, 0.08)");
    ctx.fill_rect(note.x + 2.0, note.y + 3.0, note.width, note.height);

    ctx.set_fill_style_str(note.color.fill());
    ctx.fill_rect(note.x, note.y, note.width, note.height);
    ctx.set_stroke_style_str(note.color.border());
    ctx.set_line_width(2.0 / zoom);
    ctx.stroke_rect(note.x, note.y, note.width, note.height);

    let max_w = (note.width - NOTE_PADDING * 2.0).max(0.0);
    let left = note.x + NOTE_PADDING;
    let bottom = note.y + note.height - NOTE_PADDING;

    ctx.set_fill_style_str(note.color.text());
    ctx.set_text_baseline("top");
    ctx.set_font(&format!("600 {TITLE_FONT_PX:.0}px sans-serif"));
    let title = fit_text_with_ellipsis(ctx, &note.title, max_w);
    ctx.fill_text(&title, left, note.y + NOTE_PADDING)?;

    ctx.set_font(&format!("{BODY_FONT_PX:.0}px sans-serif"));
    let mut y = note.y + NOTE_PADDING + TITLE_FONT_PX * LINE_HEIGHT + 4.0;
    for line in wrap_text_lines(ctx, &note.content, max_w) {
        if y + BODY_FONT_PX > bottom {
            break;
        }
        ctx.fill_text(&line, left, y)?;
        y += BODY_FONT_PX * LINE_HEIGHT;
    }

    if !note.tags.is_empty() && y + BODY_FONT_PX <= bottom {
        let tags = note.tags.iter().map(|t| format!("#{t}")).collect::<Vec<_>>().join(" ");
        ctx.set_global_alpha(0.7);
        let tags = fit_text_with_ellipsis(ctx, &tags, max_w);
        ctx.fill_text(&tags, left, bottom - BODY_FONT_PX)?;
    }

    ctx.restore();
    Ok(())
}

fn draw_connect_source(ctx: &CanvasRenderingContext2d, note: &Note, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    let dash_world = CONNECT_DASH_PX / zoom;
    let pad = 4.0 / zoom;
    ctx.set_stroke_style_str(CONNECT_SOURCE_STROKE);
    ctx.set_line_width(2.0 / zoom);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.stroke_rect(note.x - pad, note.y - pad, note.width + pad * 2.0, note.height + pad * 2.0);
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Text layout
// =============================================================

fn wrap_text_lines(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measured_text_width(ctx, &candidate) <= max_w {
                current = candidate;
            } else {
                out.push(std::mem::replace(&mut current, word.to_owned()));
            }
        }
        out.push(fit_text_with_ellipsis(ctx, &current, max_w));
    }
    out
}

fn fit_text_with_ellipsis(ctx: &CanvasRenderingContext2d, text: &str, max_w: f64) -> String {
    let trimmed = text.trim();
    if measured_text_width(ctx, trimmed) <= max_w {
        return trimmed.to_owned();
    }

    let ellipsis = "...";
    let mut chars: Vec<char> = trimmed.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}{}", chars.iter().collect::<String>().trim_end(), ellipsis);
        if measured_text_width(ctx, &candidate) <= max_w {
            return candidate;
        }
    }
    ellipsis.to_owned()
}

fn measured_text_width(ctx: &CanvasRenderingContext2d, text: &str) -> f64 {
    match ctx.measure_text(text) {
        Ok(metrics) => metrics.width(),
        Err(_) => f64::INFINITY,
    }
}
