//! Shape generation for 2D primitives
//!
//! Everything is built in field coordinates (pixels, y down) as triangle
//! lists; the pipeline maps them to clip space.

use glam::Vec2;

use super::vertex::{Vertex, colors};
use crate::sim::{GamePhase, PipeView, Snapshot};

/// Pipe cap overhang on each side
const CAP_OVERHANG: f32 = 4.0;
/// Pipe cap height
const CAP_HEIGHT: f32 = 24.0;

/// Push an axis-aligned rectangle (two triangles)
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, color: [f32; 4]) {
    let corners = [
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
    ];
    push_quad(out, corners, color);
}

/// Push a rectangle rotated by `degrees` (clockwise on screen) around `pivot`
pub fn rotated_rect(
    out: &mut Vec<Vertex>,
    min: Vec2,
    max: Vec2,
    pivot: Vec2,
    degrees: f32,
    color: [f32; 4],
) {
    let rot = Vec2::from_angle(degrees.to_radians());
    let corners = [
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
    ]
    .map(|c| pivot + rot.rotate(c - pivot));
    push_quad(out, corners, color);
}

fn push_quad(out: &mut Vec<Vertex>, c: [Vec2; 4], color: [f32; 4]) {
    for i in [0, 1, 2, 0, 2, 3] {
        out.push(Vertex::new(c[i].x, c[i].y, color));
    }
}

/// Top and bottom segments, each with a cap at the gap edge
pub fn pipe_pair(out: &mut Vec<Vertex>, pipe: &PipeView, field_height: f32) {
    let left = pipe.x;
    let right = pipe.x + pipe.width;

    if pipe.top > 0.0 {
        rect(out, Vec2::new(left, 0.0), Vec2::new(right, pipe.top), colors::PIPE);
        let cap_top = (pipe.top - CAP_HEIGHT).max(0.0);
        rect(
            out,
            Vec2::new(left - CAP_OVERHANG, cap_top),
            Vec2::new(right + CAP_OVERHANG, pipe.top),
            colors::PIPE_CAP,
        );
    }

    if pipe.bottom > 0.0 {
        rect(
            out,
            Vec2::new(left, pipe.bottom_y),
            Vec2::new(right, field_height),
            colors::PIPE,
        );
        let cap_bottom = (pipe.bottom_y + CAP_HEIGHT).min(field_height);
        rect(
            out,
            Vec2::new(left - CAP_OVERHANG, pipe.bottom_y),
            Vec2::new(right + CAP_OVERHANG, cap_bottom),
            colors::PIPE_CAP,
        );
    }
}

/// Bird body, eye and beak, tilted by its rotation unless `upright`
pub fn bird(out: &mut Vec<Vertex>, snap: &Snapshot, upright: bool) {
    let size = snap.bird_size;
    let min = Vec2::new(snap.bird_x, snap.bird_y);
    let max = min + Vec2::splat(size);
    let center = min + Vec2::splat(size / 2.0);
    let angle = if upright { 0.0 } else { snap.bird_rotation };

    rotated_rect(out, min, max, center, angle, colors::BIRD);

    // Eye in the upper front quarter
    let eye_min = min + Vec2::new(size * 0.55, size * 0.15);
    let eye_max = eye_min + Vec2::splat(size * 0.3);
    rotated_rect(out, eye_min, eye_max, center, angle, colors::BIRD_EYE);
    let pupil_min = eye_min + Vec2::new(size * 0.15, size * 0.08);
    let pupil_max = pupil_min + Vec2::splat(size * 0.12);
    rotated_rect(out, pupil_min, pupil_max, center, angle, colors::BIRD_PUPIL);

    // Beak sticks out past the hitbox
    let beak_min = min + Vec2::new(size * 0.8, size * 0.5);
    let beak_max = beak_min + Vec2::new(size * 0.35, size * 0.2);
    rotated_rect(out, beak_min, beak_max, center, angle, colors::BIRD_BEAK);
}

/// Full frame: pipes, bird, and an overlay outside active play
pub fn scene(snap: &Snapshot, upright: bool) -> Vec<Vertex> {
    // 4 quads per bird, up to 4 per pipe, 1 overlay
    let mut out = Vec::with_capacity((snap.pipes.len() * 4 + 5) * 6);

    for pipe in &snap.pipes {
        pipe_pair(&mut out, pipe, snap.field_height);
    }
    bird(&mut out, snap, upright);

    if snap.phase != GamePhase::Playing {
        rect(
            &mut out,
            Vec2::ZERO,
            Vec2::new(snap.field_width, snap.field_height),
            colors::OVERLAY,
        );
    }

    out
}
