pub use kurbo::{Point, Rect, Size};

/// Widest the composited surface is allowed to be, in pixels.
pub const MAX_DISPLAY_WIDTH: u32 = 1200;

/// Downscale factor that fits `width` into `max_width`. Never upscales.
pub fn display_scale(width: u32, max_width: u32) -> f64 {
    if width == 0 {
        return 1.0;
    }
    (f64::from(max_width) / f64::from(width)).min(1.0)
}

/// Intrinsic size scaled by [`display_scale`], rounded to whole pixels (at least 1x1).
pub fn scaled_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let scale = display_scale(width, max_width);
    let w = (f64::from(width) * scale).round().max(1.0) as u32;
    let h = (f64::from(height) * scale).round().max(1.0) as u32;
    (w, h)
}

/// Placement of an image of `image_size` that covers `target` without letterboxing.
///
/// The returned rectangle shares `target`'s center along the cropped axis and is at least as
/// large as `target` on both axes. Images relatively wider than `target` match its height and
/// overflow horizontally; all others match its width and overflow vertically.
pub fn cover_fit(target: Rect, image_size: Size) -> Rect {
    let (tw, th) = (target.width(), target.height());
    if image_size.width <= 0.0 || image_size.height <= 0.0 || tw <= 0.0 || th <= 0.0 {
        return target;
    }

    let image_aspect = image_size.width / image_size.height;
    let target_aspect = tw / th;

    if image_aspect > target_aspect {
        let draw_h = th;
        let draw_w = draw_h * image_aspect;
        let x = target.x0 - (draw_w - tw) / 2.0;
        Rect::from_origin_size((x, target.y0), (draw_w, draw_h))
    } else {
        let draw_w = tw;
        let draw_h = draw_w / image_aspect;
        let y = target.y0 - (draw_h - th) / 2.0;
        Rect::from_origin_size((target.x0, y), (draw_w, draw_h))
    }
}

/// Integer pixel bounds of `rect`, clipped to a `width` x `height` surface.
///
/// Edges snap to the nearest pixel boundary; returns `None` when nothing remains.
pub fn pixel_bounds(rect: Rect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = rect.x0.round().clamp(0.0, f64::from(width)) as u32;
    let y0 = rect.y0.round().clamp(0.0, f64::from(height)) as u32;
    let x1 = rect.x1.round().clamp(0.0, f64::from(width)) as u32;
    let y1 = rect.y1.round().clamp(0.0, f64::from(height)) as u32;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geom.rs"]
mod tests;
