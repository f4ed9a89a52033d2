//! Placement of the result popup next to the selection anchor.
//!
//! Four-quadrant heuristic: the popup goes below-right of the anchor by default
//! and flips left and/or up independently when it would leave the work area.
//! The result always lies inside the work area; the margin is kept when the
//! popup fits with it.

use crate::events::{AnchorPoint, Placement, PopupSize, ScreenGeometry};

pub fn place(
    anchor: AnchorPoint,
    popup_size: PopupSize,
    screen_geometry: ScreenGeometry,
    margin: u32,
) -> Placement {
    let margin = i64::from(margin);
    let (x_start, x_end) = screen_geometry.horizontal_bounds();
    let (y_start, y_end) = screen_geometry.vertical_bounds();

    let x = place_axis(
        i64::from(anchor.x),
        i64::from(popup_size.width),
        x_start,
        x_end,
        margin,
    );
    let y = place_axis(
        i64::from(anchor.y),
        i64::from(popup_size.height),
        y_start,
        y_end,
        margin,
    );

    Placement {
        x: to_coordinate(x),
        y: to_coordinate(y),
    }
}

/// Одна ось: сдвиг от якоря, переворот на другую сторону, затем зажим
fn place_axis(anchor: i64, size: i64, start: i64, end: i64, margin: i64) -> i64 {
    // После якоря (вправо/вниз)
    let mut pos = anchor + margin;

    if pos + size + margin > end {
        // Перед якорем (влево/вверх)
        pos = anchor - size - margin;
        if pos < start + margin {
            pos = end - size - margin;
        }
    }

    clamp_axis(pos, size, start, end, margin)
}

fn clamp_axis(pos: i64, size: i64, start: i64, end: i64, margin: i64) -> i64 {
    let low = start + margin;
    let high = end - size - margin;
    if high >= low {
        return pos.clamp(low, high);
    }

    // С отступами не помещается: прижимаемся к краям без отступа
    let high = end - size;
    if high >= start {
        return pos.clamp(start, high);
    }

    // Окно больше рабочей области
    start
}

fn to_coordinate(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}
