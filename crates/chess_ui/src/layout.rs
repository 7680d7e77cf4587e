use bevy::prelude::*;
use chess_core::{BoardRect, Pixel, CELL_SIZE};

/// Top-left corner of the board, in window pixels.
pub const BOARD_ORIGIN: Pixel = Pixel::new(40.0, 40.0);

pub const CONTROLS_HEIGHT: f32 = 160.0;

pub fn board_rect() -> BoardRect {
    BoardRect::new(BOARD_ORIGIN, CELL_SIZE)
}

pub fn window_size() -> (f32, f32) {
    let board = board_rect().size();
    (
        board + 2.0 * BOARD_ORIGIN.x,
        board + 2.0 * BOARD_ORIGIN.y + CONTROLS_HEIGHT,
    )
}

/// Window pixels (origin top-left, y down) to world space for the default
/// 2d camera (origin at the window centre, y up).
pub fn to_world(pixel: Pixel, window: &Window, z: f32) -> Vec3 {
    Vec3::new(
        pixel.x - window.width() / 2.0,
        window.height() / 2.0 - pixel.y,
        z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::window::WindowResolution;
    use chess_core::Square;

    #[test]
    fn board_fits_inside_window() {
        let (width, height) = window_size();
        let rect = board_rect();
        let far = rect.corner_of(Square::new(7, 7)) + Pixel::splat(CELL_SIZE);
        assert!(far.x <= width);
        assert!(far.y <= height - CONTROLS_HEIGHT);
    }

    #[test]
    fn window_centre_maps_to_world_origin() {
        let window = Window {
            resolution: WindowResolution::new(480.0, 640.0),
            ..default()
        };
        let world = to_world(Pixel::new(240.0, 320.0), &window, 2.0);
        assert_eq!(world, Vec3::new(0.0, 0.0, 2.0));

        let top_left = to_world(Pixel::new(0.0, 0.0), &window, 0.0);
        assert_eq!(top_left.truncate(), Vec2::new(-240.0, 320.0));
    }
}
