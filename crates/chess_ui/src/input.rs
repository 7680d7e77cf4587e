use bevy::{prelude::*, window::PrimaryWindow};
use chess_core::{DragEffect, Pixel};

use crate::layout;
use crate::render::{PieceSprite, DRAG_Z};
use crate::{BoardView, DragState, StatusLine};

/// Feeds mouse and Escape into the drag controller and applies whatever the
/// controller asks for to the piece sprites.
pub fn handle_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<Input<MouseButton>>,
    keys: Res<Input<KeyCode>>,
    mut drag: ResMut<DragState>,
    mut view: ResMut<BoardView>,
    mut status: ResMut<StatusLine>,
    mut pieces: Query<(Entity, &PieceSprite, &mut Transform)>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };

    if keys.just_pressed(KeyCode::Escape) {
        if let DragEffect::Abandoned { .. } = drag.0.cancel() {
            // Respawning snaps the piece back to its square.
            view.set_changed();
        }
        return;
    }

    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let pointer = Pixel::new(cursor.x, cursor.y);

    let effect = if mouse.just_pressed(MouseButton::Left) {
        let square = drag.0.rect().square_at(pointer);
        let target = pieces
            .iter()
            .find(|(_, sprite, _)| sprite.square == square)
            .map(|(entity, _, _)| entity);
        drag.0.grab(pointer, target)
    } else if mouse.just_released(MouseButton::Left) && drag.0.session().is_some() {
        drag.0.drop(pointer, &mut view.0)
    } else if mouse.pressed(MouseButton::Left) && drag.0.session().is_some() {
        drag.0.drag(pointer)
    } else {
        DragEffect::Ignored
    };

    match effect {
        DragEffect::Float { element, at } | DragEffect::Reposition { element, at } => {
            if let Ok((_, _, mut transform)) = pieces.get_mut(element) {
                let centre = at + Pixel::splat(drag.0.rect().cell_size / 2.0);
                transform.translation = layout::to_world(centre, window, DRAG_Z);
            }
        }
        DragEffect::Dropped { from, to, result, .. } => match result {
            Ok(()) => status.0 = format!("moved {from} to {to} on the board only"),
            Err(err) => {
                warn!("drop rejected: {err}");
                status.0 = format!("drop rejected: {err}");
                view.set_changed();
            }
        },
        DragEffect::Abandoned { .. } => view.set_changed(),
        DragEffect::Ignored => {}
    }
}
