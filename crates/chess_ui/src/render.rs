use std::collections::HashMap;

use bevy::{prelude::*, sprite::Anchor, window::{PrimaryWindow, WindowResized}};
use chess_core::{Color as PieceColor, Piece, PieceType, Square, CELL_SIZE};

use crate::actions::UiAction;
use crate::layout::{self, BOARD_ORIGIN};
use crate::{BoardView, DragState, EngineSlot, FenInput, StatusLine};

const SQUARE_Z: f32 = 1.0;
const PIECE_Z: f32 = 2.0;
pub const DRAG_Z: f32 = 10.0;

const LIGHT_SQUARE: Color = Color::rgb(0.93, 0.93, 0.82);
const DARK_SQUARE: Color = Color::rgb(0.46, 0.59, 0.34);
const BUTTON_IDLE: Color = Color::rgb(0.25, 0.25, 0.28);
const BUTTON_HOVER: Color = Color::rgb(0.35, 0.35, 0.4);
const BUTTON_PRESSED: Color = Color::rgb(0.3, 0.5, 0.3);

#[derive(Resource)]
pub struct PieceTextures(HashMap<Piece, Handle<Image>>);

#[derive(Component)]
pub struct BoardSquare {
    square: Square,
}

/// A piece sprite, tagged with the square it was rendered from.
#[derive(Component)]
pub struct PieceSprite {
    pub square: Square,
}

#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct FenText;

pub fn setup(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let mut textures = HashMap::new();
    for color in [PieceColor::White, PieceColor::Black] {
        for piece_type in PieceType::ALL {
            let piece = Piece::new(piece_type, color);
            textures.insert(piece, asset_server.load(piece.asset_path()));
        }
    }
    commands.insert_resource(PieceTextures(textures));

    commands.spawn(Camera2dBundle::default());

    let Ok(window) = windows.get_single() else {
        return;
    };
    let rect = layout::board_rect();
    for rank in 0..8 {
        for file in 0..8 {
            let square = Square::new(file, rank);
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: if (file + rank) % 2 == 0 {
                            LIGHT_SQUARE
                        } else {
                            DARK_SQUARE
                        },
                        custom_size: Some(Vec2::splat(CELL_SIZE)),
                        anchor: Anchor::Center,
                        ..default()
                    },
                    transform: Transform::from_translation(layout::to_world(
                        rect.center_of(square),
                        window,
                        SQUARE_Z,
                    )),
                    ..default()
                },
                BoardSquare { square },
            ));
        }
    }
}

pub fn spawn_controls(mut commands: Commands, fen: Res<FenInput>) {
    let text_style = TextStyle {
        font_size: 16.0,
        color: Color::WHITE,
        ..default()
    };

    commands
        .spawn(NodeBundle {
            style: Style {
                position_type: PositionType::Absolute,
                top: Val::Px(BOARD_ORIGIN.y + layout::board_rect().size() + 16.0),
                left: Val::Px(BOARD_ORIGIN.x),
                right: Val::Px(BOARD_ORIGIN.x),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                TextBundle::from_section(
                    fen.0.clone(),
                    TextStyle {
                        font_size: 13.0,
                        color: Color::rgb(0.8, 0.8, 0.6),
                        ..default()
                    },
                ),
                FenText,
            ));

            parent
                .spawn(NodeBundle {
                    style: Style {
                        flex_direction: FlexDirection::Row,
                        flex_wrap: FlexWrap::Wrap,
                        column_gap: Val::Px(6.0),
                        row_gap: Val::Px(6.0),
                        ..default()
                    },
                    ..default()
                })
                .with_children(|row| {
                    for action in UiAction::ALL {
                        row.spawn((
                            ButtonBundle {
                                style: Style {
                                    padding: UiRect::axes(Val::Px(10.0), Val::Px(4.0)),
                                    ..default()
                                },
                                background_color: BUTTON_IDLE.into(),
                                ..default()
                            },
                            action,
                        ))
                        .with_children(|button| {
                            button.spawn(TextBundle::from_section(
                                action.label(),
                                text_style.clone(),
                            ));
                        });
                    }
                });

            parent.spawn((TextBundle::from_section("", text_style.clone()), StatusText));
        });
}

/// Keeps world-space sprites aligned with the fixed pixel layout when the
/// window changes size.
pub fn handle_resize(
    mut resized: EventReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut squares: Query<(&BoardSquare, &mut Transform)>,
    mut view: ResMut<BoardView>,
) {
    if resized.read().last().is_none() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let rect = layout::board_rect();
    for (square, mut transform) in &mut squares {
        transform.translation = layout::to_world(rect.center_of(square.square), window, SQUARE_Z);
    }
    view.set_changed();
}

/// Rebuilds every piece sprite from the board whenever it changes.
pub fn sync_pieces(
    mut commands: Commands,
    view: Res<BoardView>,
    mut drag: ResMut<DragState>,
    textures: Option<Res<PieceTextures>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    pieces: Query<Entity, With<PieceSprite>>,
) {
    if !view.is_changed() {
        return;
    }
    let (Some(textures), Ok(window)) = (textures, windows.get_single()) else {
        return;
    };

    // The dragged sprite is about to be despawned.
    if drag.0.session().is_some() {
        drag.0.cancel();
    }
    for entity in &pieces {
        commands.entity(entity).despawn();
    }

    let rect = drag.0.rect();
    for rank in 0..8 {
        for file in 0..8 {
            let square = Square::new(file, rank);
            let Some(piece) = view.0.piece_at(square).and_then(|symbol| symbol.piece()) else {
                continue;
            };
            let Some(texture) = textures.0.get(&piece) else {
                continue;
            };
            commands.spawn((
                SpriteBundle {
                    texture: texture.clone(),
                    sprite: Sprite {
                        custom_size: Some(Vec2::splat(CELL_SIZE * 0.9)),
                        anchor: Anchor::Center,
                        ..default()
                    },
                    transform: Transform::from_translation(layout::to_world(
                        rect.center_of(square),
                        window,
                        PIECE_Z,
                    )),
                    ..default()
                },
                PieceSprite { square },
            ));
        }
    }
}

pub fn update_texts(
    status: Res<StatusLine>,
    fen: Res<FenInput>,
    slot: Res<EngineSlot>,
    mut status_text: Query<&mut Text, (With<StatusText>, Without<FenText>)>,
    mut fen_text: Query<&mut Text, (With<FenText>, Without<StatusText>)>,
) {
    if status.is_changed() || slot.is_changed() {
        for mut text in &mut status_text {
            let busy = if slot.is_busy() { " [busy]" } else { "" };
            text.sections[0].value = format!("{}{busy}", status.0);
        }
    }
    if fen.is_changed() {
        for mut text in &mut fen_text {
            text.sections[0].value = fen.0.clone();
        }
    }
}

pub fn style_buttons(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, mut background) in &mut buttons {
        *background = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVER,
            Interaction::None => BUTTON_IDLE,
        }
        .into();
    }
}
