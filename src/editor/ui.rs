use super::{to_bevy_image, EditorAction, StatusLine, TextureRegistered};
use crate::session::EditorSession;
use crate::tiles::TileId;
use bevy::prelude::*;

const BUTTON_SIZE: f32 = 40.0;
const BUTTON_COLOR: Color = Color::srgb(0.2, 0.2, 0.3);
const BORDER_IDLE: Color = Color::srgb(0.4, 0.4, 0.6);
const BORDER_SELECTED: Color = Color::srgb(1.0, 0.85, 0.2);

/// Container the texture buttons are appended to
#[derive(Component)]
pub struct PaletteBar;

/// Palette button for one registered texture
#[derive(Component)]
pub struct PaletteButton {
    pub id: TileId,
}

/// Marker component for the eraser button
#[derive(Component)]
pub struct EraserButton;

/// Marker component for the status line text
#[derive(Component)]
pub struct StatusText;

/// Sets up the tool panel: palette, eraser, save/load/export, status line
pub fn setup_editor_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(0.0),
            top: Val::Px(0.0),
            right: Val::Px(0.0),
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            column_gap: Val::Px(8.0),
            padding: UiRect::all(Val::Px(6.0)),
            ..default()
        })
        .with_children(|parent| {
            // Texture buttons are added as textures finish loading
            parent.spawn((
                PaletteBar,
                Node {
                    flex_direction: FlexDirection::Row,
                    column_gap: Val::Px(4.0),
                    ..default()
                },
            ));

            parent
                .spawn((EraserButton, tool_button()))
                .observe(|_trigger: On<Pointer<Click>>, mut actions: MessageWriter<EditorAction>| {
                    actions.write(EditorAction::SelectEraser);
                })
                .with_children(|button| {
                    button.spawn(button_label("Eraser"));
                });

            for (label, action) in [
                ("Save", EditorAction::Save),
                ("Load", EditorAction::Load),
                ("Export", EditorAction::Export),
            ] {
                parent
                    .spawn(tool_button())
                    .observe(
                        move |_trigger: On<Pointer<Click>>, mut actions: MessageWriter<EditorAction>| {
                            actions.write(action);
                        },
                    )
                    .with_children(|button| {
                        button.spawn(button_label(label));
                    });
            }

            parent.spawn((
                StatusText,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
            ));
        });
}

fn tool_button() -> impl Bundle {
    (
        Button,
        Node {
            height: Val::Px(BUTTON_SIZE),
            padding: UiRect::horizontal(Val::Px(10.0)),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BackgroundColor(BUTTON_COLOR),
        BorderColor::all(BORDER_IDLE),
        BorderRadius::all(Val::Px(4.0)),
    )
}

fn button_label(label: &str) -> impl Bundle {
    (
        Text::new(label),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::WHITE),
    )
}

/// Adds a palette button for each newly registered texture
pub fn spawn_palette_buttons(
    mut commands: Commands,
    mut registered: MessageReader<TextureRegistered>,
    session: Res<EditorSession>,
    mut images: ResMut<Assets<Image>>,
    palette: Single<Entity, With<PaletteBar>>,
) {
    for message in registered.read() {
        let Some(texture) = session.textures.get(message.id) else {
            continue;
        };
        let image = images.add(to_bevy_image(&texture.image));
        let id = message.id;

        commands.entity(*palette).with_children(|bar| {
            bar.spawn((
                PaletteButton { id },
                Button,
                Node {
                    width: Val::Px(BUTTON_SIZE),
                    height: Val::Px(BUTTON_SIZE),
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(BUTTON_COLOR),
                BorderColor::all(BORDER_IDLE),
                BorderRadius::all(Val::Px(4.0)),
            ))
            .observe(
                move |_trigger: On<Pointer<Click>>, mut actions: MessageWriter<EditorAction>| {
                    actions.write(EditorAction::SelectTexture(id));
                },
            )
            .with_children(|button| {
                button.spawn((
                    ImageNode {
                        image,
                        image_mode: NodeImageMode::Stretch,
                        ..default()
                    },
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                ));
            });
        });

        debug!("Added palette button for {} (tile {})", texture.name, id);
    }
}

/// Highlights the palette/eraser button matching the current selection
pub fn highlight_selection(
    session: Res<EditorSession>,
    mut palette: Query<(&PaletteButton, &mut BorderColor), Without<EraserButton>>,
    mut eraser: Query<&mut BorderColor, With<EraserButton>>,
) {
    let selection = session.selection();

    for (button, mut border) in palette.iter_mut() {
        let color = if button.id == selection { BORDER_SELECTED } else { BORDER_IDLE };
        *border = BorderColor::all(color);
    }

    for mut border in eraser.iter_mut() {
        let color = if session.controller.is_eraser() { BORDER_SELECTED } else { BORDER_IDLE };
        *border = BorderColor::all(color);
    }
}

/// Shows the latest status message
pub fn update_status_text(
    status: Res<StatusLine>,
    mut text: Single<&mut Text, With<StatusText>>,
) {
    if status.is_changed() {
        text.0 = status.0.clone();
    }
}
