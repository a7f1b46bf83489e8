use bevy::prelude::*;

mod editor;
mod paint;
mod render;
mod session;
mod tiles;

use editor::EditorPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(ImagePlugin::default_nearest())
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "tilepaint".into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(EditorPlugin)
        .run();
}
