use super::{
    to_bevy_image, upload_surface, CanvasSprite, EditorAction, EditorConfig, PointerFrame,
    PointerTracker, StatusLine, TextureRegistered, TextureTask,
};
use crate::session::{EditorSession, LoadOutcome};
use crate::tiles::{registry::is_image_file, TextureError, TextureSource, TileId};
use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool};
use bevy::window::{CursorLeft, FileDragAndDrop, PrimaryWindow, WindowResized};
use std::path::Path;

/// Spawns the camera and the sprite presenting the drawing surface
pub fn setup_canvas(
    mut commands: Commands,
    mut session: ResMut<EditorSession>,
    mut images: ResMut<Assets<Image>>,
    window: Single<&Window, With<PrimaryWindow>>,
) {
    commands.spawn(Camera2d);

    session.resize_viewport(window.width() as u32, window.height() as u32);

    let image = images.add(to_bevy_image(session.surface.image()));
    commands.spawn((
        Sprite::from_image(image),
        Transform::from_xyz(0.0, 0.0, 0.0),
        CanvasSprite {
            presented_revision: session.revision(),
        },
    ));

    info!(
        "Canvas ready: {}x{} px, {}x{} cells",
        session.surface.width(),
        session.surface.height(),
        session.grid.rows(),
        session.grid.cols()
    );
}

/// Starts decoding every image in the bundled texture directory
/// Files are registered in name order so ids are stable between runs
pub fn queue_bundled_textures(
    mut commands: Commands,
    config: Res<EditorConfig>,
    mut session: ResMut<EditorSession>,
) {
    let entries = match std::fs::read_dir(&config.texture_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "No bundled textures loaded from {}: {}",
                config.texture_dir.display(),
                e
            );
            return;
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    paths.sort();

    for path in paths {
        let source = TextureSource::Bundled(path);
        if let Err(e) = spawn_texture_task(&mut commands, &mut session, source) {
            error!("Stopped loading bundled textures: {}", e);
            return;
        }
    }
}

/// Starts decoding image files dropped onto the window
pub fn queue_dropped_textures(
    mut commands: Commands,
    mut drops: MessageReader<FileDragAndDrop>,
    mut session: ResMut<EditorSession>,
    mut status: ResMut<StatusLine>,
) {
    for drop in drops.read() {
        let FileDragAndDrop::DroppedFile { path_buf, .. } = drop else {
            continue;
        };

        if !is_image_file(path_buf) {
            status.set(format!("Ignored {}: not an image", display_name(path_buf)));
            continue;
        }

        match std::fs::read(path_buf) {
            Ok(bytes) => {
                let source = TextureSource::Bytes {
                    name: display_name(path_buf),
                    bytes,
                };
                if let Err(e) = spawn_texture_task(&mut commands, &mut session, source) {
                    warn!("Rejected dropped file {}: {}", path_buf.display(), e);
                    status.set(format!("Could not add {}: {}", display_name(path_buf), e));
                }
            }
            Err(e) => {
                warn!("Failed to read dropped file {}: {}", path_buf.display(), e);
                status.set(format!("Could not read {}", display_name(path_buf)));
            }
        }
    }
}

fn spawn_texture_task(
    commands: &mut Commands,
    session: &mut EditorSession,
    source: TextureSource,
) -> Result<(), TextureError> {
    // Id is reserved here, before the decode runs, so parallel loads never collide
    let pending = session.begin_texture(source)?;
    let (id, name) = (pending.id, pending.source.name());
    debug!("Decoding texture {} as tile {}", name, id);

    let task = AsyncComputeTaskPool::get().spawn(async move { pending.decode() });
    commands.spawn(TextureTask { id, name, task });
    Ok(())
}

/// Collects finished texture decodes into the session
pub fn poll_texture_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut TextureTask)>,
    mut session: ResMut<EditorSession>,
    mut status: ResMut<StatusLine>,
    mut registered: MessageWriter<TextureRegistered>,
) {
    for (entity, mut texture_task) in tasks.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut texture_task.task)) else {
            continue;
        };
        commands.entity(entity).despawn();

        match result {
            Ok(texture) => {
                let id = session.complete_texture(texture);
                info!("Registered texture {} as tile {}", texture_task.name, id);
                registered.write(TextureRegistered { id });
            }
            Err(e) => {
                warn!(
                    "Failed to load texture {} (tile {}): {}",
                    texture_task.name, texture_task.id, e
                );
                status.set(format!("Could not load {}", texture_task.name));
            }
        }
    }
}

/// Recreates the grid when the window size changes
pub fn sync_viewport(
    mut resized: MessageReader<WindowResized>,
    mut session: ResMut<EditorSession>,
) {
    let Some(last) = resized.read().last() else {
        return;
    };
    let (width, height) = (last.width as u32, last.height as u32);
    if width == session.surface.width() && height == session.surface.height() {
        return;
    }

    let painted = session.grid.iter_painted().count();
    if painted > 0 {
        warn!("Viewport resized to {}x{}, discarding {} painted cells", width, height, painted);
    }
    session.resize_viewport(width, height);
}

/// Translates mouse and cursor input into pointer events for the paint controller
pub fn paint_with_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut cursor_left: MessageReader<CursorLeft>,
    mut tracker: ResMut<PointerTracker>,
    mut session: ResMut<EditorSession>,
    buttons: Query<&Interaction, With<Button>>,
) {
    // Presses on palette/tool buttons never paint
    let over_ui = buttons.iter().any(|interaction| *interaction != Interaction::None);
    let frame = PointerFrame {
        cursor: window.cursor_position().filter(|_| !over_ui),
        pressed: mouse.just_pressed(MouseButton::Left),
        released: mouse.just_released(MouseButton::Left),
        left: cursor_left.read().count() > 0,
    };

    for event in tracker.translate(frame) {
        session.handle_pointer(event);
    }
}

/// Keyboard shortcuts: E eraser, 1-9 texture, Ctrl+S save, Ctrl+L load, Ctrl+E export
pub fn keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut actions: MessageWriter<EditorAction>,
) {
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);

    if ctrl {
        if keyboard.just_pressed(KeyCode::KeyS) {
            actions.write(EditorAction::Save);
        }
        if keyboard.just_pressed(KeyCode::KeyL) {
            actions.write(EditorAction::Load);
        }
        if keyboard.just_pressed(KeyCode::KeyE) {
            actions.write(EditorAction::Export);
        }
        return;
    }

    if keyboard.just_pressed(KeyCode::KeyE) {
        actions.write(EditorAction::SelectEraser);
    }

    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    for (index, key) in DIGITS.iter().enumerate() {
        if keyboard.just_pressed(*key) {
            actions.write(EditorAction::SelectTexture(index as TileId + 1));
        }
    }
}

/// Performs selection, save, load and export requests
pub fn apply_editor_actions(
    mut actions: MessageReader<EditorAction>,
    config: Res<EditorConfig>,
    mut session: ResMut<EditorSession>,
    mut status: ResMut<StatusLine>,
) {
    for action in actions.read() {
        match *action {
            EditorAction::SelectTexture(id) => {
                if session.select_texture(id) {
                    debug!("Selected tile {}", id);
                } else {
                    status.set(format!("No texture loaded for tile {}", id));
                }
            }
            EditorAction::SelectEraser => {
                session.select_eraser();
                debug!("Selected eraser");
            }
            EditorAction::Save => match session.save(&config.store()) {
                Ok(()) => status.set("Grid saved"),
                Err(e) => {
                    error!("Failed to save grid: {}", e);
                    status.set("Save failed");
                }
            },
            EditorAction::Load => match session.load(&config.store()) {
                Ok(LoadOutcome::Loaded) => status.set("Grid loaded"),
                Ok(LoadOutcome::Fitted { saved_rows, saved_cols }) => status.set(format!(
                    "Grid loaded ({}x{} save fitted to {}x{})",
                    saved_rows,
                    saved_cols,
                    session.grid.rows(),
                    session.grid.cols()
                )),
                Ok(LoadOutcome::NothingToLoad) => status.set("Nothing to load"),
                Err(e) => {
                    error!("Failed to load grid: {}", e);
                    status.set("Load failed");
                }
            },
            EditorAction::Export => match session.export(&config.export_dir) {
                Ok(path) => status.set(format!("Exported {}", path.display())),
                Err(e) => {
                    error!("Failed to export image: {}", e);
                    status.set("Export failed");
                }
            },
        }
        debug!("Session: {}", session.stats());
    }
}

/// Uploads the surface to the GPU when the session has redrawn it
pub fn present_surface(
    session: Res<EditorSession>,
    mut images: ResMut<Assets<Image>>,
    canvas: Single<(&mut Sprite, &mut CanvasSprite)>,
) {
    let (mut sprite, mut presented) = canvas.into_inner();
    if presented.presented_revision == session.revision() {
        return;
    }

    let handle = upload_surface(&mut images, &sprite.image, session.surface.image());
    if handle != sprite.image {
        // Size changed; the old asset is freed with its handle
        sprite.image = handle;
    }
    presented.presented_revision = session.revision();
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
