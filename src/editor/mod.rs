mod systems;
mod ui;

pub use systems::*;
pub use ui::*;

use crate::paint::PointerEvent;
use crate::session::{EditorSession, LocalStore};
use crate::tiles::{Texture, TextureError, TileId};
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::tasks::Task;
use image::RgbaImage;
use std::path::PathBuf;

/// Plugin for the tile painting editor
pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditorConfig>()
            .init_resource::<EditorSession>()
            .init_resource::<StatusLine>()
            .init_resource::<PointerTracker>()
            .add_message::<EditorAction>()
            .add_message::<TextureRegistered>()
            .add_systems(Startup, (setup_canvas, setup_editor_ui, queue_bundled_textures).chain())
            .add_systems(
                Update,
                (
                    sync_viewport,
                    queue_dropped_textures,
                    poll_texture_tasks,
                    keyboard_shortcuts,
                    paint_with_pointer,
                    apply_editor_actions,
                    present_surface,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    spawn_palette_buttons,
                    highlight_selection,
                    update_status_text,
                ),
            );
    }
}

/// Editor configuration
#[derive(Resource, Debug, Clone)]
pub struct EditorConfig {
    /// Directory scanned for bundled textures at startup
    pub texture_dir: PathBuf,
    /// Directory backing the local store used by save/load
    pub store_dir: PathBuf,
    /// Directory exports are written to
    pub export_dir: PathBuf,
}

impl EditorConfig {
    pub fn store(&self) -> LocalStore {
        LocalStore::new(&self.store_dir)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            texture_dir: PathBuf::from("assets/textures"),
            store_dir: PathBuf::from("saves/tilepaint"),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Requests coming from palette buttons and keyboard shortcuts
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    SelectTexture(TileId),
    SelectEraser,
    Save,
    Load,
    Export,
}

/// Sent once a texture has been decoded and registered
#[derive(Message, Debug, Clone, Copy)]
pub struct TextureRegistered {
    pub id: TileId,
}

/// Latest informational message shown to the user
#[derive(Resource, Debug, Default)]
pub struct StatusLine(pub String);

impl StatusLine {
    pub fn set(&mut self, message: impl Into<String>) {
        self.0 = message.into();
        info!("{}", self.0);
    }
}

/// Left mouse button and cursor state for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerFrame {
    /// Cursor position; None when outside the window or over a button
    pub cursor: Option<Vec2>,
    pub pressed: bool,
    pub released: bool,
    /// Cursor left the window this frame
    pub left: bool,
}

/// Cursor bookkeeping for turning window input into pointer events
#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    pub last_position: Option<Vec2>,
    /// The button went down over the canvas and is still held
    pub press_on_canvas: bool,
}

impl PointerTracker {
    /// Translate one frame of input into paint controller events
    /// A click needs both the press and the release over the canvas
    pub fn translate(&mut self, frame: PointerFrame) -> Vec<PointerEvent> {
        let mut events = Vec::new();

        if frame.left {
            self.last_position = None;
            events.push(PointerEvent::Leave);
        }

        let Some(position) = frame.cursor else {
            // Moving onto a tool button leaves the canvas just like leaving the window
            if self.last_position.take().is_some() {
                events.push(PointerEvent::Leave);
            }
            if frame.pressed || frame.released {
                self.press_on_canvas = false;
            }
            if frame.released {
                events.push(PointerEvent::Release);
            }
            return events;
        };

        if frame.pressed {
            self.press_on_canvas = true;
            events.push(PointerEvent::Press(position));
        }

        if self.last_position != Some(position) {
            self.last_position = Some(position);
            events.push(PointerEvent::Move(position));
        }

        if frame.released {
            events.push(PointerEvent::Release);
            if std::mem::take(&mut self.press_on_canvas) {
                events.push(PointerEvent::Click(position));
            }
        }

        events
    }
}

/// Marker component for the sprite showing the drawing surface
#[derive(Component)]
pub struct CanvasSprite {
    /// Session revision currently uploaded to the GPU image
    pub presented_revision: u64,
}

/// In-flight texture decode
#[derive(Component)]
pub struct TextureTask {
    pub id: TileId,
    pub name: String,
    pub task: Task<Result<Texture, TextureError>>,
}

/// Convert a decoded RGBA image into a Bevy image asset
pub fn to_bevy_image(image: &RgbaImage) -> Image {
    Image::new(
        Extent3d {
            width: image.width().max(1),
            height: image.height().max(1),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        if image.width() == 0 || image.height() == 0 {
            vec![0; 4]
        } else {
            image.as_raw().clone()
        },
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Copy the surface into the presented image, reusing the asset while the size matches
/// Returns the handle to present; it is a new asset only after a size change
pub fn upload_surface(
    images: &mut Assets<Image>,
    current: &Handle<Image>,
    surface: &RgbaImage,
) -> Handle<Image> {
    if let Some(image) = images.get_mut(current) {
        if image.width() == surface.width() && image.height() == surface.height() {
            image.data = Some(surface.as_raw().clone());
            return current.clone();
        }
    }
    images.add(to_bevy_image(surface))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintState;
    use crate::tiles::{CellPos, TILE_EMPTY};
    use image::Rgba;

    fn at(x: f32, y: f32) -> PointerFrame {
        PointerFrame {
            cursor: Some(Vec2::new(x, y)),
            ..default()
        }
    }

    #[test]
    fn test_press_and_release_on_canvas_clicks() {
        let mut tracker = PointerTracker::default();
        let position = Vec2::new(20.0, 20.0);

        let events = tracker.translate(PointerFrame { pressed: true, ..at(20.0, 20.0) });
        assert_eq!(events, vec![PointerEvent::Press(position), PointerEvent::Move(position)]);
        assert!(tracker.press_on_canvas);

        let events = tracker.translate(PointerFrame { released: true, ..at(20.0, 20.0) });
        assert_eq!(events, vec![PointerEvent::Release, PointerEvent::Click(position)]);
        assert!(!tracker.press_on_canvas);
    }

    #[test]
    fn test_press_on_button_then_release_on_canvas_does_not_click() {
        let mut tracker = PointerTracker::default();

        // Pressed while over a palette button
        let events = tracker.translate(PointerFrame {
            pressed: true,
            ..default()
        });
        assert!(events.is_empty());

        // Dragged onto the canvas and released there
        tracker.translate(at(30.0, 10.0));
        let events = tracker.translate(PointerFrame { released: true, ..at(30.0, 10.0) });

        assert_eq!(events, vec![PointerEvent::Release]);
    }

    #[test]
    fn test_press_on_canvas_then_release_on_button_does_not_click() {
        let mut tracker = PointerTracker::default();
        tracker.translate(PointerFrame { pressed: true, ..at(5.0, 5.0) });

        let events = tracker.translate(PointerFrame {
            released: true,
            ..default()
        });
        assert_eq!(events, vec![PointerEvent::Leave, PointerEvent::Release]);
        assert!(!tracker.press_on_canvas);

        // A later release on the canvas without a new press does not click either
        let events = tracker.translate(PointerFrame { released: true, ..at(5.0, 5.0) });
        assert!(!events.contains(&PointerEvent::Click(Vec2::new(5.0, 5.0))));
    }

    #[test]
    fn test_cursor_over_button_ends_stroke() {
        let mut tracker = PointerTracker::default();
        let mut session = EditorSession::new(320, 320);
        let row = 200.0;

        for event in tracker.translate(PointerFrame { pressed: true, ..at(8.0, row) }) {
            session.handle_pointer(event);
        }
        assert!(matches!(session.controller.state(), PaintState::Drawing { .. }));

        // Button still held while the cursor crosses a tool button
        let events = tracker.translate(PointerFrame::default());
        assert_eq!(events, vec![PointerEvent::Leave]);
        assert_eq!(tracker.last_position, None);
        for event in events {
            session.handle_pointer(event);
        }
        assert_eq!(session.controller.state(), PaintState::Idle);

        // Coming back onto the canvas does not draw through the hidden cells
        for event in tracker.translate(at(300.0, row)) {
            session.handle_pointer(event);
        }
        assert_eq!(session.grid.iter_painted().count(), 1);
        assert_eq!(session.grid.get(CellPos::new(12, 10)), TILE_EMPTY);

        // Staying off the canvas sends nothing further
        tracker.translate(PointerFrame::default());
        assert!(tracker.translate(PointerFrame::default()).is_empty());
    }

    #[test]
    fn test_unchanged_position_sends_no_move() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.translate(at(1.0, 2.0)), vec![PointerEvent::Move(Vec2::new(1.0, 2.0))]);
        assert!(tracker.translate(at(1.0, 2.0)).is_empty());

        let events = tracker.translate(PointerFrame {
            left: true,
            ..default()
        });
        assert_eq!(events, vec![PointerEvent::Leave]);
        assert_eq!(tracker.last_position, None);
    }

    #[test]
    fn test_upload_surface_reuses_asset_until_resize() {
        let mut images = Assets::<Image>::default();
        let mut surface = RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 0]));
        let handle = images.add(to_bevy_image(&surface));

        surface.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let same = upload_surface(&mut images, &handle, &surface);

        assert_eq!(same, handle);
        assert_eq!(images.len(), 1);
        let data = images.get(&handle).unwrap().data.as_ref().unwrap();
        assert_eq!(&data[0..4], &[255, 0, 0, 255]);

        let resized = RgbaImage::new(48, 16);
        let fresh = upload_surface(&mut images, &handle, &resized);

        assert_ne!(fresh, handle);
        assert_eq!(images.get(&fresh).unwrap().width(), 48);
    }
}
