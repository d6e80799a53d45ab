//! 3D visualization of volume contents using kiss3d.

use kiss3d::prelude::*;

use gridscape::{Grid3, Point3};

/// Returns the display color for a given key.
///
/// Keys cycle through a fixed palette so colors stay stable across frames.
fn key_color(key: usize) -> Color {
    match key % 7 {
        0 => Color::new(1.0, 0.2, 0.2, 1.0), // red
        1 => Color::new(0.2, 1.0, 0.2, 1.0), // green
        2 => Color::new(0.2, 0.2, 1.0, 1.0), // blue
        3 => Color::new(1.0, 1.0, 0.2, 1.0), // yellow
        4 => Color::new(1.0, 0.2, 1.0, 1.0), // magenta
        5 => Color::new(0.2, 1.0, 1.0, 1.0), // cyan
        _ => Color::new(1.0, 0.6, 0.2, 1.0), // orange
    }
}

/// One snapshot of a volume: every occupied cell and its color key.
pub struct Frame {
    pub title: String,
    pub blocks: Vec<(Point3, usize)>,
}

impl Frame {
    /// Collects the cells of `space` for which `key` yields a color key.
    pub fn capture<T>(
        title: impl Into<String>,
        space: &Grid3<T>,
        key: impl Fn(&T) -> Option<usize>,
    ) -> Self {
        let blocks = space
            .cells()
            .filter_map(|cell| cell.with_value(&key).map(|key| (cell.point(), key)))
            .collect();
        Self {
            title: title.into(),
            blocks,
        }
    }
}

/// Represents a rendered cube in the 3D scene.
struct RenderedCube {
    node: SceneNode3d,
    /// Layer of the cell, used to spread layers apart.
    layer: f32,
    /// The cube's position when not exploded.
    base_position: Vec3,
}

/// Builds the 3D scene for a frame.
///
/// Coordinate conventions:
/// - Volume x maps to world X, y to world Z and z (height) to world Y.
/// - The frame is centered at the origin.
fn build_scene(scene: &mut SceneNode3d, frame: &Frame) -> Vec<RenderedCube> {
    /// Size of each rendered cube (slightly smaller than 1.0 for visible gaps).
    const CUBE_SIZE: f32 = 0.9;
    /// Spacing between grid cells.
    const CELL_SPACING: f32 = 1.0;

    let count = frame.blocks.len().max(1) as f32;
    let center = frame
        .blocks
        .iter()
        .map(|(point, _)| Vec3::new(point.x as f32, point.z as f32, point.y as f32))
        .fold(Vec3::ZERO, |acc, pos| acc + pos)
        / count;

    frame
        .blocks
        .iter()
        .map(|&(point, key)| {
            let base_position = Vec3::new(
                point.x as f32 * CELL_SPACING - center.x,
                point.z as f32 * CELL_SPACING - center.y,
                point.y as f32 * CELL_SPACING - center.z,
            );
            let node = scene
                .add_cube(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE)
                .set_color(key_color(key))
                .set_position(base_position);
            RenderedCube {
                node,
                layer: point.z as f32 - center.y,
                base_position,
            }
        })
        .collect()
}

fn window_title(frames: &[Frame], index: usize) -> String {
    format!(
        "{} ({}/{}) - [Left/Right] navigate, [Up/Down] explode, [R] reset",
        frames[index].title,
        index + 1,
        frames.len()
    )
}

/// Displays frames in an interactive 3D viewer.
pub fn display(frames: Vec<Frame>) {
    pollster::block_on(display_async(frames));
}

async fn display_async(frames: Vec<Frame>) {
    if frames.is_empty() {
        println!("Nothing to display");
        return;
    }

    let num_frames = frames.len();
    let mut current_frame = 0;

    let mut window = Window::new(&window_title(&frames, current_frame)).await;

    let mut camera = OrbitCamera3d::default();
    camera.set_dist(20.0);

    let mut scene = SceneNode3d::empty();
    scene
        .add_light(Light::point(100.0))
        .set_position(Vec3::new(10.0, 10.0, 10.0));

    let mut rendered_cubes = build_scene(&mut scene, &frames[current_frame]);

    // extra world units between consecutive layers
    let mut explosion_amount: f32 = 0.0;
    const EXPLOSION_SPEED: f32 = 0.05;
    let mut needs_rebuild = false;

    loop {
        for event in window.events().iter() {
            if let kiss3d::event::WindowEvent::Key(key, action, _) = event.value {
                use kiss3d::event::{Action, Key};
                if action == Action::Press {
                    match key {
                        Key::Up => explosion_amount += EXPLOSION_SPEED,
                        Key::Down => {
                            explosion_amount = (explosion_amount - EXPLOSION_SPEED).max(0.0)
                        }
                        Key::R => explosion_amount = 0.0,
                        Key::Right => {
                            current_frame = (current_frame + 1) % num_frames;
                            needs_rebuild = true;
                        }
                        Key::Left => {
                            current_frame = current_frame.checked_sub(1).unwrap_or(num_frames - 1);
                            needs_rebuild = true;
                        }
                        _ => {}
                    }
                }
            }
        }

        if needs_rebuild {
            for mut cube in rendered_cubes.drain(..) {
                cube.node.remove();
            }
            rendered_cubes = build_scene(&mut scene, &frames[current_frame]);
            window.set_title(&window_title(&frames, current_frame));
            needs_rebuild = false;
        }

        for cube in &mut rendered_cubes {
            cube.node.set_position(
                cube.base_position + Vec3::new(0.0, cube.layer * explosion_amount, 0.0),
            );
        }

        if !window.render_3d(&mut scene, &mut camera).await {
            break;
        }
    }
}
