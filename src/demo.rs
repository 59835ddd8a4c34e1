//! Demo scene: a hypercube sliced into 8 rooms
//!
//! The scene is one hypercube cut in the X, Z and W directions, giving 8
//! cubical rooms. Every room is bounded by eight cube-shaped walls (the
//! cells of a hypercube); walls on the +X, +Z and +W sides are doorway
//! walls with a hole, tinted red, green and blue, so neighboring rooms stay
//! reachable and the fourth dimension is color-coded. The first room is
//! built wall by wall, the other seven are mirrored copies with the shared
//! doorway walls left out.

use std::f32::consts::{FRAC_PI_2, PI};

use tetra4d_core::{
    Geometry4, GeometryId, NodeId, Plane4, Scene, Transform4, CUBE_CORNERS, CUBE_TETRAHEDRA,
    CUBE_TRIANGLES,
};
use tetra4d_math::Vec4;

/// Wall thickness in the extrusion direction, before the complex is scaled.
const WALL_DEPTH: f32 = 0.1;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// Builds the 8-room complex, scaled to walkable size.
pub fn build_scene() -> Scene {
    let mut scene = Scene::new();
    let wall = scene.add_geometry(wall_geometry());
    let doorway = scene.add_geometry(doorway_geometry());

    let complex = scene.add_node(Scene::ROOT);
    {
        let transform = &mut scene.node_mut(complex).transform;
        transform.scale(Vec4::new(10.0, 6.0, 10.0, 10.0));
        transform.pos.y = 3.0;
    }

    // First room at the origin, then its mirror images. A mirrored axis
    // shares its doorway wall with the neighbor, so the copy drops it.
    let rooms: [(Vec4, Vec4, [bool; 3]); 8] = [
        (Vec4::ONE, Vec4::ZERO, [true, true, true]),
        (Vec4::new(-1.0, 1.0, 1.0, 1.0), Vec4::X, [false, true, true]),
        (Vec4::new(1.0, 1.0, -1.0, 1.0), Vec4::Z, [true, false, true]),
        (Vec4::new(1.0, 1.0, 1.0, -1.0), Vec4::W, [true, true, false]),
        (
            Vec4::new(-1.0, 1.0, -1.0, 1.0),
            Vec4::new(1.0, 0.0, 1.0, 0.0),
            [false, false, true],
        ),
        (
            Vec4::new(-1.0, 1.0, 1.0, -1.0),
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            [false, true, false],
        ),
        (
            Vec4::new(1.0, 1.0, -1.0, -1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
            [true, false, false],
        ),
        (
            Vec4::new(-1.0, 1.0, -1.0, -1.0),
            Vec4::new(1.0, 0.0, 1.0, 1.0),
            [false, false, false],
        ),
    ];
    for (mirror, pos, doorways) in rooms {
        add_room(&mut scene, complex, wall, doorway, mirror, pos, doorways);
    }

    log::info!(
        "demo scene: {} nodes, {} tetrahedra",
        scene.node_count(),
        scene.tetrahedron_count()
    );
    scene
}

/// One room: five plain walls plus up to three doorway walls. `doorways`
/// selects the +X, +Z and +W walls in that order.
fn add_room(
    scene: &mut Scene,
    parent: NodeId,
    wall: GeometryId,
    doorway: GeometryId,
    mirror: Vec4,
    pos: Vec4,
    doorways: [bool; 3],
) {
    let room = scene.add_node(parent);
    {
        let transform = &mut scene.node_mut(room).transform;
        transform.scale(mirror);
        transform.pos = pos;
    }

    // Each wall is a cube slab rotated so its extruded thickness points
    // along the room axis it closes off.
    let mut add_wall = |geometry, color, f: &dyn Fn(&mut Transform4)| {
        let id = scene.add_model(room, geometry);
        let node = scene.node_mut(id);
        node.color = color;
        f(&mut node.transform);
    };

    add_wall(wall, WHITE, &|t| {
        t.pos.x = -0.5;
        t.rotate(Plane4::Xw, FRAC_PI_2);
    });
    add_wall(wall, WHITE, &|t| {
        t.pos.y = 0.5;
        t.rotate(Plane4::Yw, -FRAC_PI_2);
    });
    add_wall(wall, WHITE, &|t| {
        t.pos.y = -0.5;
        t.rotate(Plane4::Yw, FRAC_PI_2);
    });
    add_wall(wall, WHITE, &|t| {
        t.pos.z = -0.5;
        t.rotate(Plane4::Zw, FRAC_PI_2);
    });
    add_wall(wall, WHITE, &|t| {
        t.pos.w = -0.5;
        t.rotate(Plane4::Xw, PI);
    });

    if doorways[0] {
        add_wall(doorway, RED, &|t| {
            t.pos.x = 0.5;
            t.rotate(Plane4::Xw, -FRAC_PI_2);
        });
    }
    if doorways[1] {
        add_wall(doorway, GREEN, &|t| {
            t.pos.z = 0.5;
            t.rotate(Plane4::Zw, -FRAC_PI_2);
        });
    }
    if doorways[2] {
        add_wall(doorway, BLUE, &|t| {
            t.pos.w = 0.5;
        });
    }
}

/// A unit cube centered at the origin, extruded to a thin slab and lit
/// from inside the room.
fn wall_geometry() -> Geometry4 {
    let vertices = centered(&CUBE_CORNERS);
    let mut geometry =
        Geometry4::extrude_3d(&vertices, &CUBE_TRIANGLES, &CUBE_TETRAHEDRA, WALL_DEPTH);
    geometry.unindex();
    geometry.recompute_normals(true);
    geometry
}

/// A cube with a square tunnel through it: a 3x3 grid of boxes with the
/// center removed. Stands in for the doorway cells of the hypercube.
fn doorway_geometry() -> Geometry4 {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    let mut tetrahedra = Vec::new();

    let cuts = [-0.5f32, -1.0 / 6.0, 1.0 / 6.0, 0.5];
    for j in 0..3 {
        for i in 0..3 {
            if i == 1 && j == 1 {
                continue;
            }
            let base = vertices.len() as u32;
            for corner in CUBE_CORNERS {
                vertices.push([
                    cuts[i] + corner[0] * (cuts[i + 1] - cuts[i]),
                    cuts[j] + corner[1] * (cuts[j + 1] - cuts[j]),
                    corner[2] - 0.5,
                ]);
            }
            triangles.extend(CUBE_TRIANGLES.iter().map(|&k| k + base));
            tetrahedra.extend(CUBE_TETRAHEDRA.iter().map(|&k| k + base));
        }
    }

    let mut geometry =
        Geometry4::extrude_3d(&vertices, &triangles, &tetrahedra, WALL_DEPTH);
    geometry.unindex();
    geometry.recompute_normals(true);
    geometry
}

fn centered(corners: &[[f32; 3]]) -> Vec<[f32; 3]> {
    corners
        .iter()
        .map(|c| [c[0] - 0.5, c[1] - 0.5, c[2] - 0.5])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_shape() {
        let scene = build_scene();
        // root + complex + 8 rooms + walls: 8 rooms x 5 plain, 12 doorways
        let walls = 8 * 5 + 12;
        assert_eq!(scene.node_count(), 2 + 8 + walls);

        let shadow = scene.collect_shadow_geometry();
        assert!(scene.validate_shadow_indices(&shadow));
        assert_eq!(shadow.cell_count(), scene.tetrahedron_count());
    }

    #[test]
    fn test_doorway_count_matches_shared_faces() {
        // 8 rooms, each adjacent pair along X, Z or W shares one doorway:
        // 4 pairs per axis, 3 axes
        let scene = build_scene();
        let mut doorways = 0;
        scene.visit(|_, node, _| {
            if node.color != WHITE && node.geometry.is_some() {
                doorways += 1;
            }
        });
        assert_eq!(doorways, 12);
    }

    #[test]
    fn test_wall_geometry_is_flat_unindexed() {
        let wall = wall_geometry();
        assert!(!wall.is_indexed());
        // both extruded layers plus three wall cells per boundary triangle
        assert_eq!(
            wall.cell_count(),
            2 * (CUBE_TETRAHEDRA.len() / 4) + CUBE_TRIANGLES.len()
        );
        assert_eq!(wall.vertices.len(), wall.normals.len());

        // slab thickness matches the extrusion depth
        let (min, max) = wall.bounding_box();
        assert!((max.w - min.w - WALL_DEPTH).abs() < 1e-6);
    }

    #[test]
    fn test_doorway_geometry_has_a_hole() {
        let doorway = doorway_geometry();
        // no vertex in the open center column (|x|,|y| < 1/6)
        let hole = doorway
            .vertices
            .iter()
            .any(|v| v.x.abs() < 1.0 / 6.0 - 1e-4 && v.y.abs() < 1.0 / 6.0 - 1e-4);
        assert!(!hole);
    }
}
