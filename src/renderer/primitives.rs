use glam::Vec3;

use super::vertex::{v, Vertex};

/// Unit cube centred on the origin, one quad per face so normals stay flat.
pub fn cube_mesh() -> (Vec<Vertex>, Vec<u32>) {
    // (normal, u axis, v axis) per face
    let faces = [
        (Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::X, Vec3::Y),
    ];
    let corners = [
        (-0.5, -0.5, [0.0, 1.0]),
        (-0.5, 0.5, [0.0, 0.0]),
        (0.5, 0.5, [1.0, 0.0]),
        (0.5, -0.5, [1.0, 1.0]),
    ];

    let mut verts = Vec::with_capacity(24);
    for (normal, u_axis, v_axis) in faces {
        for (du, dv, uv) in corners {
            let pos = normal * 0.5 + u_axis * du + v_axis * dv;
            verts.push(v(pos.to_array(), normal.to_array(), uv));
        }
    }

    let idx = (0..6u32)
        .flat_map(|f| {
            let o = f * 4;
            [o, o + 1, o + 2, o, o + 2, o + 3]
        })
        .collect::<Vec<_>>();

    (verts, idx)
}

/// Two triangles covering [0, 1]² at z = 0.5, inside the compositing
/// orthographic volume (near 0.1, far 1.1).
pub fn quad_mesh() -> (Vec<Vertex>, Vec<u32>) {
    let n = [0.0, 0.0, -1.0];
    let verts = vec![
        v([0.0, 0.0, 0.5], n, [0.0, 1.0]),
        v([0.0, 1.0, 0.5], n, [0.0, 0.0]),
        v([1.0, 1.0, 0.5], n, [1.0, 0.0]),
        v([1.0, 0.0, 0.5], n, [1.0, 1.0]),
    ];
    (verts, vec![0, 1, 2, 0, 2, 3])
}
