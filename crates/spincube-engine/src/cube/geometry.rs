//! Fixed cube geometry.
//!
//! Only three faces are defined (front, back and bottom), two triangles each.
//! The data is reproduced as authored; the other three faces are absent.

/// Floats per vertex in both buffers.
pub const COMPONENTS: u32 = 3;

/// Vertices drawn per frame.
pub const VERTEX_COUNT: u32 = 18;

const FLOATS: usize = (VERTEX_COUNT * COMPONENTS) as usize;

#[rustfmt::skip]
pub const POSITIONS: [f32; FLOATS] = [
    // front, z = +0.5
    -0.5, -0.5,  0.5,
    -0.5,  0.5,  0.5,
     0.5, -0.5,  0.5,

    -0.5,  0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5,  0.5,  0.5,

    // back, z = -0.5
    -0.5, -0.5, -0.5,
    -0.5,  0.5, -0.5,
     0.5, -0.5, -0.5,

    -0.5,  0.5, -0.5,
     0.5, -0.5, -0.5,
     0.5,  0.5, -0.5,

    // bottom, y = -0.5
    -0.5, -0.5,  0.5,
     0.5, -0.5,  0.5,
     0.5, -0.5, -0.5,

     0.5, -0.5, -0.5,
    -0.5, -0.5, -0.5,
    -0.5, -0.5,  0.5,
];

/// Per-vertex RGB, parallel to [`POSITIONS`].
#[rustfmt::skip]
pub const COLORS: [f32; FLOATS] = [
    // front: red, green, blue / blue, green, red
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    0.0, 0.0, 1.0,

    0.0, 0.0, 1.0,
    0.0, 1.0, 0.0,
    1.0, 0.0, 0.0,

    // back: black
    0.0, 0.0, 0.0,
    0.0, 0.0, 0.0,
    0.0, 0.0, 0.0,

    0.0, 0.0, 0.0,
    0.0, 0.0, 0.0,
    0.0, 0.0, 0.0,

    // bottom: gray
    0.5, 0.5, 0.5,
    0.5, 0.5, 0.5,
    0.5, 0.5, 0.5,

    0.5, 0.5, 0.5,
    0.5, 0.5, 0.5,
    0.5, 0.5, 0.5,
];
