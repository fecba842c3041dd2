use std::f32::consts::FRAC_PI_2;

use glam::Mat4;

/// Angle added about each axis per frame, in radians (π/1400).
pub const ROTATION_STEP: f32 = FRAC_PI_2 / 700.0;

/// The cube's model transform, advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    matrix: Mat4,
    frames: u64,
}

impl RotationState {
    pub fn new() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
            frames: 0,
        }
    }

    /// Rotates about the local X axis, then the local Y axis, by
    /// [`ROTATION_STEP`] each (`m = m · Rx · Ry`).
    pub fn advance(&mut self) {
        self.matrix = self.matrix
            * Mat4::from_rotation_x(ROTATION_STEP)
            * Mat4::from_rotation_y(ROTATION_STEP);
        self.frames += 1;
    }

    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Number of times [`advance`](Self::advance) has run.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Column-major, as uploaded to the `rot` uniform.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.matrix.to_cols_array()
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type M = [[f32; 4]; 4]; // column-major: m[col][row]

    fn mul(a: &M, b: &M) -> M {
        let mut out = [[0.0f32; 4]; 4];
        for col in 0..4 {
            for row in 0..4 {
                out[col][row] = (0..4).map(|k| a[k][row] * b[col][k]).sum();
            }
        }
        out
    }

    fn rx(t: f32) -> M {
        let (s, c) = t.sin_cos();
        [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    fn ry(t: f32) -> M {
        let (s, c) = t.sin_cos();
        [
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }

    fn expected_after(frames: usize) -> [f32; 16] {
        let step = std::f32::consts::PI / 1400.0;
        let mut m: M = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        for _ in 0..frames {
            m = mul(&mul(&m, &rx(step)), &ry(step));
        }
        let mut flat = [0.0; 16];
        for (col, column) in m.iter().enumerate() {
            flat[col * 4..col * 4 + 4].copy_from_slice(column);
        }
        flat
    }

    fn assert_close(a: &[f32; 16], b: &[f32; 16], eps: f32) {
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() <= eps, "element {i}: {x} vs {y}");
        }
    }

    #[test]
    fn step_is_pi_over_1400() {
        assert!((ROTATION_STEP - std::f32::consts::PI / 1400.0).abs() < 1e-9);
    }

    #[test]
    fn starts_at_identity() {
        let r = RotationState::new();
        assert_eq!(r.matrix(), Mat4::IDENTITY);
        assert_eq!(r.frames(), 0);
    }

    #[test]
    fn one_frame_is_rx_then_ry() {
        let mut r = RotationState::new();
        r.advance();
        assert_close(&r.to_cols_array(), &expected_after(1), 1e-6);
    }

    #[test]
    fn n_frames_compose_n_increments() {
        for n in [2usize, 10, 700] {
            let mut r = RotationState::new();
            for _ in 0..n {
                r.advance();
            }
            assert_eq!(r.frames(), n as u64);
            assert_close(&r.to_cols_array(), &expected_after(n), 1e-4);
        }
    }

    #[test]
    fn stays_a_rotation() {
        let mut r = RotationState::new();
        for _ in 0..5000 {
            r.advance();
        }
        let m = r.matrix();
        assert!((m.determinant() - 1.0).abs() < 1e-3);
        let w = m.w_axis;
        assert_eq!(w, glam::Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
