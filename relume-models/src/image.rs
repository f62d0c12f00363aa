use glam::{vec3, Vec3};

/// Float RGBA image as produced by the host's deferred-shading pass.
///
/// Depending on which G-buffer channel it carries, a texel holds linear RGB
/// albedo, a world-space unit normal, or a world-space position; alpha is
/// carried along but unused.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RgbaImage {
    width: usize,
    height: usize,
    data: Vec<[f32; 4]>,
}

impl RgbaImage {
    pub fn new(width: usize, height: usize, data: Vec<[f32; 4]>) -> Self {
        assert_eq!(width * height, data.len());

        Self {
            width,
            height,
            data,
        }
    }

    /// Image of the given size with every texel set to `texel`.
    pub fn filled(width: usize, height: usize, texel: [f32; 4]) -> Self {
        Self {
            width,
            height,
            data: vec![texel; width * height],
        }
    }

    /// Image of the given size built texel-by-texel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut texel: impl FnMut(usize, usize) -> [f32; 4],
    ) -> Self {
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                data.push(texel(x, y));
            }
        }

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn texel(&self, x: usize, y: usize) -> [f32; 4] {
        self.data[y * self.width + x]
    }

    /// RGB part of the texel at `(x, y)`.
    pub fn rgb(&self, x: usize, y: usize) -> Vec3 {
        let [r, g, b, _] = self.texel(x, y);

        vec3(r, g, b)
    }

    pub fn data(&self) -> &[[f32; 4]] {
        &self.data
    }

    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
