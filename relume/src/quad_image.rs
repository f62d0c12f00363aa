use std::collections::TryReserveError;

use glam::Vec3;

use crate::models::RgbaImage;
use crate::Vec3x4;

/// W×H image stored as rows of four-pixel groups.
///
/// The width is padded up to a multiple of four; padding lanes replicate the
/// last real pixel of their row, so reductions over whole groups (bounds,
/// light totals) stay within the range of real values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadImage {
    width: usize,
    height: usize,
    groups: usize,
    data: Vec<Vec3x4>,
}

impl QuadImage {
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let width = image.width();
        let height = image.height();

        if width == 0 || height == 0 {
            return Self::default();
        }

        let groups = width.div_ceil(4);
        let mut data = Vec::with_capacity(groups * height);

        for y in 0..height {
            for gx in 0..groups {
                let mut group = Vec3x4::ZERO;

                for lane in 0..4 {
                    let x = (gx * 4 + lane).min(width - 1);

                    group.set_lane(lane, image.rgb(x, y));
                }

                data.push(group);
            }
        }

        Self {
            width,
            height,
            groups,
            data,
        }
    }

    /// Resizes to `width`×`height`, zero-filled.
    ///
    /// Resizing to the current dimensions keeps the contents, which is what
    /// lets one refinement pass build on the rows of the previous ones.
    /// Allocation failure leaves the image empty.
    pub fn try_resize(&mut self, width: usize, height: usize) -> Result<(), TryReserveError> {
        if self.width == width && self.height == height {
            return Ok(());
        }

        let groups = width.div_ceil(4);
        let len = groups * height;

        let mut data = Vec::new();

        if let Err(err) = data.try_reserve_exact(len) {
            self.release();
            return Err(err);
        }

        data.resize(len, Vec3x4::ZERO);

        *self = Self {
            width,
            height,
            groups,
            data,
        };

        Ok(())
    }

    /// Drops the contents, returning the image to the empty state.
    pub fn release(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Groups per row, i.e. the padded width divided by four.
    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn group(&self, gx: usize, y: usize) -> &Vec3x4 {
        &self.data[y * self.groups + gx]
    }

    pub fn group_mut(&mut self, gx: usize, y: usize) -> &mut Vec3x4 {
        &mut self.data[y * self.groups + gx]
    }

    pub fn row(&self, y: usize) -> &[Vec3x4] {
        &self.data[y * self.groups..(y + 1) * self.groups]
    }

    /// Iterates over all rows as disjoint mutable slices; this is how the
    /// kernel hands each worker its own share of the image.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [Vec3x4]> {
        self.data.chunks_mut(self.groups.max(1))
    }

    pub fn pixel(&self, x: usize, y: usize) -> Vec3 {
        self.group(x / 4, y).lane(x % 4)
    }

    pub fn as_slice(&self) -> &[Vec3x4] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [Vec3x4] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use glam::vec3;

    use super::*;

    #[test]
    fn from_rgba_pads_with_last_pixel() {
        let image = RgbaImage::from_fn(6, 2, |x, y| [x as f32, y as f32, 0.0, 0.0]);
        let target = QuadImage::from_rgba(&image);

        assert_eq!(target.width(), 6);
        assert_eq!(target.height(), 2);
        assert_eq!(target.groups(), 2);

        assert_eq!(target.pixel(0, 0), vec3(0.0, 0.0, 0.0));
        assert_eq!(target.pixel(5, 1), vec3(5.0, 1.0, 0.0));

        // Lanes 2 and 3 of the second group replicate pixel (5, y)
        assert_eq!(target.group(1, 1).lane(2), vec3(5.0, 1.0, 0.0));
        assert_eq!(target.group(1, 1).lane(3), vec3(5.0, 1.0, 0.0));
    }

    #[test]
    fn resize_keeps_contents_on_same_dimensions() {
        let mut target = QuadImage::default();

        target.try_resize(4, 2).unwrap();
        target.group_mut(0, 1).set_lane(0, vec3(1.0, 2.0, 3.0));

        target.try_resize(4, 2).unwrap();

        assert_eq!(target.pixel(0, 1), vec3(1.0, 2.0, 3.0));

        target.try_resize(8, 2).unwrap();

        assert_eq!(target.pixel(0, 1), Vec3::ZERO);
    }

    #[test]
    fn release() {
        let mut target = QuadImage::default();

        target.try_resize(4, 4).unwrap();
        assert!(!target.is_empty());

        target.release();
        assert!(target.is_empty());
        assert_eq!(target.width(), 0);
    }

    #[test]
    fn rows_are_disjoint_slices() {
        let mut target = QuadImage::default();

        target.try_resize(8, 3).unwrap();

        let rows: Vec<_> = target.rows_mut().collect();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.len() == 2));
    }
}
