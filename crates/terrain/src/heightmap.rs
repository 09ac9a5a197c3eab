//! CPU-side height field: a row-major grid of elevation samples that can be
//! uploaded into the generator's `r32float` input texture.

use crate::error::TerrainError;

#[derive(Clone, Debug)]
pub struct HeightMap {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl HeightMap {
    /// A constant-height field.
    pub fn flat(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Build from a per-texel function of (x, y).
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    /// Wrap an existing sample grid; the vector length must be `width * height`.
    pub fn from_samples(
        width: usize,
        height: usize,
        samples: Vec<f32>,
    ) -> Result<Self, TerrainError> {
        if samples.len() != width * height {
            return Err(TerrainError::HeightMapSize {
                expected: width * height,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.samples[y * self.width + x]
    }

    /// Nearest-texel sample at normalized coordinates in [0, 1].
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let x = ((u * (self.width - 1) as f32).round() as usize).min(self.width - 1);
        let y = ((v * (self.height - 1) as f32).round() as usize).min(self.height - 1);
        self.get(x, y)
    }

    /// Upload the grid into an `r32float` texture of matching size.
    pub fn upload(&self, queue: &wgpu::Queue, texture: &wgpu::Texture) -> Result<(), TerrainError> {
        let expected = (texture.width() * texture.height()) as usize;
        if self.samples.len() != expected {
            return Err(TerrainError::HeightMapSize {
                expected,
                actual: self.samples.len(),
            });
        }
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&self.samples),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width as u32),
                rows_per_image: Some(self.height as u32),
            },
            wgpu::Extent3d {
                width: self.width as u32,
                height: self.height as u32,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_nearest_texel() {
        let map = HeightMap::from_fn(3, 3, |x, y| (y * 3 + x) as f32);
        assert_eq!(map.sample(0.0, 0.0), 0.0);
        assert_eq!(map.sample(1.0, 1.0), 8.0);
        assert_eq!(map.sample(0.5, 0.5), 4.0);
    }

    #[test]
    fn from_samples_rejects_mismatched_length() {
        assert!(HeightMap::from_samples(4, 4, vec![0.0; 15]).is_err());
        assert!(HeightMap::from_samples(4, 4, vec![0.0; 16]).is_ok());
    }
}
