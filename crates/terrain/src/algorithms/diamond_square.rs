//! Diamond-square height-field generation on the CPU.
//!
//! The grid is square with side 2^n + 1. Subdivision walks boxes breadth
//! first; each box sets its midpoint from its corners (diamond step), then
//! each side midpoint from the corners of its diamond, wrapping around the
//! grid edge where the diamond pokes past it (square step).
//!
//! - <https://en.wikipedia.org/wiki/Diamond-square_algorithm>

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use crate::error::TerrainError;
use crate::gpu::create_height_texture;
use crate::heightmap::HeightMap;

use super::HeightMapSource;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub w: i32,
    pub h: i32,
}

impl GridSize {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    pub const fn half(self) -> Self {
        Self {
            w: self.w / 2,
            h: self.h / 2,
        }
    }
}

/// An axis-aligned subdivision cell of the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridBox {
    pub origin: Point,
    pub size: GridSize,
}

impl GridBox {
    pub const fn new(origin: Point, size: GridSize) -> Self {
        Self { origin, size }
    }

    pub const fn northwest(self) -> Point {
        self.origin
    }

    pub const fn northeast(self) -> Point {
        Point::new(self.origin.x + self.size.w, self.origin.y)
    }

    pub const fn southwest(self) -> Point {
        Point::new(self.origin.x, self.origin.y + self.size.h)
    }

    pub const fn southeast(self) -> Point {
        Point::new(self.origin.x + self.size.w, self.origin.y + self.size.h)
    }

    pub const fn north(self) -> Point {
        Point::new(self.origin.x + (self.size.w / 2 + 1), self.origin.y)
    }

    pub const fn west(self) -> Point {
        Point::new(self.origin.x, self.origin.y + (self.size.h / 2 + 1))
    }

    pub const fn south(self) -> Point {
        Point::new(self.origin.x + (self.size.w / 2 + 1), self.origin.y + self.size.h)
    }

    pub const fn east(self) -> Point {
        Point::new(self.origin.x + self.size.w, self.origin.y + (self.size.h / 2 + 1))
    }

    pub const fn midpoint(self) -> Point {
        Point::new(
            self.origin.x + (self.size.w / 2 + 1),
            self.origin.y + (self.size.h / 2 + 1),
        )
    }

    pub const fn corners(self) -> [Point; 4] {
        [
            self.northwest(),
            self.southwest(),
            self.northeast(),
            self.southeast(),
        ]
    }

    pub const fn side_midpoints(self) -> [Point; 4] {
        [self.north(), self.west(), self.south(), self.east()]
    }

    /// The four quadrant boxes, or none once the box is too small to split.
    pub fn subdivisions(self) -> Vec<GridBox> {
        if self.size.w <= 2 || self.size.h <= 2 {
            return Vec::new();
        }
        let midpoint = self.midpoint();
        let size = GridSize::new(midpoint.x - self.origin.x, midpoint.y - self.origin.y);
        vec![
            GridBox::new(self.origin, size),
            GridBox::new(Point::new(self.origin.x + size.w, self.origin.y), size),
            GridBox::new(Point::new(self.origin.x, self.origin.y + size.h), size),
            GridBox::new(
                Point::new(self.origin.x + size.w, self.origin.y + size.h),
                size,
            ),
        ]
    }

    /// Visit this box and all its subdivisions, breadth first.
    pub fn breadth_first(self, mut visit: impl FnMut(GridBox)) {
        let mut queue = VecDeque::from([self]);
        while let Some(cell) = queue.pop_front() {
            visit(cell);
            queue.extend(cell.subdivisions());
        }
    }

    /// Corners of the diamond centered on `point`, wrapped around the grid
    /// edge where the diamond extends past it. `self` is the whole grid here.
    pub fn diamond_corners(self, point: Point, diamond_size: GridSize) -> [Point; 4] {
        let half = diamond_size.half();
        let raw = [
            Point::new(point.x, point.y - half.h),
            Point::new(point.x - half.w, point.y),
            Point::new(point.x, point.y + half.h),
            Point::new(point.x + half.w, point.y),
        ];
        raw.map(|p| {
            if p.x < 0 {
                Point::new(p.x + self.size.w - 1, p.y)
            } else if p.x > self.size.w {
                Point::new(p.x - self.size.w + 1, p.y)
            } else if p.y < 0 {
                Point::new(p.x, p.y + self.size.h - 1)
            } else if p.y > self.size.h {
                Point::new(p.x, p.y - self.size.h + 1)
            } else {
                p
            }
        })
    }

    /// Row-major index of `point` within this grid, clamped to the sample
    /// range so edge points landing on the far boundary stay in bounds.
    pub fn point_to_index(self, point: Point) -> usize {
        let x = point.x.clamp(0, self.size.w - 1);
        let y = point.y.clamp(0, self.size.h - 1);
        (y * self.size.w + x) as usize
    }

    /// Run diamond-square over this grid, returning `w * h` raw samples.
    pub fn render(self, rng: &mut impl Rng) -> Vec<f32> {
        let mut height_map = vec![0.0f32; (self.size.w * self.size.h) as usize];

        for corner in self.corners() {
            height_map[self.point_to_index(corner)] = rng.gen_range(0.0..=1.0);
        }

        self.breadth_first(|cell| {
            // Diamond step: the cell midpoint from the cell corners.
            let corner_average = average(
                cell.corners()
                    .map(|p| height_map[self.point_to_index(p)]),
            );
            let midpoint_value = rng.gen_range(0.0..=1.0) + corner_average;
            height_map[self.point_to_index(cell.midpoint())] = midpoint_value;

            // Square step: each side midpoint from its diamond's corners.
            for point in cell.side_midpoints() {
                let corners = self.diamond_corners(point, cell.size);
                let corner_average =
                    average(corners.map(|p| height_map[self.point_to_index(p)]));
                height_map[self.point_to_index(point)] =
                    rng.gen_range(0.0..=1.0) + corner_average;
            }
        });

        height_map
    }
}

fn average(values: [f32; 4]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// CPU diamond-square source: renders on the host with a seeded generator
/// and uploads into its `r32float` texture.
pub struct DiamondSquare {
    grid: GridBox,
    side: usize,
    rng: ChaCha8Rng,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DiamondSquare {
    pub const DEFAULT_SIDE: usize = 513;

    pub fn new(device: &wgpu::Device, seed: u64) -> Result<Self, TerrainError> {
        Self::with_side(device, seed, Self::DEFAULT_SIDE)
    }

    /// `side` must be 2^n + 1 so every subdivision midpoint lands on a sample.
    pub fn with_side(
        device: &wgpu::Device,
        seed: u64,
        side: usize,
    ) -> Result<Self, TerrainError> {
        if side < 3 || !(side - 1).is_power_of_two() {
            return Err(TerrainError::BadGridSide(side));
        }
        let texture =
            create_height_texture(device, side as u32, side as u32, "Diamond-Square Heights");
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            grid: GridBox::new(Point::new(0, 0), GridSize::new(side as i32, side as i32)),
            side,
            rng: ChaCha8Rng::seed_from_u64(seed),
            texture,
            view,
        })
    }

    /// Render one height map and rescale it into [0, 1]. Successive calls
    /// advance the generator, so each render rolls new terrain; reseeding
    /// reproduces the sequence.
    pub fn generate(&mut self) -> HeightMap {
        let mut samples = self.grid.render(&mut self.rng);
        normalize(&mut samples);
        // Length is w * h by construction.
        HeightMap::from_samples(self.side, self.side, samples)
            .unwrap_or_else(|_| unreachable!())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

/// Rescale raw samples into [0, 1]; the diamond step accumulates corner
/// averages, so raw values exceed 1.
fn normalize(samples: &mut [f32]) {
    let (mut min, mut max) = (f32::INFINITY, f32::NEG_INFINITY);
    for &s in samples.iter() {
        min = min.min(s);
        max = max.max(s);
    }
    let range = max - min;
    if range <= f32::EPSILON {
        samples.fill(0.0);
        return;
    }
    for s in samples.iter_mut() {
        *s = (*s - min) / range;
    }
}

impl HeightMapSource for DiamondSquare {
    fn name(&self) -> &'static str {
        "Diamond-Square"
    }

    fn out_texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    fn out_view(&self) -> &wgpu::TextureView {
        &self.view
    }

    fn prepare(&mut self, queue: &wgpu::Queue) {
        let map = self.generate();
        if let Err(e) = map.upload(queue, &self.texture) {
            log::error!("diamond-square upload failed: {e}");
        }
    }

    fn encode(&self, _encoder: &mut wgpu::CommandEncoder) {
        // All work happens on the host; nothing to dispatch.
    }
}
