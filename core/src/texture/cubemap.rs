use crate::math::{CubeFace, Vec2, Vec3, direction_to_face_uv};

/// Number of levels in a full mip chain for a square face of `size` texels.
pub const fn max_mip_count(size: u32) -> u32 {
    if size == 0 { 0 } else { 32 - size.leading_zeros() }
}

/// One mip level of a cube map: six square faces of linear RGB radiance.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapMip {
    size: u32,
    faces: [Vec<Vec3>; 6],
}

impl CubemapMip {
    /// Create a black level with faces of `size` x `size` texels.
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        let texels = (size * size) as usize;
        Self {
            size,
            faces: std::array::from_fn(|_| vec![Vec3::ZERO; texels]),
        }
    }

    /// Face width and height in texels.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major texels of one face.
    pub fn face(&self, face: CubeFace) -> &[Vec3] {
        &self.faces[face.index()]
    }

    /// Mutable row-major texels of one face.
    pub fn face_mut(&mut self, face: CubeFace) -> &mut [Vec3] {
        &mut self.faces[face.index()]
    }

    #[inline]
    pub fn texel(&self, face: CubeFace, x: u32, y: u32) -> Vec3 {
        self.faces[face.index()][(y * self.size + x) as usize]
    }

    #[inline]
    pub fn set_texel(&mut self, face: CubeFace, x: u32, y: u32, value: Vec3) {
        let size = self.size;
        self.faces[face.index()][(y * size + x) as usize] = value;
    }

    /// Bilinearly filtered lookup along `dir`. Filtering does not cross face edges.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let (face, uv) = direction_to_face_uv(dir);
        self.sample_face(face, uv)
    }

    fn sample_face(&self, face: CubeFace, uv: Vec2) -> Vec3 {
        let max = (self.size - 1) as f32;
        let fx = (uv.x * self.size as f32 - 0.5).clamp(0.0, max);
        let fy = (uv.y * self.size as f32 - 0.5).clamp(0.0, max);
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.texel(face, x0, y0).lerp(self.texel(face, x1, y0), tx);
        let bottom = self.texel(face, x0, y1).lerp(self.texel(face, x1, y1), tx);
        top.lerp(bottom, ty)
    }

    /// 2x2 box-filtered half-resolution copy of this level.
    fn downsample(&self) -> Self {
        let mut child = Self::new(self.size / 2);
        let last = self.size - 1;
        for face in CubeFace::ALL {
            for y in 0..child.size {
                for x in 0..child.size {
                    let (px, py) = (x * 2, y * 2);
                    let sum = self.texel(face, px, py)
                        + self.texel(face, (px + 1).min(last), py)
                        + self.texel(face, px, (py + 1).min(last))
                        + self.texel(face, (px + 1).min(last), (py + 1).min(last));
                    child.set_texel(face, x, y, sum * 0.25);
                }
            }
        }
        child
    }
}

/// CPU cube map with a mip chain.
///
/// Level 0 holds the full-resolution faces; every following level halves the
/// face size. Texels are linear RGB radiance, unclamped.
///
/// # Example
///
/// ```
/// use radiance_core::math::{CubeFace, Vec3};
/// use radiance_core::texture::CpuCubemap;
///
/// let map = CpuCubemap::from_fn(4, |face, _x, _y, _dir| {
///     if face == CubeFace::PositiveY { Vec3::ONE } else { Vec3::ZERO }
/// });
/// assert_eq!(map.sample(Vec3::Y, 0.0), Vec3::ONE);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CpuCubemap {
    mips: Vec<CubemapMip>,
}

impl CpuCubemap {
    /// Create a black cube map. `mip_count` is clamped to the valid chain length.
    pub fn new(size: u32, mip_count: u32) -> Self {
        let size = size.max(1);
        let count = mip_count.clamp(1, max_mip_count(size));
        let mips = (0..count).map(|level| CubemapMip::new(size >> level)).collect();
        Self { mips }
    }

    /// Create a single-level cube map by evaluating `f` for each texel.
    ///
    /// `f` receives the face, texel coordinates and the direction through the
    /// texel center.
    pub fn from_fn(size: u32, mut f: impl FnMut(CubeFace, u32, u32, Vec3) -> Vec3) -> Self {
        let mut map = Self::new(size, 1);
        let mip = &mut map.mips[0];
        let size = mip.size();
        for face in CubeFace::ALL {
            for y in 0..size {
                for x in 0..size {
                    let dir = face.texel_direction(x, y, size);
                    mip.set_texel(face, x, y, f(face, x, y, dir));
                }
            }
        }
        map
    }

    /// Face size of level 0.
    #[inline]
    pub fn size(&self) -> u32 {
        self.mips[0].size()
    }

    #[inline]
    pub fn mip_count(&self) -> u32 {
        self.mips.len() as u32
    }

    pub fn mip(&self, level: u32) -> Option<&CubemapMip> {
        self.mips.get(level as usize)
    }

    pub fn mip_mut(&mut self, level: u32) -> Option<&mut CubemapMip> {
        self.mips.get_mut(level as usize)
    }

    pub fn mips(&self) -> &[CubemapMip] {
        &self.mips
    }

    /// Replace levels 1.. with a full box-filtered chain built from level 0.
    #[must_use]
    pub fn with_box_filtered_mips(mut self) -> Self {
        self.mips.truncate(1);
        let count = max_mip_count(self.size());
        for _ in 1..count {
            let next = self.mips[self.mips.len() - 1].downsample();
            self.mips.push(next);
        }
        self
    }

    /// Trilinear lookup: bilinear within the two nearest levels, blended by
    /// the fractional part of `lod`. `lod` is clamped to the chain.
    pub fn sample(&self, dir: Vec3, lod: f32) -> Vec3 {
        let max_lod = (self.mips.len() - 1) as f32;
        let lod = if lod.is_nan() { 0.0 } else { lod.clamp(0.0, max_lod) };
        let lower = lod.floor() as usize;
        let upper = (lower + 1).min(self.mips.len() - 1);
        let t = lod - lower as f32;

        let a = self.mips[lower].sample(dir);
        if upper == lower || t <= 0.0 {
            return a;
        }
        a.lerp(self.mips[upper].sample(dir), t)
    }

    /// Total texel count over all faces and levels.
    pub fn texel_count(&self) -> u64 {
        self.mips
            .iter()
            .map(|mip| 6 * u64::from(mip.size()) * u64::from(mip.size()))
            .sum()
    }
}
