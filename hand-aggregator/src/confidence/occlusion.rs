//! Occlusion-aware joint confidence
//!
//! The host renders every joint as a sphere in a unique ID colour from the
//! source's viewpoint, with normal depth testing, and reads the pixels back.
//! A joint's visibility ratio is the number of its colour's pixels found
//! near its projected centre divided by the pixel area of its unoccluded
//! disc. Rendering and read-back live outside this crate; only the pixel
//! counting is done here.

use std::f32::consts::PI;

use crate::hand::{HandSample, Pose, JOINT_COUNT};

/// Anything that can report per-joint visibility for a source viewpoint
pub trait JointVisibility {
    /// Ratios in [0, 1] per joint, or `None` if no pass is available this tick
    fn visibility_ratios(&mut self, viewpoint: &Pose, sample: &HandSample) -> Option<[f32; JOINT_COUNT]>;
}

/// RGBA8 read-back image, row-major, origin top-left
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelBuffer {
    /// Returns `None` if `pixels` does not hold `width * height` entries
    pub fn new(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// Solid-colour buffer
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }
}

/// Screen-space projection of one joint sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedJoint {
    pub x: f32,
    pub y: f32,
    pub radius_px: f32,
}

impl ProjectedJoint {
    /// Pixel count of the sphere's silhouette with nothing in front of it
    pub fn expected_pixels(&self) -> f32 {
        (PI * self.radius_px * self.radius_px).max(1.0)
    }
}

/// One rendered ID pass for one hand
#[derive(Debug, Clone, PartialEq)]
pub struct IdPass {
    pub pixels: PixelBuffer,
    /// `None` for joints that fell outside the view frustum
    pub joints: [Option<ProjectedJoint>; JOINT_COUNT],
}

/// ID colour painted for `joint`
pub fn joint_id_color(joint: usize) -> [u8; 4] {
    let j = joint as u8;
    [j.wrapping_add(1).wrapping_mul(11), 255 - j.wrapping_mul(7), 0x80, 0xFF]
}

fn same_rgb(a: [u8; 4], b: [u8; 4]) -> bool {
    a[0] == b[0] && a[1] == b[1] && a[2] == b[2]
}

/// Visible fraction of `joint` in `pass`.
///
/// Counts pixels of the joint's ID colour inside a square window of
/// `radius + margin_px` around the projected centre.
pub fn visibility_ratio(pass: &IdPass, joint: usize, margin_px: u32) -> f32 {
    let Some(projected) = pass.joints.get(joint).copied().flatten() else {
        return 0.0;
    };
    let color = joint_id_color(joint);
    let reach = projected.radius_px.max(0.0) + margin_px as f32;

    let x0 = (projected.x - reach).floor().max(0.0) as u32;
    let y0 = (projected.y - reach).floor().max(0.0) as u32;
    let x1 = ((projected.x + reach).ceil().max(0.0) as u32).min(pass.pixels.width());
    let y1 = ((projected.y + reach).ceil().max(0.0) as u32).min(pass.pixels.height());

    let mut found = 0u32;
    for y in y0..y1 {
        for x in x0..x1 {
            if pass.pixels.get(x, y).is_some_and(|p| same_rgb(p, color)) {
                found += 1;
            }
        }
    }

    (found as f32 / projected.expected_pixels()).clamp(0.0, 1.0)
}

/// Host-side renderer producing ID passes (GPU submission + read-back)
pub trait IdPassRenderer {
    fn render_joint_ids(&mut self, viewpoint: &Pose, sample: &HandSample) -> Option<IdPass>;
}

/// [`JointVisibility`] backed by an ID-pass renderer
pub struct IdPassVisibility<R> {
    renderer: R,
    margin_px: u32,
}

impl<R: IdPassRenderer> IdPassVisibility<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer, margin_px: 2 }
    }

    /// Extra pixels searched around each projected disc
    pub fn with_margin(mut self, margin_px: u32) -> Self {
        self.margin_px = margin_px;
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: IdPassRenderer> JointVisibility for IdPassVisibility<R> {
    fn visibility_ratios(&mut self, viewpoint: &Pose, sample: &HandSample) -> Option<[f32; JOINT_COUNT]> {
        let pass = self.renderer.render_joint_ids(viewpoint, sample)?;
        let mut ratios = [0.0; JOINT_COUNT];
        for (joint, ratio) in ratios.iter_mut().enumerate() {
            *ratio = visibility_ratio(&pass, joint, self.margin_px);
        }
        Some(ratios)
    }
}
