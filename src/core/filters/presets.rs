//! Preset definitions built from CSS-style colour operations.

use super::FilterName;
use image::{Rgb, RgbImage};

/// Luma weights shared by the saturate and hue-rotate matrices
const LUMA: [f32; 3] = [0.213, 0.715, 0.072];

/// A single colour operation, applied in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Contrast(f32),
    Brightness(f32),
    Saturate(f32),
    Sepia(f32),
    Grayscale(f32),
    /// Degrees
    HueRotate(f32),
}

/// Flat colour laid over the result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub color: [u8; 3],
    pub alpha: f32,
}

/// One named filter
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub ops: &'static [Op],
    pub overlay: Option<Overlay>,
}

impl Preset {
    /// Filter an image into a new buffer
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let mut output = image.clone();
        for pixel in output.pixels_mut() {
            *pixel = self.apply_pixel(*pixel);
        }
        output
    }

    fn apply_pixel(&self, pixel: Rgb<u8>) -> Rgb<u8> {
        let mut c = pixel.0.map(|v| v as f32 / 255.0);
        for op in self.ops {
            c = op.apply(c);
        }
        if let Some(overlay) = self.overlay {
            for (channel, tint) in c.iter_mut().zip(overlay.color) {
                *channel = *channel * (1.0 - overlay.alpha) + (tint as f32 / 255.0) * overlay.alpha;
            }
        }
        Rgb(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
    }
}

impl Op {
    fn apply(&self, c: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            Op::Contrast(k) => c.map(|v| (v - 0.5) * k + 0.5),
            Op::Brightness(k) => c.map(|v| v * k),
            Op::Saturate(s) => mul(saturate_matrix(s), c),
            Op::Grayscale(a) => mul(saturate_matrix(1.0 - a.clamp(0.0, 1.0)), c),
            Op::Sepia(a) => mul(sepia_matrix(a.clamp(0.0, 1.0)), c),
            Op::HueRotate(deg) => mul(hue_rotate_matrix(deg), c),
        };
        out.map(|v| v.clamp(0.0, 1.0))
    }
}

fn mul(m: [[f32; 3]; 3], c: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2],
        m[1][0] * c[0] + m[1][1] * c[1] + m[1][2] * c[2],
        m[2][0] * c[0] + m[2][1] * c[1] + m[2][2] * c[2],
    ]
}

fn saturate_matrix(s: f32) -> [[f32; 3]; 3] {
    let [r, g, b] = LUMA;
    [
        [r + (1.0 - r) * s, g - g * s, b - b * s],
        [r - r * s, g + (1.0 - g) * s, b - b * s],
        [r - r * s, g - g * s, b + (1.0 - b) * s],
    ]
}

fn sepia_matrix(a: f32) -> [[f32; 3]; 3] {
    let k = 1.0 - a;
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let [r, g, b] = LUMA;
    [
        [
            r + cos * (1.0 - r) - sin * r,
            g - cos * g - sin * g,
            b - cos * b + sin * (1.0 - b),
        ],
        [
            r - cos * r + sin * 0.143,
            g + cos * (1.0 - g) + sin * 0.140,
            b - cos * b - sin * 0.283,
        ],
        [
            r - cos * r - sin * (1.0 - r),
            g - cos * g + sin * g,
            b + cos * (1.0 - b) + sin * b,
        ],
    ]
}

/// The preset behind every filter name
pub static PRESETS: [(FilterName, Preset); 26] = {
    use Op::*;
    [
        (
            FilterName::Filter1977,
            Preset {
                ops: &[Contrast(1.1), Brightness(1.1), Saturate(1.3)],
                overlay: Some(Overlay {
                    color: [243, 106, 188],
                    alpha: 0.3,
                }),
            },
        ),
        (
            FilterName::Aden,
            Preset {
                ops: &[HueRotate(-20.0), Contrast(0.9), Saturate(0.85), Brightness(1.2)],
                overlay: Some(Overlay {
                    color: [66, 10, 14],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Brannan,
            Preset {
                ops: &[Sepia(0.5), Contrast(1.4)],
                overlay: Some(Overlay {
                    color: [161, 44, 199],
                    alpha: 0.31,
                }),
            },
        ),
        (
            FilterName::Brooklyn,
            Preset {
                ops: &[Contrast(0.9), Brightness(1.1)],
                overlay: Some(Overlay {
                    color: [168, 223, 193],
                    alpha: 0.4,
                }),
            },
        ),
        (
            FilterName::Clarendon,
            Preset {
                ops: &[Contrast(1.2), Saturate(1.35)],
                overlay: Some(Overlay {
                    color: [127, 187, 227],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Earlybird,
            Preset {
                ops: &[Contrast(0.9), Sepia(0.2)],
                overlay: Some(Overlay {
                    color: [208, 186, 142],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Gingham,
            Preset {
                ops: &[Brightness(1.05), HueRotate(-10.0)],
                overlay: Some(Overlay {
                    color: [230, 230, 250],
                    alpha: 0.3,
                }),
            },
        ),
        (
            FilterName::Hudson,
            Preset {
                ops: &[Brightness(1.2), Contrast(0.9), Saturate(1.1)],
                overlay: Some(Overlay {
                    color: [166, 177, 255],
                    alpha: 0.3,
                }),
            },
        ),
        (
            FilterName::Inkwell,
            Preset {
                ops: &[Sepia(0.3), Contrast(1.1), Brightness(1.1), Grayscale(1.0)],
                overlay: None,
            },
        ),
        (
            FilterName::Kelvin,
            Preset {
                ops: &[Saturate(1.2), Brightness(1.1)],
                overlay: Some(Overlay {
                    color: [183, 125, 33],
                    alpha: 0.35,
                }),
            },
        ),
        (
            FilterName::Lark,
            Preset {
                ops: &[Contrast(0.9)],
                overlay: Some(Overlay {
                    color: [242, 242, 242],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Lofi,
            Preset {
                ops: &[Saturate(1.1), Contrast(1.5)],
                overlay: None,
            },
        ),
        (
            FilterName::Maven,
            Preset {
                ops: &[Sepia(0.25), Brightness(0.95), Contrast(0.95), Saturate(1.5)],
                overlay: Some(Overlay {
                    color: [3, 230, 26],
                    alpha: 0.1,
                }),
            },
        ),
        (
            FilterName::Mayfair,
            Preset {
                ops: &[Contrast(1.1), Saturate(1.1)],
                overlay: Some(Overlay {
                    color: [255, 200, 200],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Moon,
            Preset {
                ops: &[Grayscale(1.0), Contrast(1.1), Brightness(1.1)],
                overlay: None,
            },
        ),
        (
            FilterName::Nashville,
            Preset {
                ops: &[Sepia(0.2), Contrast(1.2), Brightness(1.05), Saturate(1.2)],
                overlay: Some(Overlay {
                    color: [247, 176, 153],
                    alpha: 0.3,
                }),
            },
        ),
        (
            FilterName::Perpetua,
            Preset {
                ops: &[],
                overlay: Some(Overlay {
                    color: [0, 91, 154],
                    alpha: 0.15,
                }),
            },
        ),
        (
            FilterName::Reyes,
            Preset {
                ops: &[Sepia(0.22), Brightness(1.1), Contrast(0.85), Saturate(0.75)],
                overlay: Some(Overlay {
                    color: [239, 205, 173],
                    alpha: 0.5,
                }),
            },
        ),
        (
            FilterName::Rise,
            Preset {
                ops: &[Brightness(1.05), Sepia(0.2), Contrast(0.9), Saturate(0.9)],
                overlay: Some(Overlay {
                    color: [236, 205, 169],
                    alpha: 0.15,
                }),
            },
        ),
        (
            FilterName::Slumber,
            Preset {
                ops: &[Saturate(0.66), Brightness(1.05)],
                overlay: Some(Overlay {
                    color: [69, 41, 12],
                    alpha: 0.4,
                }),
            },
        ),
        (
            FilterName::Stinson,
            Preset {
                ops: &[Contrast(0.75), Saturate(0.85), Brightness(1.15)],
                overlay: Some(Overlay {
                    color: [240, 149, 128],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Toaster,
            Preset {
                ops: &[Contrast(1.5), Brightness(0.9)],
                overlay: Some(Overlay {
                    color: [128, 78, 15],
                    alpha: 0.3,
                }),
            },
        ),
        (
            FilterName::Valencia,
            Preset {
                ops: &[Contrast(1.08), Brightness(1.08), Sepia(0.08)],
                overlay: Some(Overlay {
                    color: [58, 3, 57],
                    alpha: 0.15,
                }),
            },
        ),
        (
            FilterName::Walden,
            Preset {
                ops: &[Brightness(1.1), HueRotate(-10.0), Sepia(0.3), Saturate(1.6)],
                overlay: Some(Overlay {
                    color: [0, 68, 204],
                    alpha: 0.15,
                }),
            },
        ),
        (
            FilterName::Willow,
            Preset {
                ops: &[Grayscale(0.5), Contrast(0.95), Brightness(0.9)],
                overlay: Some(Overlay {
                    color: [216, 205, 203],
                    alpha: 0.2,
                }),
            },
        ),
        (
            FilterName::Xpro2,
            Preset {
                ops: &[Sepia(0.3)],
                overlay: Some(Overlay {
                    color: [230, 231, 224],
                    alpha: 0.2,
                }),
            },
        ),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb(color))
    }

    #[test]
    fn identity_ops_keep_pixels() {
        let preset = Preset {
            ops: &[Op::Contrast(1.0), Op::Brightness(1.0), Op::Saturate(1.0), Op::HueRotate(0.0)],
            overlay: None,
        };
        let image = solid([10, 120, 240]);
        assert_eq!(preset.apply(&image), image);
    }

    #[test]
    fn grayscale_equalises_channels() {
        let preset = Preset {
            ops: &[Op::Grayscale(1.0)],
            overlay: None,
        };
        let out = preset.apply(&solid([200, 40, 90]));
        let Rgb([r, g, b]) = *out.get_pixel(0, 0);
        assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
    }

    #[test]
    fn brightness_clamps_at_white() {
        let preset = Preset {
            ops: &[Op::Brightness(3.0)],
            overlay: None,
        };
        let out = preset.apply(&solid([200, 200, 200]));
        assert_eq!(*out.get_pixel(1, 1), Rgb([255, 255, 255]));
    }

    #[test]
    fn full_overlay_replaces_colour() {
        let preset = Preset {
            ops: &[],
            overlay: Some(Overlay {
                color: [1, 2, 3],
                alpha: 1.0,
            }),
        };
        let out = preset.apply(&solid([90, 90, 90]));
        assert_eq!(*out.get_pixel(0, 0), Rgb([1, 2, 3]));
    }

    #[test]
    fn output_keeps_dimensions() {
        let image = RgbImage::new(7, 3);
        for (_, preset) in PRESETS.iter() {
            let out = preset.apply(&image);
            assert_eq!(out.dimensions(), (7, 3));
        }
    }
}
