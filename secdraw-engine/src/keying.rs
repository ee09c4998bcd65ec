use image::{Rgba, RgbaImage};
use secdraw_config::{BackgroundPolicy, CanvasConfig};

/// 命中背景色后的处理方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// alpha 置 0。
    #[default]
    Transparent,
    /// RGB 置 255，alpha 不变。
    OpaqueWhite,
}

impl From<BackgroundPolicy> for KeyPolicy {
    fn from(value: BackgroundPolicy) -> Self {
        match value {
            BackgroundPolicy::Transparent => KeyPolicy::Transparent,
            BackgroundPolicy::OpaqueWhite => KeyPolicy::OpaqueWhite,
        }
    }
}

/// 把接近中性灰/白的亮像素识别为背景。
#[derive(Debug, Clone, Copy)]
pub struct KeyFilter {
    threshold: u8,
    tolerance: u8,
    policy: KeyPolicy,
}

impl KeyFilter {
    pub fn new(threshold: u8, tolerance: u8, policy: KeyPolicy) -> Self {
        Self {
            threshold,
            tolerance,
            policy,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(
            config.background_threshold,
            config.background_tolerance,
            config.background_policy.into(),
        )
    }

    #[inline]
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// 三个通道两两之差都小于容差，且都高于亮度阈值；完全透明的像素不参与判断。
    pub fn is_background(&self, pixel: &Rgba<u8>) -> bool {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return false;
        }
        if r <= self.threshold || g <= self.threshold || b <= self.threshold {
            return false;
        }
        r.abs_diff(g) < self.tolerance
            && g.abs_diff(b) < self.tolerance
            && r.abs_diff(b) < self.tolerance
    }

    /// 原地处理整幅图，返回改写的像素数。
    pub fn apply(&self, image: &mut RgbaImage) -> usize {
        let mut changed = 0;
        for pixel in image.pixels_mut() {
            if !self.is_background(pixel) {
                continue;
            }
            match self.policy {
                KeyPolicy::Transparent => pixel.0[3] = 0,
                KeyPolicy::OpaqueWhite => {
                    if pixel.0[..3] == [255, 255, 255] {
                        continue;
                    }
                    pixel.0[0] = 255;
                    pixel.0[1] = 255;
                    pixel.0[2] = 255;
                }
            }
            changed += 1;
        }
        changed
    }
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::new(200, 10, KeyPolicy::default())
    }
}
