//! 相机与灯光参数
//!
//! 渲染端读取这些参数，本库只负责校验和保存。

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// 仰角范围（度）
pub const THETA_RANGE: std::ops::RangeInclusive<f32> = 10.0..=80.0;

/// 方位角范围（度）
pub const PHI_RANGE: std::ops::RangeInclusive<f32> = 0.0..=360.0;

/// 球坐标位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
}

impl Orbit {
    pub const fn new(theta: f32, phi: f32, radius: f32) -> Self {
        Self { theta, phi, radius }
    }

    /// 校验后创建：10 ≤ θ ≤ 80，0 ≤ φ ≤ 360，r > 0
    pub fn checked(theta: f32, phi: f32, radius: f32) -> Result<Self, CommandError> {
        if !THETA_RANGE.contains(&theta) {
            return Err(CommandError::OutOfRange {
                what: "theta",
                value: theta,
            });
        }
        if !PHI_RANGE.contains(&phi) {
            return Err(CommandError::OutOfRange {
                what: "phi",
                value: phi,
            });
        }
        // NaN 也在这里被拒绝
        if !(radius > 0.0) {
            return Err(CommandError::OutOfRange {
                what: "radius",
                value: radius,
            });
        }
        Ok(Self::new(theta, phi, radius))
    }
}

impl std::fmt::Display for Orbit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "theta={} phi={} r={}", self.theta, self.phi, self.radius)
    }
}

/// 灯光强度校验：必须大于 0
pub fn checked_power(power: f32) -> Result<f32, CommandError> {
    if power > 0.0 {
        Ok(power)
    } else {
        Err(CommandError::OutOfRange {
            what: "power",
            value: power,
        })
    }
}

/// 视图参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub camera: Orbit,
    pub light: Orbit,
    pub light_power: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            camera: Orbit::new(1.0, 0.0, 40.0),
            light: Orbit::new(0.0, 0.0, 15.0),
            light_power: 200.0,
        }
    }
}
