//! Robot device model: components, hit-test bounds, and texture classes.
use serde::{Deserialize, Serialize};

use crate::constants::{
    CLEANING_RATE_DELICATE_GLASS, CLEANING_RATE_SMOOTH_METAL, CLEANING_RATE_TEXTURED_PLASTIC,
};

/// A repairable part of the simulated robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    PowerCore,
    ChassisPlating,
    SensorArray,
    WheelAssembly,
    CircuitBoard,
    Antenna,
}

impl ComponentKind {
    /// Fixed surface class used to derive cleaning rates.
    #[must_use]
    pub const fn texture(self) -> Texture {
        match self {
            Self::ChassisPlating | Self::WheelAssembly | Self::Antenna => Texture::SmoothMetal,
            Self::PowerCore => Texture::TexturedPlastic,
            Self::SensorArray | Self::CircuitBoard => Texture::DelicateGlass,
        }
    }

    /// Display label used in generated problem descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerCore => "power core",
            Self::ChassisPlating => "chassis plating",
            Self::SensorArray => "sensor array",
            Self::WheelAssembly => "wheel assembly",
            Self::CircuitBoard => "circuit board",
            Self::Antenna => "antenna",
        }
    }
}

/// Surface class of a component; fixes the cleaning-progress rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Texture {
    SmoothMetal,
    TexturedPlastic,
    DelicateGlass,
}

impl Texture {
    /// Cleaning progress points per second at severity 1.
    #[must_use]
    pub const fn cleaning_rate_per_sec(self) -> f32 {
        match self {
            Self::SmoothMetal => CLEANING_RATE_SMOOTH_METAL,
            Self::TexturedPlastic => CLEANING_RATE_TEXTURED_PLASTIC,
            Self::DelicateGlass => CLEANING_RATE_DELICATE_GLASS,
        }
    }
}

/// Axis-aligned bounds in screen-independent layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// One placed component on a device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceComponent {
    pub kind: ComponentKind,
    pub bounds: Rect,
}

/// Component inventory of the robot under repair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    pub components: Vec<DeviceComponent>,
}

impl Device {
    #[must_use]
    pub fn new(name: impl Into<String>, components: Vec<DeviceComponent>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Demo robot used by fixtures and tests: a vertical stack of components
    /// in 100x100-unit tiles.
    #[must_use]
    pub fn trainer_bot() -> Self {
        let kinds = [
            ComponentKind::PowerCore,
            ComponentKind::ChassisPlating,
            ComponentKind::SensorArray,
            ComponentKind::WheelAssembly,
            ComponentKind::CircuitBoard,
            ComponentKind::Antenna,
        ];
        let components = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| DeviceComponent {
                kind: *kind,
                bounds: Rect::new(0.0, i as f32 * 100.0, 100.0, 100.0),
            })
            .collect();
        Self::new("trainer-bot", components)
    }

    #[must_use]
    pub fn component_at(&self, px: f32, py: f32) -> Option<&DeviceComponent> {
        self.components.iter().find(|c| c.bounds.contains(px, py))
    }

    #[must_use]
    pub fn bounds_of(&self, kind: ComponentKind) -> Option<Rect> {
        self.components
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.bounds)
    }

    #[must_use]
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind == kind)
    }
}
