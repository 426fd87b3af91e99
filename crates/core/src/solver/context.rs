//! Host context for solver construction
//!
//! The host tells the solver how large the viewport is and what class of
//! device it runs on. Mobile and low-power devices get half-precision
//! storage, matching the half-float render targets they fall back to.

use super::fields::StoragePrecision;
use serde::{Deserialize, Serialize};

/// Class of device the effect runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Desktop or laptop with full-precision float targets
    #[default]
    Desktop,
    /// Phone, tablet or other low-power device
    Mobile,
}

impl DeviceClass {
    /// Storage precision used by default on this device class
    pub const fn storage_precision(self) -> StoragePrecision {
        match self {
            Self::Desktop => StoragePrecision::Full,
            Self::Mobile => StoragePrecision::Half,
        }
    }
}

/// Viewport size in pixels, each dimension at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Create a viewport, clamping zero dimensions to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Everything the host supplies besides `SimulationConfig`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverContext {
    /// Current viewport
    pub viewport: Viewport,
    /// Device class, selects default storage precision
    pub device: DeviceClass,
}

impl SolverContext {
    /// Context for a desktop viewport
    pub fn desktop(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            device: DeviceClass::Desktop,
        }
    }

    /// Context for a mobile viewport
    pub fn mobile(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            device: DeviceClass::Mobile,
        }
    }

    /// Precision to use, honoring an explicit override
    pub fn resolve_precision(&self, requested: Option<StoragePrecision>) -> StoragePrecision {
        requested.unwrap_or_else(|| self.device.storage_precision())
    }
}
