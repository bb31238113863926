use glam::Vec3;

/// Number of scene lights. Shadow-target allocation and the shader-side
/// uniform arrays are sized to this; it is a compile-time constant, not a
/// runtime collection.
pub const LIGHT_COUNT: usize = 3;

/// Index of the key light, the only one movable at runtime.
pub const KEY_LIGHT: usize = 0;

/// The three alley lights. Positions and colors are parallel arrays; only
/// `positions[KEY_LIGHT]` mutates between frames.
#[derive(Debug, Clone, Copy)]
pub struct LightRig {
    pub positions: [Vec3; LIGHT_COUNT],
    pub colors: [Vec3; LIGHT_COUNT],
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            positions: [
                Vec3::new(-1.5, -4.7, 0.3),
                Vec3::new(2.0, 0.5, 2.9),
                Vec3::new(0.0, 2.5, 4.1),
            ],
            colors: [
                Vec3::new(0.15, 1.20, 1.20),
                Vec3::new(1.20, 0.15, 1.10),
                Vec3::new(0.25, 1.20, 0.35),
            ],
        }
    }
}

impl LightRig {
    /// Translate the key light. Input handling maps keys to Y/Z steps of 0.2.
    pub fn nudge_key_light(&mut self, delta: Vec3) {
        self.positions[KEY_LIGHT] += delta;
    }
}
