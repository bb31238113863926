/// Runtime feature toggles, read once at the start of each frame and applied
/// uniformly for that whole frame. Plain value, no hidden globals.
#[derive(Debug, Clone, Copy)]
pub struct ViewerSettings {
    pub normal_mapping: bool,
    pub fog: bool,
    pub shadows: bool,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            normal_mapping: true,
            fog: true,
            shadows: true,
        }
    }
}
