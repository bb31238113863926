pub mod builder;
pub mod lights;
pub mod shapes;
pub mod vertex;

pub use builder::{build_scene, BuiltScene, PropSet, SceneRanges};
pub use lights::{LightRig, KEY_LIGHT, LIGHT_COUNT};
pub use vertex::SceneVertex;
