//! Value types for light control parameters.

mod color;
mod light_id;
mod power;
mod range;

pub use color::ColorCommand;
pub use light_id::LightId;
pub use power::PowerMode;
pub use range::EffectRange;
