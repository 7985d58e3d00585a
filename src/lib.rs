mod bounds;
pub mod codec;
mod config;
mod error;
mod merge;
mod object;
pub mod ply;
pub mod quat;
mod render_target;
pub mod selection;
mod session;
mod splat;
mod splat_set;
pub mod transform;

pub use bounds::*;
pub use codec::{SPLAT_RECORD_BYTES, SplatPod};
pub use config::*;
pub use error::*;
pub use merge::*;
pub use object::*;
pub use ply::{PlyFormat, PlyHeader};
pub use quat::Axis;
pub use render_target::*;
pub use selection::{SelectionVolume, VolumeShape, VolumeTester};
pub use session::*;
pub use splat::*;
pub use splat_set::*;
pub use transform::Transform;

pub use glam;
