//! Render-side collaborators of the viewer: camera placement, pointer
//! picking and the per-frame material synchronizer.

pub mod camera;
pub mod pick;
pub mod sync;

pub use camera::{AutoFrameController, CameraController, OrbitControls, OrbitInput};
pub use pick::{PickHit, Ray};
pub use sync::{MaterialSynchronizer, SyncStats};
