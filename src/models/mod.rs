pub mod common;
pub mod single_track;
pub mod tractor_trailer;

pub use common::{Gear, MotionModel, VehicleState};
pub use single_track::SingleTrackModel;
pub use tractor_trailer::TractorTrailerModel;
