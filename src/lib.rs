//! Head-gesture word selection: tilt or bow to pick one of three words,
//! open the mouth to email the sentence.

pub mod assistant;
pub mod config;
pub mod error;
pub mod gesture;
pub mod landmarks;
pub mod notify;
pub mod rotator;
pub mod selection;
pub mod session;
pub mod suggest;
pub mod words;

#[cfg(feature = "vision")]
pub mod camera;
#[cfg(feature = "vision")]
pub mod driver;
#[cfg(feature = "vision")]
pub mod inference;
#[cfg(feature = "vision")]
pub mod overlay;

pub use assistant::{Assistant, FrameOutcome, Policy};
pub use config::Config;
pub use gesture::{classify, Direction, GestureState, GestureThresholds};
pub use landmarks::{FaceLandmarks, LandmarkExtractor, Point};
pub use session::{Session, SharedSession};
pub use words::{DisplayedTriple, Slot, WordList};
