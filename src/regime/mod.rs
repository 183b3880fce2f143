// Structural regime detection module
pub mod classifier;
pub mod direction;
pub mod hierarchy;
pub mod transition;

pub use classifier::RegimeClassifier;
pub use direction::{DirectionResolver, ShortPressure};
pub use hierarchy::{HierarchyResolution, HierarchyResolver, HierarchySource, TimeframeRead};
pub use transition::{RegimeTransition, TransitionDetector};
