mod contour;
mod faded;
mod polaroid;
mod watershed;

pub use contour::ContourStrategy;
pub use faded::FadedStrategy;
pub use polaroid::PolaroidStrategy;
pub use watershed::WatershedStrategy;
