/// Parts for PowerPoint presentation documents.
///
/// This module contains wrapper types for different XML parts in a .pptx package,
/// following the structure of the python-pptx library.
pub mod chart;
pub mod presentation;
pub mod slide;

pub use chart::{ChartData, ChartPart, ChartSeries, ChartType};
pub use presentation::{PresentationPart, SlideId};
pub use slide::{BaseSlidePart, SlideLayoutPart, SlideMasterPart, SlidePart};
