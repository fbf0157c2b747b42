pub mod adjudicate;
pub mod aggregate;
pub mod dates;
pub mod document;
pub mod extract;
pub mod parse;
pub mod rasterize;
pub mod schema;

pub use adjudicate::AdjudicationEngine;
pub use document::DocumentPipeline;
pub use extract::PageExtractor;
pub use rasterize::{PdfRasterizer, Rasterizer};
