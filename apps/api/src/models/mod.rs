pub mod analysis;
pub mod document;

pub use analysis::AnalysisResult;
pub use document::{Document, DocumentKind, SourceFormat};
