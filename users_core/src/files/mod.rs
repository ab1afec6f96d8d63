pub mod source;
pub mod validation;

pub use source::{FetchedFile, FileSource, FileSourceError, HttpFileSource, DEFAULT_MEDIA_TYPE};
pub use validation::{is_pdf, ContentError, ContentValidator};
