pub mod content;
pub mod loaders;
pub mod schema;
pub mod subject;

pub use content::{BookDocument, ContentKind, GenerationRequest, PageFragment};
pub use loaders::{load_subjects, parse_subjects};
pub use schema::{FieldShape, FieldSpec, Schema};
pub use subject::{Level, SubjectRecord};
