pub mod subject_loader;

pub use subject_loader::{load_subjects, parse_subjects};
