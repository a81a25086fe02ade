pub mod draft_loader;

pub use draft_loader::{load_all_draft_files, load_draft_file, CompositionDraft};
