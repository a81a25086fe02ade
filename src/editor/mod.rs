pub mod controller;
pub mod draft;

pub use controller::{ActiveEditorController, EditorTarget};
pub use draft::QuestionDraft;
