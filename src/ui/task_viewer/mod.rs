pub mod app;
pub mod editor;
pub mod view;

pub use app::{run, ViewerOptions};
