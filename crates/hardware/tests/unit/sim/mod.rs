/// Program file formats and format detection.
pub mod loader;
