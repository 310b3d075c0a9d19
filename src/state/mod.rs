/// State management module
///
/// This module handles the gallery's content state:
/// - Shared data structures (data.rs)
/// - The collection store, tile layout and content loaders (library.rs)

pub mod library;
pub mod data;
