/// Rendering and input layer
///
/// - The gallery canvas: tiles, focused card and pointer handling (canvas.rs)
/// - The dossier face of a flipped card (dossier.rs)

pub mod canvas;
pub mod dossier;
