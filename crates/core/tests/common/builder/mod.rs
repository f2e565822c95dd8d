
/// Helpers for common network shapes.
pub mod network;
