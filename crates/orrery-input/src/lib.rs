//! Pointer input: window-normalised cursor offset for parallax, drag and
//! scroll deltas for the orbit camera.

pub mod pointer;

pub use pointer::PointerState;
