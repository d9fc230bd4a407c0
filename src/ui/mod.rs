//! egui rendering: the central chart stack and the surrounding panels.
//! All decisions about what to highlight come from [`crate::view`].

pub mod panels;
pub mod plot;
