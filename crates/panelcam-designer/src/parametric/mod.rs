//! # Parametric Switch Parts
//!
//! Sleeves, sliders, covers and diffusers for illuminated push-button switches,
//! plus the 8x8 PCB connector switch. Every builder returns a [`Part`](crate::Part).

pub mod switch;
pub mod switch8x8;

pub use switch::{
    diffuser_panel, DiffuserOptions, LedgeSides, PanelLayout, SliderOptions, SlotValues,
    SwitchGeometry,
};
pub use switch8x8::Switch8x8;
