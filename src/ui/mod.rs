pub mod components;
pub mod entities;
pub mod layout;
pub mod line_input;
pub mod theme;
