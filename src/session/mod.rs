pub mod controller;
pub mod params;
pub mod question;
pub mod state;
