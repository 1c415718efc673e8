pub mod feedback_panel;
pub mod menu;
pub mod progress_bar;
pub mod question_card;
pub mod status_panel;
