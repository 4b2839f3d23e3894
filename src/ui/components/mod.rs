mod confirmation_popup;
mod form;
mod help_popup;
mod menu;
mod status_bar;
mod viewer;

pub use confirmation_popup::ConfirmationPopup;
pub use form::Form;
pub use help_popup::HelpPopup;
pub use menu::Menu;
pub use status_bar::StatusBar;
pub use viewer::Viewer;
