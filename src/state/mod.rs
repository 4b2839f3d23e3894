mod store;

pub use store::{
    AppState, ConfirmAction, ConfirmationState, FormField, FormKind, FormState, Screen,
    ViewerState, ACCOUNTS_MENU, MAIN_MENU, SYSINFO_MENU,
};
