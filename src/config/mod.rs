mod settings;

pub use settings::{
    AccountSettings, AuditSettings, Command, Config, ReportSettings, Settings, SysinfoSettings,
    UiSettings,
};
