//! Collaborators around the pipeline: console reporting and run notification

pub mod notify;
pub mod report;

pub use notify::{NotificationSettings, Notifier, StatusNotifier};
pub use report::{ConsoleReporter, Reporter, SilentReporter};
