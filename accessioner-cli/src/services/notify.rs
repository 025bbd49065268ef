//! End-of-run status notification
//!
//! One message per configured recipient. Delivery is delegated to an
//! external command (e.g. `sendmail -t`) that reads the message on stdin;
//! without one the message is only logged. Notification problems never fail
//! the run.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

const BOUNDARY: &str = "accessioner-status-boundary";

/// Receives the outcome of a run
pub trait Notifier {
    fn notify(&self, success: bool);
}

/// Where and how status messages go
#[derive(Debug, Clone, Default)]
pub struct NotificationSettings {
    pub sender: Option<String>,
    pub sender_password: Option<String>,
    pub recipients: Vec<String>,
    pub command: Option<String>,
    /// Attached to failure messages when present
    pub error_log: Option<PathBuf>,
}

pub struct StatusNotifier {
    settings: NotificationSettings,
}

pub fn success_message() -> &'static str {
    "ArchivesSpace update complete. Output spreadsheet stored on network drive."
}

pub fn failure_message() -> &'static str {
    "ArchivesSpace update failed. See attached logs for details."
}

impl StatusNotifier {
    pub fn new(settings: NotificationSettings) -> Self {
        Self { settings }
    }

    pub fn subject() -> String {
        format!(
            "DASS ArchivesSpace update status {}",
            chrono::Local::now().format("%Y-%m-%d")
        )
    }

    /// Full message for one recipient, with the error log attached on failure
    pub fn compose(&self, success: bool, recipient: &str) -> String {
        let sender = self.settings.sender.as_deref().unwrap_or("accessioner");
        let body = if success {
            success_message()
        } else {
            failure_message()
        };
        let attachment = if success {
            None
        } else {
            self.settings
                .error_log
                .as_ref()
                .and_then(|path| std::fs::read_to_string(path).ok())
        };

        let mut message = format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n",
            sender,
            recipient,
            Self::subject()
        );

        match attachment {
            None => {
                message.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
                message.push_str(body);
                message.push_str("\r\n");
            }
            Some(log) => {
                message.push_str(&format!(
                    "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
                    BOUNDARY
                ));
                message.push_str(&format!(
                    "--{}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
                    BOUNDARY, body
                ));
                message.push_str(&format!(
                    "--{}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Disposition: attachment; filename=\"log.log\"\r\n\r\n{}\r\n",
                    BOUNDARY, log
                ));
                message.push_str(&format!("--{}--\r\n", BOUNDARY));
            }
        }

        message
    }

    fn deliver(&self, command: &str, message: &str) -> std::io::Result<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .env(
                "STATUS_EMAIL_PASSWORD",
                self.settings.sender_password.as_deref().unwrap_or_default(),
            )
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes())?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(std::io::Error::other(format!(
                "notification command exited with {}",
                status
            )));
        }
        Ok(())
    }
}

impl Notifier for StatusNotifier {
    fn notify(&self, success: bool) {
        if self.settings.recipients.is_empty() {
            log::debug!("No notification recipients configured");
            return;
        }

        for recipient in &self.settings.recipients {
            let message = self.compose(success, recipient);
            match &self.settings.command {
                Some(command) => match self.deliver(command, &message) {
                    Ok(()) => log::info!("Status notification sent to {}", recipient),
                    Err(e) => log::error!("Failed to notify {}: {}", recipient, e),
                },
                None => log::info!(
                    "Status for {} (no notification command configured): {}",
                    recipient,
                    if success {
                        success_message()
                    } else {
                        failure_message()
                    }
                ),
            }
        }
    }
}
