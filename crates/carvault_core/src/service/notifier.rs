//! Notification boundary for the external mail collaborator.
//!
//! The write service hands exactly one `Notification` per successful create
//! to this trait, after the transaction has committed. Delivery itself
//! (SMTP, queueing, retries) lives outside this core.

use log::info;

/// Subject/body pair handed to the external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Outbound notification seam.
///
/// Implementations must not panic; a returned error is logged by the caller
/// and never affects the committed write.
pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), String>;
}

/// Default notifier that only records the event in the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> Result<(), String> {
        info!(
            "event=notification module=notifier status=ok subject={}",
            notification.subject
        );
        Ok(())
    }
}
