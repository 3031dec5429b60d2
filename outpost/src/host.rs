//! Collaborator interface toward the hosting runtime.
//!
//! The worker never talks to pages or the notification system directly. It
//! asks a [`Host`] to claim clients, show notifications and manage windows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use smol_str::SmolStr;
use url::Url;

/// Data attached to a push notification.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// When the push message arrived.
    pub date_of_arrival: DateTime<Utc>,
    /// Sequence number of the notification, starting at 1.
    pub primary_key: u64,
}

/// A notification to display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    /// Title line.
    pub title: String,
    /// Text of the push payload.
    pub body: String,
    /// Icon path.
    pub icon: String,
    /// Badge path.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// Data handed back on click.
    pub data: NotificationData,
}

/// An open window controlled by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    /// Host-assigned client id.
    pub id: SmolStr,
    /// Current URL of the window.
    pub url: Url,
    /// Whether the window can be focused.
    pub focusable: bool,
}

/// What a notification click resulted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An open window on the root page was focused.
    Focused(SmolStr),
    /// A new window was opened on the root page.
    Opened(Url),
}

/// Operations the worker requests from its host.
#[async_trait]
pub trait Host: Send + Sync {
    /// Takes control of every open page without a reload.
    async fn claim_clients(&self);

    /// Displays a notification.
    async fn show_notification(&self, notification: Notification);

    /// Lists open window clients, including uncontrolled ones.
    async fn window_clients(&self) -> Vec<WindowClient>;

    /// Focuses a window. Returns `false` if the host refused.
    async fn focus(&self, client: &WindowClient) -> bool;

    /// Opens a new window on `url`.
    async fn open_window(&self, url: &Url);
}

/// Host that does nothing. Useful when the runtime has no pages or
/// notification surface, e.g. in tests and command line tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHost;

#[async_trait]
impl Host for NoopHost {
    async fn claim_clients(&self) {}

    async fn show_notification(&self, _notification: Notification) {}

    async fn window_clients(&self) -> Vec<WindowClient> {
        Vec::new()
    }

    async fn focus(&self, _client: &WindowClient) -> bool {
        false
    }

    async fn open_window(&self, _url: &Url) {}
}

#[async_trait]
impl<T> Host for std::sync::Arc<T>
where
    T: Host + ?Sized,
{
    async fn claim_clients(&self) {
        (**self).claim_clients().await
    }

    async fn show_notification(&self, notification: Notification) {
        (**self).show_notification(notification).await
    }

    async fn window_clients(&self) -> Vec<WindowClient> {
        (**self).window_clients().await
    }

    async fn focus(&self, client: &WindowClient) -> bool {
        (**self).focus(client).await
    }

    async fn open_window(&self, url: &Url) {
        (**self).open_window(url).await
    }
}
