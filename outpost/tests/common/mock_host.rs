//! Recording host for integration tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use outpost::{Host, Notification, WindowClient};
use url::Url;

#[derive(Default)]
pub struct MockHost {
    claims: AtomicUsize,
    notifications: Mutex<Vec<Notification>>,
    windows: Mutex<Vec<WindowClient>>,
    focused: Mutex<Vec<String>>,
    opened: Mutex<Vec<Url>>,
    refuse_focus: bool,
}

impl MockHost {
    pub fn with_windows(windows: Vec<WindowClient>) -> Self {
        Self {
            windows: Mutex::new(windows),
            ..Self::default()
        }
    }

    pub fn refusing_focus(windows: Vec<WindowClient>) -> Self {
        Self {
            refuse_focus: true,
            ..Self::with_windows(windows)
        }
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn focused(&self) -> Vec<String> {
        self.focused.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for MockHost {
    async fn claim_clients(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }

    async fn show_notification(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    async fn window_clients(&self) -> Vec<WindowClient> {
        self.windows.lock().unwrap().clone()
    }

    async fn focus(&self, client: &WindowClient) -> bool {
        if self.refuse_focus {
            return false;
        }
        self.focused.lock().unwrap().push(client.id.to_string());
        true
    }

    async fn open_window(&self, url: &Url) {
        self.opened.lock().unwrap().push(url.clone());
    }
}
