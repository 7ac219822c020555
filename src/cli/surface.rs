//! Notifications rendered to the terminal

use crate::error::SwResult;
use crate::ui::{self, UiContext};
use crate::worker::{Notification, NotificationSurface};
use async_trait::async_trait;

/// Shows notifications as notes and "opens" windows by printing the URL
pub struct ConsoleSurface {
    ctx: UiContext,
}

impl ConsoleSurface {
    pub fn new(ctx: UiContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl NotificationSurface for ConsoleSurface {
    async fn show(&self, notification: &Notification) -> SwResult<()> {
        ui::note(&self.ctx, &notification.title, &notification.body);
        let actions: Vec<String> = notification
            .actions
            .iter()
            .map(|a| format!("{} ({})", a.title, a.action))
            .collect();
        ui::remark(&self.ctx, &format!("actions: {}", actions.join(", ")));
        ui::remark(&self.ctx, &format!("tag: {}", notification.tag));
        Ok(())
    }

    async fn close(&self, tag: &str) -> SwResult<()> {
        ui::remark(&self.ctx, &format!("closed notification {}", tag));
        Ok(())
    }

    async fn open_window(&self, url: &str) -> SwResult<()> {
        ui::step_ok(&self.ctx, &format!("Opened {}", url));
        Ok(())
    }
}
