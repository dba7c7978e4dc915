use parking_lot::{Mutex as SyncMutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::constants::PANEL_BROADCAST_CAPACITY;
use crate::panel::{OutboundMessage, PanelView};

/// Sending half of a panel's message channel, handed to the relay.
///
/// Sending never waits: the channel is unbounded and there is no
/// acknowledgement from the panel.
#[derive(Debug, Clone)]
pub struct PanelSender {
    tx: mpsc::UnboundedSender<Arc<OutboundMessage>>,
}

impl PanelSender {
    /// Creates a sender together with the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Arc<OutboundMessage>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Pushes an update to the panel
    ///
    /// # Arguments
    /// * `message`: message to send
    pub fn emit(&self, message: OutboundMessage) {
        if self.tx.send(Arc::new(message)).is_err() {
            log::warn!("Panel is gone, dropping update");
        }
    }
}

/// One open chat panel.
pub struct Panel {
    id: String,
    sender: PanelSender,
    updates: broadcast::Sender<Arc<OutboundMessage>>,
    view: Arc<RwLock<PanelView>>,
    last_active: SyncMutex<Instant>,
}

impl Panel {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a sender for relays working on behalf of this panel.
    pub fn sender(&self) -> PanelSender {
        self.sender.clone()
    }

    /// Subscribes a viewer to the updates rendered from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<OutboundMessage>> {
        self.updates.subscribe()
    }

    /// Text currently shown in the output region.
    pub fn snapshot(&self) -> String {
        self.view.read().output().to_string()
    }

    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    /// No page is watching and nothing asked for the panel within `max_idle`.
    fn is_idle(&self, max_idle: Duration) -> bool {
        self.updates.receiver_count() == 0 && self.last_active.lock().elapsed() >= max_idle
    }
}

/// Drains a panel's channel in arrival order: each message is applied to
/// the view, then broadcast to the connected viewers.
fn spawn_renderer(
    panel_id: String,
    mut rx: mpsc::UnboundedReceiver<Arc<OutboundMessage>>,
    view: Arc<RwLock<PanelView>>,
    updates: broadcast::Sender<Arc<OutboundMessage>>,
) {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            #[cfg(debug_assertions)]
            log::debug!(
                "panel {}: rendering {} chars",
                panel_id,
                message.text().chars().count()
            );

            view.write().apply(&message);
            // Without viewers the update only lands in the view
            let _ = updates.send(message);
        }
        log::debug!("panel {}: renderer stopped", panel_id);
    });
}

/// Registry of the open panels, keyed by panel id
pub struct PanelChannels {
    panels: Arc<Mutex<HashMap<String, Arc<Panel>>>>,
}

impl PanelChannels {
    /// Create a new instance of PanelChannels
    pub fn new() -> Self {
        Self {
            panels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Opens a new panel with its own channel and renderer task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn create_panel(&self) -> Arc<Panel> {
        let id = uuid::Uuid::new_v4().to_string();
        let (sender, rx) = PanelSender::channel();
        let (updates, _) = broadcast::channel(PANEL_BROADCAST_CAPACITY);
        let view = Arc::new(RwLock::new(PanelView::new()));

        spawn_renderer(id.clone(), rx, view.clone(), updates.clone());

        let panel = Arc::new(Panel {
            id: id.clone(),
            sender,
            updates,
            view,
            last_active: SyncMutex::new(Instant::now()),
        });
        self.panels.lock().await.insert(id.clone(), panel.clone());
        log::info!("Panel {} opened", id);
        panel
    }

    /// Looks a panel up and marks it active.
    pub async fn get(&self, panel_id: &str) -> Option<Arc<Panel>> {
        let panel = self.panels.lock().await.get(panel_id).cloned();
        if let Some(panel) = &panel {
            panel.touch();
        }
        panel
    }

    /// Removes a panel. Relays still streaming into it finish undisturbed;
    /// the renderer stops once the last sender is gone.
    pub async fn dispose(&self, panel_id: &str) -> bool {
        let removed = self.panels.lock().await.remove(panel_id).is_some();
        if removed {
            log::info!("Panel {} disposed", panel_id);
        }
        removed
    }

    /// Drops the panels whose dispose beacon never arrived: no viewer is
    /// connected and the panel was not used within `max_idle`.
    ///
    /// # Returns
    /// The number of panels removed.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut panels = self.panels.lock().await;
        let before = panels.len();
        panels.retain(|id, panel| {
            let idle = panel.is_idle(max_idle);
            if idle {
                log::info!("Panel {} idle, disposing", id);
            }
            !idle
        });
        before - panels.len()
    }

    pub async fn len(&self) -> usize {
        self.panels.lock().await.len()
    }
}

impl Default for PanelChannels {
    fn default() -> Self {
        Self::new()
    }
}
