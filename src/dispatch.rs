use anyhow::Result;
use tokio::sync::mpsc;

use crate::backend::BackendClient;
use crate::session::Session;

/// Which endpoint a composed message goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    Chat,
    AskDocument,
}

impl ChatTarget {
    pub fn toggled(self) -> Self {
        match self {
            ChatTarget::Chat => ChatTarget::AskDocument,
            ChatTarget::AskDocument => ChatTarget::Chat,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChatTarget::Chat => "Chat",
            ChatTarget::AskDocument => "Ask Doc",
        }
    }
}

/// The resolution of one dispatched action, delivered back to the main
/// loop over the outcome channel.
#[derive(Debug)]
pub enum Outcome {
    Reply(Result<String>),
    Upload(Result<String>),
}

/// Turns composed actions into outbound requests.
///
/// Each accepted action spawns one task that owns nothing but its request
/// data and a sender; the session is updated synchronously before the
/// request goes out and again when the outcome arrives on the main loop.
pub struct Dispatcher {
    client: BackendClient,
    tx: mpsc::UnboundedSender<Outcome>,
}

impl Dispatcher {
    pub fn new(client: BackendClient, tx: mpsc::UnboundedSender<Outcome>) -> Self {
        Self { client, tx }
    }

    /// Dispatch the composed draft to `target`. No-op on an empty draft.
    /// Returns whether a request actually went out.
    pub fn send_message(&self, session: &mut Session, target: ChatTarget) -> bool {
        let Some(message) = session.begin_message() else {
            return false;
        };
        tracing::debug!(endpoint = target.label(), "dispatching message");

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match target {
                ChatTarget::Chat => client.chat(&message).await,
                ChatTarget::AskDocument => client.ask_document(&message).await,
            };
            let _ = tx.send(Outcome::Reply(result));
        });
        true
    }

    /// Dispatch an upload of the selected file. Raises an advisory and
    /// performs no request when nothing is selected.
    pub fn upload_document(&self, session: &mut Session) -> bool {
        let Some(path) = session.begin_upload() else {
            return false;
        };
        tracing::debug!(path = %path.display(), "dispatching upload");

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.upload_document(&path).await;
            let _ = tx.send(Outcome::Upload(result));
        });
        true
    }
}
