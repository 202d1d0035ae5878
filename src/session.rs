use std::path::PathBuf;

use crate::composer::Composer;
use crate::dispatch::Outcome;
use crate::transcript::{ChatMessage, Transcript};

/// All conversational state for one user sitting at one conversation.
///
/// The session is the only owner of the transcript and composer. Both the
/// input handler and outcome application run on the main loop task, so every
/// append lands on the transcript as it currently stands; in-flight requests
/// never hold a copy of it.
pub struct Session {
    pub transcript: Transcript,
    pub composer: Composer,
    notice: Option<String>,
    pending_replies: usize,
    pending_uploads: usize,
}

impl Session {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::new(),
            composer: Composer::new(),
            notice: None,
            pending_replies: 0,
            pending_uploads: 0,
        }
    }

    /// Synchronous half of a chat/ask dispatch: on an empty or
    /// whitespace-only draft this is a silent no-op; otherwise the user
    /// entry is appended, the draft cleared, and the message to send is
    /// returned. The request itself is the caller's job.
    pub fn begin_message(&mut self) -> Option<String> {
        let message = self.composer.take_message()?;
        self.transcript.append(ChatMessage::user(message.clone()));
        self.pending_replies += 1;
        Some(message)
    }

    /// Synchronous half of an upload dispatch. With no file selected this
    /// raises an advisory notice and performs no request.
    pub fn begin_upload(&mut self) -> Option<PathBuf> {
        match self.composer.selected_file() {
            Some(path) => {
                self.pending_uploads += 1;
                Some(path.to_path_buf())
            }
            None => {
                self.notice = Some("Select a file first".to_string());
                None
            }
        }
    }

    /// Fold a resolved dispatch back into the session. Replies append to
    /// the transcript in arrival order; upload results surface as a notice.
    /// Failures are reported, never swallowed.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Reply(Ok(reply)) => {
                self.pending_replies = self.pending_replies.saturating_sub(1);
                self.transcript.append(ChatMessage::assistant(reply));
            }
            Outcome::Reply(Err(err)) => {
                self.pending_replies = self.pending_replies.saturating_sub(1);
                tracing::warn!("chat request failed: {err:#}");
                self.transcript
                    .append(ChatMessage::assistant(format!("Error: {err:#}")));
            }
            Outcome::Upload(Ok(message)) => {
                self.pending_uploads = self.pending_uploads.saturating_sub(1);
                self.notice = Some(message);
            }
            Outcome::Upload(Err(err)) => {
                self.pending_uploads = self.pending_uploads.saturating_sub(1);
                tracing::warn!("upload failed: {err:#}");
                self.notice = Some(format!("Upload failed: {err:#}"));
            }
        }
    }

    /// Replies currently awaited; drives the thinking indicator.
    pub fn pending_replies(&self) -> usize {
        self.pending_replies
    }

    pub fn is_uploading(&self) -> bool {
        self.pending_uploads > 0
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::ChatRole;
    use anyhow::anyhow;

    #[test]
    fn test_empty_draft_is_a_silent_noop() {
        let mut session = Session::new();
        assert_eq!(session.begin_message(), None);

        session.composer.set_draft("   ");
        assert_eq!(session.begin_message(), None);

        assert!(session.transcript.is_empty());
        assert_eq!(session.pending_replies(), 0);
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn test_dispatch_appends_user_entry_and_clears_draft() {
        let mut session = Session::new();
        session.composer.set_draft("hello");

        assert_eq!(session.begin_message(), Some("hello".to_string()));
        assert_eq!(session.composer.draft(), "");
        assert_eq!(session.pending_replies(), 1);

        session.apply(Outcome::Reply(Ok("hi there".to_string())));

        let messages = session.transcript.snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("hello"));
        assert_eq!(messages[1], ChatMessage::assistant("hi there"));
        assert_eq!(session.pending_replies(), 0);
    }

    #[test]
    fn test_overlapping_dispatches_resolve_out_of_order() {
        let mut session = Session::new();

        session.composer.set_draft("first");
        assert!(session.begin_message().is_some());
        session.composer.set_draft("second");
        assert!(session.begin_message().is_some());
        assert_eq!(session.pending_replies(), 2);

        // The second request's reply arrives before the first's
        session.apply(Outcome::Reply(Ok("reply to second".to_string())));
        session.apply(Outcome::Reply(Ok("reply to first".to_string())));

        let messages = session.transcript.snapshot();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], ChatMessage::user("first"));
        assert_eq!(messages[1], ChatMessage::user("second"));
        assert_eq!(messages[2], ChatMessage::assistant("reply to second"));
        assert_eq!(messages[3], ChatMessage::assistant("reply to first"));
        assert_eq!(session.pending_replies(), 0);
    }

    #[test]
    fn test_failed_reply_is_surfaced_in_transcript() {
        let mut session = Session::new();
        session.composer.set_draft("hello");
        session.begin_message();

        session.apply(Outcome::Reply(Err(anyhow!("connection refused"))));

        let messages = session.transcript.snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, ChatRole::Assistant);
        assert!(messages[1].content.contains("connection refused"));
        assert_eq!(session.pending_replies(), 0);
    }

    #[test]
    fn test_upload_without_file_raises_advisory() {
        let mut session = Session::new();
        assert_eq!(session.begin_upload(), None);
        assert_eq!(session.notice(), Some("Select a file first"));
        assert!(session.transcript.is_empty());
        assert!(!session.is_uploading());
    }

    #[test]
    fn test_upload_acknowledgment_leaves_file_selected() {
        let mut session = Session::new();
        session.composer.set_file("/tmp/notes.txt");

        let path = session.begin_upload().expect("file is selected");
        assert_eq!(path, PathBuf::from("/tmp/notes.txt"));
        assert!(session.is_uploading());

        session.apply(Outcome::Upload(Ok("stored notes.txt".to_string())));
        assert_eq!(session.notice(), Some("stored notes.txt"));
        assert!(!session.is_uploading());

        // The selection survives the upload; re-uploading needs no re-pick
        assert!(session.composer.selected_file().is_some());
        // The transcript is untouched by uploads
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn test_upload_failure_is_acknowledged() {
        let mut session = Session::new();
        session.composer.set_file("/tmp/notes.txt");
        session.begin_upload();

        session.apply(Outcome::Upload(Err(anyhow!("disk on fire"))));
        let notice = session.notice().expect("failure is surfaced");
        assert!(notice.contains("Upload failed"));
        assert!(notice.contains("disk on fire"));

        session.dismiss_notice();
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn test_failure_does_not_affect_other_actions() {
        let mut session = Session::new();

        session.composer.set_draft("one");
        session.begin_message();
        session.composer.set_draft("two");
        session.begin_message();

        session.apply(Outcome::Reply(Err(anyhow!("timeout"))));
        session.apply(Outcome::Reply(Ok("answer to the other".to_string())));

        let messages = session.transcript.snapshot();
        assert_eq!(messages.len(), 4);
        assert!(messages[2].content.starts_with("Error:"));
        assert_eq!(messages[3], ChatMessage::assistant("answer to the other"));

        // The session stays usable
        session.composer.set_draft("three");
        assert!(session.begin_message().is_some());
    }
}
