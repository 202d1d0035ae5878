use ratatui::layout::Rect;
use tokio::sync::mpsc;

use crate::backend::BackendClient;
use crate::config::Config;
use crate::dispatch::{ChatTarget, Dispatcher, Outcome};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub target: ChatTarget,

    pub session: Session,
    pub dispatcher: Dispatcher,

    // Chat view state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // File path prompt state
    pub show_file_prompt: bool,
    pub file_input: String,

    // Chat area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Shown in the header
    pub backend_label: String,
    pub user_label: String,
}

impl App {
    pub fn new(config: &Config, tx: mpsc::UnboundedSender<Outcome>) -> Self {
        let client = BackendClient::new(config.backend_url(), config.user_id());

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            target: ChatTarget::Chat,

            session: Session::new(),
            dispatcher: Dispatcher::new(client, tx),

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,

            show_file_prompt: false,
            file_input: String::new(),

            chat_area: None,

            backend_label: config.backend_url().to_string(),
            user_label: config.user_id().to_string(),
        }
    }

    pub fn send_current_draft(&mut self) {
        if self.dispatcher.send_message(&mut self.session, self.target) {
            self.scroll_to_bottom();
        }
    }

    pub fn upload_selected_file(&mut self) {
        self.dispatcher.upload_document(&mut self.session);
    }

    pub fn toggle_target(&mut self) {
        self.target = self.target.toggled();
    }

    /// Fold a dispatch outcome into the session and keep the latest
    /// entries in view.
    pub fn apply_outcome(&mut self, outcome: Outcome) {
        let is_reply = matches!(outcome, Outcome::Reply(_));
        self.session.apply(outcome);
        if is_reply {
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.pending_replies() > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat log scrolling
    pub fn scroll_down(&mut self) {
        let max_scroll = self.transcript_line_count().saturating_sub(self.chat_height);
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half_page = self.chat_height / 2;
        let max_scroll = self.transcript_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = (self.chat_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_half_page_up(&mut self) {
        let half_page = self.chat_height / 2;
        self.chat_scroll = self.chat_scroll.saturating_sub(half_page);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.transcript_line_count();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Rendered line count of the chat log, mirroring how the chat area
    /// wraps messages.
    fn transcript_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.transcript.snapshot() {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                // Char count, not byte length, so multibyte text wraps right
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.session.pending_replies() > 0 {
            total_lines += 2; // "Assistant:" + "Thinking..."
        }

        total_lines
    }

    /// True while any reply is awaited; drives the thinking indicator.
    pub fn is_waiting(&self) -> bool {
        self.session.pending_replies() > 0
    }
}
