//! Password screen for a configured account

use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{notify, RenderContext, Screen};
use crate::address::Address;
use crate::element::{Button, Entry, Key, Label, LabelStyle};
use crate::focus::{self, FocusChain, FocusController, Focusable};
use crate::router::{Router, Signal};
use crate::tui::widgets;

#[derive(Clone)]
pub struct PasswordScreen {
    account: Arc<Label>,
    target: Arc<Mutex<Option<Address>>>,
    caption: Arc<Label>,
    entry: Arc<Entry>,
    unlock: Arc<Button>,
    cancel: Arc<Button>,
    focus: Arc<Mutex<FocusController>>,

    /// Passphrase entered for [`PasswordScreen::account`]
    pub on_submit: Arc<Signal<String>>,
    pub on_cancel: Arc<Signal<()>>,
}

impl PasswordScreen {
    pub fn new(router: &Router) -> Self {
        let entry = Arc::new(Entry::password());
        let unlock = Arc::new(Button::new("[Unlock]"));
        let cancel = Arc::new(Button::new("[Cancel]"));
        let chain = FocusChain::new(vec![
            focus::handle(&entry),
            focus::handle(&unlock),
            focus::handle(&cancel),
        ]);

        Self {
            account: Arc::new(Label::styled("-", LabelStyle::Bold)),
            target: Arc::new(Mutex::new(None)),
            caption: Arc::new(Label::styled("Password:", LabelStyle::Highlight)),
            entry,
            unlock,
            cancel,
            focus: Arc::new(Mutex::new(FocusController::new(chain))),
            on_submit: Arc::new(router.new_signal()),
            on_cancel: Arc::new(router.new_signal()),
        }
    }

    pub fn set_account(&self, address: Address) {
        self.account.set_text(address.to_hex());
        *self.target.lock() = Some(address);
    }

    /// Account the passphrase is for
    pub fn account(&self) -> Option<Address> {
        *self.target.lock()
    }

    /// Clear the entry and focus it
    pub fn reset(&self) {
        self.entry.set_text("");
        self.focus.lock().focus_default_widget();
    }

    fn submit(&self) {
        notify(&self.on_submit, self.entry.text(), "password.submit");
    }
}

impl Screen for PasswordScreen {
    fn handle_key(&self, key: Key) {
        match key {
            Key::Tab | Key::Down => self.focus.lock().focus_next_widget(),
            Key::BackTab | Key::Up => self.focus.lock().focus_prev_widget(),
            Key::Esc => notify(&self.on_cancel, (), "password.cancel"),
            Key::Enter if self.cancel.is_focused() => {
                notify(&self.on_cancel, (), "password.cancel")
            }
            Key::Enter if self.entry.is_focused() || self.unlock.is_focused() => self.submit(),
            Key::Char(ch) if self.entry.is_focused() => self.entry.insert(ch),
            Key::Backspace if self.entry.is_focused() => self.entry.backspace(),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext<'_>) {
        let theme = ctx.theme;
        let lines = vec![
            widgets::label_line(theme, "Account", &self.account),
            Line::from(""),
            widgets::entry_line(theme, &self.caption, &self.entry),
            Line::from(""),
            Line::from(vec![
                widgets::button_span(theme, &self.unlock),
                Span::raw("  "),
                widgets::button_span(theme, &self.cancel),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(true))
            .title(" UNLOCK ACCOUNT ");
        let rect = widgets::centered(area, 64, lines.len() as u16 + 2);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }

    fn help(&self) -> &'static str {
        "[Tab] next  [Enter] unlock  [Esc] back  [Ctrl+C] quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> (PasswordScreen, crate::router::ActionReceiver) {
        let router = Router::new();
        let rx = router.rx();
        let screen = PasswordScreen::new(&router);
        screen.reset();
        (screen, rx)
    }

    #[test]
    fn test_enter_in_entry_submits_passphrase() {
        let (screen, mut rx) = screen();
        let got = Arc::new(Mutex::new(String::new()));
        {
            let got = got.clone();
            screen.on_submit.connect(move |p| *got.lock() = p);
        }

        for ch in "demo".chars() {
            screen.handle_key(Key::Char(ch));
        }
        screen.handle_key(Key::Enter);
        rx.run_pending();

        assert_eq!(*got.lock(), "demo");
        assert_eq!(screen.entry.display_text(), "****");
    }

    #[test]
    fn test_cancel_button_emits_cancel() {
        let (screen, mut rx) = screen();
        let cancelled = Arc::new(Mutex::new(false));
        {
            let cancelled = cancelled.clone();
            screen.on_cancel.connect(move |_| *cancelled.lock() = true);
        }

        screen.handle_key(Key::Tab);
        screen.handle_key(Key::Tab);
        assert!(screen.cancel.is_focused());
        screen.handle_key(Key::Char('x'));
        screen.handle_key(Key::Enter);
        rx.run_pending();

        assert!(*cancelled.lock());
        assert_eq!(screen.entry.text(), "", "typing off the entry is ignored");
    }

    #[test]
    fn test_reset_clears_and_refocuses() {
        let (screen, _rx) = screen();
        screen.set_account(Address::from([3u8; 20]));
        screen.handle_key(Key::Char('a'));
        screen.handle_key(Key::Tab);

        screen.reset();

        assert_eq!(screen.entry.text(), "");
        assert!(screen.entry.is_focused());
        assert!(!screen.unlock.is_focused());
        assert_eq!(screen.account(), Some(Address::from([3u8; 20])));
    }
}
