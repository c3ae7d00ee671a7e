//! Welcome screen: configured accounts and `[Login Other]`

use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{notify, RenderContext, Screen};
use crate::address::Address;
use crate::element::{Button, Key, List};
use crate::focus::{self, FocusChain, FocusController, Focusable};
use crate::router::{Router, Signal};
use crate::tui::widgets;

#[derive(Clone)]
pub struct WelcomeScreen {
    accounts: Arc<List>,
    addresses: Arc<Vec<Address>>,
    login_other: Arc<Button>,
    focus: Arc<Mutex<FocusController>>,

    /// A configured account was chosen
    pub on_login: Arc<Signal<Address>>,
    pub on_login_other: Arc<Signal<()>>,
}

impl WelcomeScreen {
    pub fn new(router: &Router, addresses: Vec<Address>) -> Self {
        let accounts = Arc::new(List::with_items(addresses.iter().map(Address::to_hex)));
        let login_other = Arc::new(Button::new("[Login Other]"));

        let mut chain = FocusChain::default();
        if !addresses.is_empty() {
            chain.push(focus::handle(&accounts));
        }
        chain.push(focus::handle(&login_other));

        let mut controller = FocusController::new(chain);
        controller.focus_default_widget();

        Self {
            accounts,
            addresses: Arc::new(addresses),
            login_other,
            focus: Arc::new(Mutex::new(controller)),
            on_login: Arc::new(router.new_signal()),
            on_login_other: Arc::new(router.new_signal()),
        }
    }

    pub fn reset(&self) {
        self.focus.lock().focus_default_widget();
    }

    fn activate(&self) {
        if self.accounts.is_focused() {
            let chosen = self
                .accounts
                .selected()
                .and_then(|i| self.addresses.get(i).copied());
            if let Some(address) = chosen {
                notify(&self.on_login, address, "welcome.login");
            }
        } else if self.login_other.is_focused() {
            notify(&self.on_login_other, (), "welcome.login_other");
        }
    }
}

impl Screen for WelcomeScreen {
    fn handle_key(&self, key: Key) {
        match key {
            Key::Tab => self.focus.lock().focus_next_widget(),
            Key::BackTab => self.focus.lock().focus_prev_widget(),
            Key::Up if self.accounts.is_focused() => self.accounts.select_prev(),
            Key::Down if self.accounts.is_focused() => self.accounts.select_next(),
            Key::Enter => self.activate(),
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext<'_>) {
        let theme = ctx.theme;
        let mut lines = vec![
            Line::styled("Select an account to unlock", theme.dimmed()),
            Line::from(""),
        ];
        if self.addresses.is_empty() {
            lines.push(Line::styled("  no accounts configured", theme.dimmed()));
        } else {
            lines.extend(widgets::list_lines(theme, &self.accounts));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(widgets::button_span(theme, &self.login_other)));

        let height = lines.len() as u16 + 2;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(true))
            .title(" ACCOUNTS ");
        let rect = widgets::centered(area, 56, height);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }

    fn help(&self) -> &'static str {
        "[Tab] next  [↑↓] select  [Enter] open  [Ctrl+C] quit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from([n; 20])
    }

    #[test]
    fn test_enter_on_account_emits_login() {
        let router = Router::new();
        let mut rx = router.rx();
        let screen = WelcomeScreen::new(&router, vec![addr(1), addr(2)]);
        let chosen = Arc::new(Mutex::new(None));
        {
            let chosen = chosen.clone();
            screen.on_login.connect(move |a| *chosen.lock() = Some(a));
        }

        screen.handle_key(Key::Down);
        screen.handle_key(Key::Enter);
        assert!(chosen.lock().is_none(), "delivered through the router");

        rx.run_pending();
        assert_eq!(*chosen.lock(), Some(addr(2)));
    }

    #[test]
    fn test_tab_reaches_login_other() {
        let router = Router::new();
        let mut rx = router.rx();
        let screen = WelcomeScreen::new(&router, vec![addr(1)]);
        let hits = Arc::new(Mutex::new(0));
        {
            let hits = hits.clone();
            screen.on_login_other.connect(move |_| *hits.lock() += 1);
        }

        screen.handle_key(Key::Tab);
        screen.handle_key(Key::Enter);
        rx.run_pending();
        assert_eq!(*hits.lock(), 1);

        screen.handle_key(Key::Tab);
        assert!(screen.accounts.is_focused(), "wraps back to the list");
    }

    #[test]
    fn test_without_accounts_button_is_default() {
        let router = Router::new();
        let _rx = router.rx();
        let screen = WelcomeScreen::new(&router, Vec::new());
        assert!(screen.login_other.is_focused());
        screen.handle_key(Key::Tab);
        assert!(screen.login_other.is_focused());
    }
}
