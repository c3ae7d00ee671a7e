//! Login-other screen: open an arbitrary keystore directory
//!
//! The form grows as it is filled in, and its focus chain is rebuilt at each
//! step rather than edited:
//!
//! ```text
//! path not accepted   [path, cancel]
//! keystore opened     [path, account, cancel]
//! account accepted    [account, password, unlock, cancel, path]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::{debug, info};

use super::{notify, RenderContext, Screen};
use crate::address::Address;
use crate::config::directory_completions;
use crate::element::{Button, Entry, HintEntry, HintOutcome, Key, Label, LabelStyle};
use crate::error::Result;
use crate::focus::{self, FocusChain, FocusController, FocusHandle, Focusable};
use crate::node::{Credentials, Keystore};
use crate::router::{Router, Signal};
use crate::tui::state::Shell;
use crate::tui::widgets;

#[derive(Clone)]
pub struct LoginScreen {
    path_caption: Arc<Label>,
    path: Arc<HintEntry>,
    account_caption: Arc<Label>,
    account: Arc<HintEntry>,
    password_caption: Arc<Label>,
    password: Arc<Entry>,
    unlock: Arc<Button>,
    cancel: Arc<Button>,
    focus: Arc<Mutex<FocusController>>,

    /// Keystore directory and the accounts found in it
    opened: Arc<Mutex<Option<(PathBuf, Vec<Address>)>>>,
    keystore: Arc<dyn Keystore>,
    router: Router,
    shell: Shell,

    pub on_unlocked: Arc<Signal<Credentials>>,
    pub on_cancel: Arc<Signal<()>>,
}

impl LoginScreen {
    pub fn new(router: &Router, keystore: Arc<dyn Keystore>, shell: Shell) -> Self {
        let screen = Self {
            path_caption: Arc::new(Label::new("Keystore Path:")),
            path: Arc::new(HintEntry::new()),
            account_caption: Arc::new(Label::new("Account:")),
            account: Arc::new(HintEntry::new()),
            password_caption: Arc::new(Label::new("Password:")),
            password: Arc::new(Entry::password()),
            unlock: Arc::new(Button::new("[Unlock]")),
            cancel: Arc::new(Button::new("[Cancel]")),
            focus: Arc::new(Mutex::new(FocusController::default())),
            opened: Arc::new(Mutex::new(None)),
            keystore,
            router: router.clone(),
            shell,
            on_unlocked: Arc::new(router.new_signal()),
            on_cancel: Arc::new(router.new_signal()),
        };
        screen.reset();
        screen
    }

    /// Empty form, focus on the path field
    pub fn reset(&self) {
        self.focus.lock().blur();
        self.path.set_text("");
        self.account.set_text("");
        self.account.set_provider(None);
        self.password.set_text("");
        *self.opened.lock() = None;

        *self.focus.lock() = FocusController::new(self.path_chain());
        self.focus.lock().focus_default_widget();
        self.highlight();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Focus chains
    // ─────────────────────────────────────────────────────────────────────

    fn path_chain(&self) -> FocusChain {
        FocusChain::new(vec![focus::handle(&self.path), focus::handle(&self.cancel)])
    }

    fn account_chain(&self) -> FocusChain {
        FocusChain::new(vec![
            focus::handle(&self.path),
            focus::handle(&self.account),
            focus::handle(&self.cancel),
        ])
    }

    fn unlock_chain(&self) -> FocusChain {
        FocusChain::new(vec![
            focus::handle(&self.account),
            focus::handle(&self.password),
            focus::handle(&self.unlock),
            focus::handle(&self.cancel),
            focus::handle(&self.path),
        ])
    }

    /// Swap in a new controller, keeping focus where it is when possible
    fn rebuild(&self, chain: FocusChain) {
        let mut focus = self.focus.lock();
        let current: Option<FocusHandle> = focus.focused().cloned();
        let mut next = FocusController::new(chain);

        match current {
            Some(element) if element.is_focused() && next.focus_widget(&element) => {}
            Some(element) => {
                element.set_focused(false);
                next.focus_default_widget();
            }
            None => next.focus_default_widget(),
        }
        *focus = next;
    }

    /// Captions follow their field's focus
    fn highlight(&self) {
        let pairs: [(&Label, bool); 3] = [
            (&*self.path_caption, self.path.is_focused()),
            (&*self.account_caption, self.account.is_focused()),
            (&*self.password_caption, self.password.is_focused()),
        ];
        for (caption, focused) in pairs {
            let style = if focused {
                LabelStyle::Highlight
            } else {
                LabelStyle::Normal
            };
            caption.set_style(style);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Form steps
    // ─────────────────────────────────────────────────────────────────────

    fn open_keystore(&self, text: String) {
        if text.trim().is_empty() {
            self.shell.set_status("Enter a keystore directory", LabelStyle::Warn);
            return;
        }

        let path = PathBuf::from(text);
        let keystore = Arc::clone(&self.keystore);
        let router = self.router.clone();
        let this = self.clone();
        tokio::spawn(async move {
            let result = keystore.accounts(&path).await;
            if router
                .execute(move || this.keystore_opened(path, result))
                .await
                .is_err()
            {
                debug!("console closed before keystore listing finished");
            }
        });
    }

    /// Tab on the path field. The directory scan hits the filesystem, so it
    /// runs on the blocking pool and the result re-enters through the router.
    fn complete_path(&self) {
        let text = self.path.text();
        let router = self.router.clone();
        let this = self.clone();
        tokio::spawn(async move {
            let query = text.clone();
            let candidates =
                match tokio::task::spawn_blocking(move || directory_completions(&query)).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        debug!(error = %e, "directory completion failed");
                        return;
                    }
                };
            if router
                .execute(move || this.path_completed(&text, candidates))
                .await
                .is_err()
            {
                debug!("console closed before directory completion finished");
            }
        });
    }

    fn path_completed(&self, requested: &str, candidates: Vec<String>) {
        if !self.path.is_focused() || self.path.text() != requested {
            debug!(requested, "stale directory completion dropped");
            return;
        }
        self.path.complete_with(candidates);
    }

    fn keystore_opened(&self, path: PathBuf, result: Result<Vec<Address>>) {
        let accounts = match result {
            Ok(accounts) => accounts,
            Err(e) => {
                self.shell.set_status(e.to_string(), LabelStyle::Error);
                return;
            }
        };
        if accounts.is_empty() {
            self.shell.set_status(
                format!("No keys found in {}", path.display()),
                LabelStyle::Warn,
            );
            return;
        }

        info!(path = %path.display(), count = accounts.len(), "keystore opened");
        let hex: Vec<String> = accounts.iter().map(Address::to_hex).collect();
        self.account.set_provider(Some(Arc::new(move |text: &str| {
            let text = text.to_lowercase();
            hex.iter()
                .filter(|h| h.starts_with(&text))
                .cloned()
                .collect()
        })));
        *self.opened.lock() = Some((path, accounts));
        self.shell.clear_status();

        self.rebuild(self.account_chain());
        if self.path.is_focused() {
            self.focus.lock().focus_next_widget();
        }
        // Runs as a router action, outside handle_key
        self.highlight();
    }

    fn accept_account(&self, text: String) {
        let address = match text.parse::<Address>() {
            Ok(address) => address,
            Err(e) => {
                self.shell.set_status(e.to_string(), LabelStyle::Error);
                return;
            }
        };
        let known = self
            .opened
            .lock()
            .as_ref()
            .is_some_and(|(_, accounts)| accounts.contains(&address));
        if !known {
            self.shell.set_status(
                format!("{address} is not in this keystore"),
                LabelStyle::Error,
            );
            return;
        }

        self.shell.clear_status();
        self.rebuild(self.unlock_chain());
        if self.account.is_focused() {
            self.focus.lock().focus_next_widget();
        }
    }

    fn unlock(&self) {
        let Some((path, _)) = self.opened.lock().clone() else {
            return;
        };
        let account = match self.account.text().parse::<Address>() {
            Ok(account) => account,
            Err(e) => {
                self.shell.set_status(e.to_string(), LabelStyle::Error);
                return;
            }
        };
        let passphrase = self.password.text();

        self.shell.set_status("Unlocking...", LabelStyle::Normal);
        let keystore = Arc::clone(&self.keystore);
        let router = self.router.clone();
        let this = self.clone();
        tokio::spawn(async move {
            let result = keystore.unlock(&path, account, &passphrase).await;
            let delivered = router
                .execute(move || match result {
                    Ok(credentials) => {
                        this.password.set_text("");
                        this.shell.clear_status();
                        notify(&this.on_unlocked, credentials, "login.unlocked");
                    }
                    Err(e) => this.shell.set_status(e.to_string(), LabelStyle::Error),
                })
                .await;
            if delivered.is_err() {
                debug!("console closed before unlock finished");
            }
        });
    }

    /// Keys a hint field did not use
    fn navigate(&self, key: Key) {
        match key {
            Key::Down => self.focus.lock().focus_next_widget(),
            Key::BackTab | Key::Up => self.focus.lock().focus_prev_widget(),
            Key::Esc => notify(&self.on_cancel, (), "login.cancel"),
            _ => {}
        }
    }
}

impl Screen for LoginScreen {
    fn handle_key(&self, key: Key) {
        if self.path.is_focused() && key == Key::Tab && !self.path.is_choosing() {
            self.complete_path();
        } else if self.path.is_focused() {
            match self.path.handle_key(&key) {
                HintOutcome::Submitted(text) => self.open_keystore(text),
                HintOutcome::Consumed => {}
                HintOutcome::Ignored => self.navigate(key),
            }
        } else if self.account.is_focused() {
            match self.account.handle_key(&key) {
                HintOutcome::Submitted(text) => self.accept_account(text),
                HintOutcome::Consumed => {}
                HintOutcome::Ignored => self.navigate(key),
            }
        } else {
            match key {
                Key::Tab | Key::Down => self.focus.lock().focus_next_widget(),
                Key::BackTab | Key::Up => self.focus.lock().focus_prev_widget(),
                Key::Esc => notify(&self.on_cancel, (), "login.cancel"),
                Key::Char(ch) if self.password.is_focused() => self.password.insert(ch),
                Key::Backspace if self.password.is_focused() => self.password.backspace(),
                Key::Enter if self.password.is_focused() => self.focus.lock().focus_next_widget(),
                Key::Enter if self.unlock.is_focused() => self.unlock(),
                Key::Enter if self.cancel.is_focused() => {
                    notify(&self.on_cancel, (), "login.cancel")
                }
                _ => {}
            }
        }
        self.highlight();
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext<'_>) {
        let theme = ctx.theme;
        let mut lines = widgets::hint_lines(theme, &self.path_caption, &self.path);
        if self.opened.lock().is_some() {
            lines.extend(widgets::hint_lines(theme, &self.account_caption, &self.account));
            lines.push(widgets::entry_line(theme, &self.password_caption, &self.password));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            widgets::button_span(theme, &self.unlock),
            Span::raw("  "),
            widgets::button_span(theme, &self.cancel),
        ]));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(true))
            .title(" OPEN KEYSTORE ");
        let rect = widgets::centered(area, 72, lines.len() as u16 + 2);
        frame.render_widget(Paragraph::new(lines).block(block), rect);
    }

    fn help(&self) -> &'static str {
        "[Tab] complete/next  [Shift+Tab] back  [Enter] accept  [Esc] cancel"
    }
}
