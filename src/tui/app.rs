//! TUI Application - screen wiring and the terminal loop

use std::io::{self, Stdout};
use std::sync::Arc;

use crossterm::{
    event::EventStream,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{decode_event, Input};
use super::screens::{LoginScreen, MainScreen, PasswordScreen, RenderContext, Screen, WelcomeScreen};
use super::state::{ScreenId, Shell};
use super::theme::{icons, ConsoleTheme};
use crate::config::Config;
use crate::element::LabelStyle;
use crate::node::{Backend, ControllerView, Credentials, NodeController, NodeHandle};
use crate::router::{ActionReceiver, Router};

/// All screens plus the pieces they share
#[derive(Clone)]
struct Screens {
    welcome: WelcomeScreen,
    password: PasswordScreen,
    login: LoginScreen,
    main: MainScreen,
}

impl Screens {
    fn current<'a>(&'a self, shell: &Shell) -> &'a dyn Screen {
        match shell.current() {
            ScreenId::Welcome => &self.welcome,
            ScreenId::Password => &self.password,
            ScreenId::Login => &self.login,
            ScreenId::Main => &self.main,
        }
    }
}

pub struct ConsoleApp {
    config: Arc<Config>,
    theme: ConsoleTheme,
    shell: Shell,
    screens: Screens,
    actions: ActionReceiver,
    cancel: CancellationToken,
    frame: usize,
}

impl ConsoleApp {
    /// Build every screen, start the node controller and connect the signals.
    /// Must be called inside a tokio runtime.
    pub fn new(config: Config, backend: Backend) -> Self {
        let config = Arc::new(config);
        let cancel = CancellationToken::new();
        let router = Router::with_capacity(config.timings.router_capacity);
        let actions = router.rx();

        let view = ControllerView::new(&router, &cancel, config.timings.progress_tick());
        let shell = Shell::new(Arc::clone(&view.status), cancel.clone());

        let (controller, node) = NodeController::new(
            router.clone(),
            Arc::clone(&backend.connector),
            view.clone(),
            config.timings.controller(),
            &cancel,
        );
        controller.spawn();

        let screens = Screens {
            welcome: WelcomeScreen::new(&router, config.accounts.keys().copied().collect()),
            password: PasswordScreen::new(&router),
            login: LoginScreen::new(&router, Arc::clone(&backend.keystore), shell.clone()),
            main: MainScreen::new(&router, view, node.clone()),
        };

        wire(&screens, &shell, &router, &config, &backend, &node);

        Self {
            config,
            theme: ConsoleTheme::new(),
            shell,
            screens,
            actions,
            cancel,
            frame: 0,
        }
    }

    /// Run the console until the user quits
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        info!(node = %self.config.node, "console started");

        let result = self.main_loop(&mut terminal).await;

        self.cancel.cancel();
        restore_terminal(&mut terminal)?;
        info!("console stopped");
        result
    }

    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = time::interval(self.config.timings.progress_tick());

        loop {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = self.cancel.cancelled() => break,

                action = self.actions.recv() => match action {
                    Some(action) => {
                        action();
                        self.actions.run_pending();
                    }
                    None => break,
                },

                _ = ticker.tick() => {
                    self.frame = self.frame.wrapping_add(1);
                }

                event = events.next() => match event {
                    Some(Ok(event)) => match decode_event(event) {
                        Input::Quit => self.shell.quit(),
                        Input::Key(key) => self.screens.current(&self.shell).handle_key(key),
                        Input::Redraw | Input::None => {}
                    },
                    Some(Err(e)) => {
                        warn!(error = %e, "terminal event stream failed");
                        return Err(e.into());
                    }
                    None => break,
                },
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(8),    // Screen
                Constraint::Length(1), // Status
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        let ctx = RenderContext {
            theme: &self.theme,
            frame: self.frame,
        };
        self.screens.current(&self.shell).render(frame, chunks[1], &ctx);

        self.render_status(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled(
                format!("{} WORKER CONSOLE v{}", icons::ACCOUNT, env!("CARGO_PKG_VERSION")),
                self.theme.header(),
            ),
            Span::raw("  │  "),
            Span::styled(self.shell.current().title(), self.theme.accent()),
            Span::raw("  │  "),
            Span::styled(format!("{} {}", icons::NODE, self.config.node), self.theme.text()),
        ]);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(false));
        frame.render_widget(Paragraph::new(header).block(block), area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = self.shell.status();
        let line = Line::from(Span::styled(
            format!(" {}", status.text()),
            self.theme.label(status.style()),
        ));
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let help = self.screens.current(&self.shell).help();
        frame.render_widget(
            Paragraph::new(Line::styled(format!(" {help}"), self.theme.dimmed())),
            area,
        );
    }
}

/// Connect screen signals to navigation and the node controller
fn wire(
    screens: &Screens,
    shell: &Shell,
    router: &Router,
    config: &Arc<Config>,
    backend: &Backend,
    node: &NodeHandle,
) {
    let start_session = {
        let screens = screens.clone();
        let shell = shell.clone();
        let node = node.clone();
        let endpoint = config.node.clone();
        Arc::new(move |credentials: Credentials| {
            info!(account = %credentials.address, "session started");
            node.connect(endpoint.clone(), credentials);
            shell.clear_status();
            screens.main.reset();
            shell.switch_to(ScreenId::Main);
        })
    };

    let back_to_welcome = {
        let screens = screens.clone();
        let shell = shell.clone();
        move |_: ()| {
            shell.clear_status();
            screens.welcome.reset();
            shell.switch_to(ScreenId::Welcome);
        }
    };

    {
        let target = screens.clone();
        let shell = shell.clone();
        screens.welcome.on_login.connect(move |address| {
            target.password.set_account(address);
            target.password.reset();
            shell.switch_to(ScreenId::Password);
        });
    }
    {
        let target = screens.clone();
        let shell = shell.clone();
        screens.welcome.on_login_other.connect(move |_| {
            target.login.reset();
            shell.switch_to(ScreenId::Login);
        });
    }

    {
        let password = screens.password.clone();
        let shell = shell.clone();
        let router = router.clone();
        let config = Arc::clone(config);
        let keystore = Arc::clone(&backend.keystore);
        let start_session = Arc::clone(&start_session);
        screens.password.on_submit.connect(move |passphrase: String| {
            let Some(account) = password.account() else {
                return;
            };
            let path = match config.keystore_for(&account) {
                Ok(path) => path.to_path_buf(),
                Err(e) => {
                    shell.set_status(e.to_string(), LabelStyle::Error);
                    return;
                }
            };

            shell.set_status("Unlocking...", LabelStyle::Normal);
            let keystore = Arc::clone(&keystore);
            let router = router.clone();
            let shell = shell.clone();
            let start_session = Arc::clone(&start_session);
            tokio::spawn(async move {
                let result = keystore.unlock(&path, account, &passphrase).await;
                let delivered = router
                    .execute(move || match result {
                        Ok(credentials) => start_session(credentials),
                        Err(e) => shell.set_status(e.to_string(), LabelStyle::Error),
                    })
                    .await;
                if delivered.is_err() {
                    debug!("console closed before unlock finished");
                }
            });
        });
    }

    screens.password.on_cancel.connect(back_to_welcome.clone());
    screens.login.on_cancel.connect(back_to_welcome);
    screens
        .login
        .on_unlocked
        .connect(move |credentials| start_session(credentials));

    let shell = shell.clone();
    screens.main.on_exit.connect(move |_| shell.quit());
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
