//! Main screen: connection summary, menu and the worker table

use std::sync::Arc;

use parking_lot::Mutex;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{notify, RenderContext, Screen};
use crate::element::{Key, List};
use crate::focus::{self, FocusChain, FocusController, Focusable};
use crate::node::{ConfirmationStatus, ControllerView, NodeHandle};
use crate::router::{Router, Signal};
use crate::tui::theme::icons;
use crate::tui::widgets::{self, utils};

const MENU_WORKERS: usize = 0;
const MENU_EXIT: usize = 1;

#[derive(Clone)]
pub struct MainScreen {
    view: ControllerView,
    menu: Arc<List>,
    focus: Arc<Mutex<FocusController>>,
    node: NodeHandle,

    pub on_exit: Arc<Signal<()>>,
}

impl MainScreen {
    pub fn new(router: &Router, view: ControllerView, node: NodeHandle) -> Self {
        let menu = Arc::new(List::with_items(["Workers", "Exit"]));
        let chain = FocusChain::new(vec![focus::handle(&menu), focus::handle(&view.workers)]);

        Self {
            view,
            menu,
            focus: Arc::new(Mutex::new(FocusController::new(chain))),
            node,
            on_exit: Arc::new(router.new_signal()),
        }
    }

    /// Focus the menu, first entry selected
    pub fn reset(&self) {
        self.focus.lock().focus_default_widget();
        self.menu.select(MENU_WORKERS);
    }

    fn open_menu_entry(&self) {
        match self.menu.selected() {
            Some(MENU_WORKERS) => {
                self.node.refresh_workers();
                self.focus_workers();
            }
            Some(MENU_EXIT) => notify(&self.on_exit, (), "main.exit"),
            _ => {}
        }
    }

    fn focus_workers(&self) {
        self.focus.lock().focus_next_widget();
        if self.view.workers.selected().is_none() {
            self.view.workers.select(0);
        }
    }

    fn confirm_selected(&self) {
        let Some(address) = self.view.workers.selected_address() else {
            return;
        };
        if self.view.workers.status_of(&address) == Some(ConfirmationStatus::Unconfirmed) {
            self.node.confirm_worker(address);
        }
    }

    fn summary_lines(&self, ctx: &RenderContext<'_>) -> Vec<Line<'static>> {
        let theme = ctx.theme;
        vec![
            widgets::async_label_line(theme, "Node", &self.view.node),
            widgets::async_label_line(theme, "Account", &self.view.account),
            widgets::async_label_line(theme, "Balance", &self.view.balance),
            widgets::async_label_line(theme, "Orders", &self.view.orders),
            widgets::async_label_line(theme, "Deals", &self.view.deals),
        ]
    }

    fn worker_lines(&self, ctx: &RenderContext<'_>, width: usize) -> Vec<Line<'static>> {
        let theme = ctx.theme;
        let records = self.view.workers.records();
        if records.is_empty() {
            return vec![Line::styled("  no workers", theme.dimmed())];
        }

        let selected = self.view.workers.selected();
        let focused = self.view.workers.is_focused();
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                let (marker, marker_style) = theme.confirmation(record.status, ctx.frame);
                let is_selected = selected == Some(i);
                let cursor = if is_selected && focused { icons::CURSOR } else { " " };
                let address_style = if is_selected && focused {
                    theme.focused()
                } else {
                    theme.text()
                };
                Line::from(vec![
                    Span::styled(format!("{cursor} "), theme.highlight()),
                    Span::styled(format!("{marker:<4}"), marker_style),
                    Span::styled(
                        utils::truncate(&record.address.to_hex(), width.saturating_sub(8)),
                        address_style,
                    ),
                ])
            })
            .collect()
    }
}

impl Screen for MainScreen {
    fn handle_key(&self, key: Key) {
        if self.menu.is_focused() {
            match key {
                Key::Up => self.menu.select_prev(),
                Key::Down => self.menu.select_next(),
                Key::Enter | Key::Right => self.open_menu_entry(),
                Key::Tab => self.focus_workers(),
                _ => {}
            }
        } else if self.view.workers.is_focused() {
            match key {
                Key::Up => self.view.workers.select_prev(),
                Key::Down => self.view.workers.select_next(),
                Key::Left | Key::Esc | Key::BackTab => self.focus.lock().focus_prev_widget(),
                Key::Tab => self.focus.lock().focus_next_widget(),
                Key::Char('c') => self.confirm_selected(),
                Key::Char('r') => self.node.refresh_workers(),
                _ => {}
            }
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &RenderContext<'_>) {
        let theme = ctx.theme;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(3)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(20)])
            .split(rows[1]);

        let summary = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(false))
            .title(format!(" {} SUMMARY ", icons::NODE));
        frame.render_widget(Paragraph::new(self.summary_lines(ctx)).block(summary), rows[0]);

        let menu = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(self.menu.is_focused()))
            .title(" MENU ");
        frame.render_widget(
            Paragraph::new(widgets::list_lines(theme, &self.menu)).block(menu),
            columns[0],
        );

        let table = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(self.view.workers.is_focused()))
            .title(format!(" WORKERS ({}) ", self.view.workers.len()));
        let width = columns[1].width.saturating_sub(2) as usize;
        frame.render_widget(
            Paragraph::new(self.worker_lines(ctx, width)).block(table),
            columns[1],
        );
    }

    fn help(&self) -> &'static str {
        if self.view.workers.is_focused() {
            "[↑↓] select  [c] confirm  [r] refresh  [←] menu  [Ctrl+C] quit"
        } else {
            "[↑↓] select  [Enter] open  [Tab] workers  [Ctrl+C] quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::node::{NodeEvent, WorkerRecord};
    use crate::router::ActionReceiver;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio_util::sync::CancellationToken;

    fn addr(n: u8) -> Address {
        Address::from([n; 20])
    }

    fn screen() -> (MainScreen, ActionReceiver, UnboundedReceiver<NodeEvent>) {
        let router = Router::new();
        let rx = router.rx();
        let view = ControllerView::new(
            &router,
            &CancellationToken::new(),
            crate::element::DEFAULT_TICK,
        );
        view.workers.set_records(vec![
            WorkerRecord {
                address: addr(1),
                status: ConfirmationStatus::Confirmed,
            },
            WorkerRecord {
                address: addr(2),
                status: ConfirmationStatus::Unconfirmed,
            },
        ]);
        let (node, events) = NodeHandle::detached();
        let screen = MainScreen::new(&router, view, node);
        screen.reset();
        (screen, rx, events)
    }

    #[tokio::test]
    async fn test_workers_entry_refreshes_and_focuses_table() {
        let (screen, _rx, mut events) = screen();
        screen.handle_key(Key::Enter);

        assert!(matches!(events.try_recv(), Ok(NodeEvent::RefreshWorkerList)));
        assert!(screen.view.workers.is_focused());
        assert_eq!(screen.view.workers.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_confirm_only_unconfirmed_rows() {
        let (screen, _rx, mut events) = screen();
        screen.handle_key(Key::Tab);

        screen.handle_key(Key::Char('c'));
        assert!(events.try_recv().is_err(), "row 0 is already confirmed");

        screen.handle_key(Key::Down);
        screen.handle_key(Key::Char('c'));
        match events.try_recv() {
            Ok(NodeEvent::ConfirmWorker(address)) => assert_eq!(address, addr(2)),
            other => panic!("expected ConfirmWorker, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exit_entry_emits_exit() {
        let (screen, mut rx, _events) = screen();
        let exited = Arc::new(Mutex::new(false));
        {
            let exited = exited.clone();
            screen.on_exit.connect(move |_| *exited.lock() = true);
        }

        screen.handle_key(Key::Down);
        screen.handle_key(Key::Enter);
        rx.run_pending();

        assert!(*exited.lock());
    }

    #[tokio::test]
    async fn test_left_returns_to_menu() {
        let (screen, _rx, _events) = screen();
        screen.handle_key(Key::Tab);
        assert!(screen.view.workers.is_focused());

        screen.handle_key(Key::Left);
        assert!(screen.menu.is_focused());
        assert!(!screen.view.workers.is_focused());
    }
}
