use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use orderdesk_core::actions::{AppAction, RuntimeAction, UserAction, KEY_HINTS};
use orderdesk_core::config::{UiConfig, UiTheme};
use orderdesk_core::reducer::{reduce, OrderEffect};
use orderdesk_core::state::{AppState, FeedStatus, LogLevel, NoticeLevel, Overlay};
use orderdesk_core::view::{detail_view, list_view, ListView, OrderRow};
use orderdesk_source::{
    spawn_fetch, spawn_submit, CancelToken, OrderSource, PollSchedule, WorkerEvent,
};

const LOG_STRIP_HEIGHT: u16 = 5;
const ERROR_BANNER_HEIGHT: u16 = 3;
const ROW_HEIGHT: u16 = 2;
const INPUT_POLL: Duration = Duration::from_millis(50);

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            crossterm::cursor::Show
        );
    }
}

pub fn run(
    mut state: AppState,
    source: Arc<dyn OrderSource>,
    poll: PollSchedule,
    ui_config: &UiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard; // Ensures terminal is restored on exit or panic

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App {
        source,
        poll,
        palette: palette_for(ui_config.theme),
        show_logs: ui_config.show_logs,
        list_state: ListState::default(),
        fetch_token: None,
        submit_token: None,
        dirty: true,
    };
    let result = run_app(&mut terminal, &mut state, &mut app);
    app.cancel_all();
    result.map_err(|e| e.into())
}

/// Host side of the loop: the source, outstanding cancellation tokens, and
/// widget state ratatui keeps across frames.
struct App {
    source: Arc<dyn OrderSource>,
    poll: PollSchedule,
    palette: UiPalette,
    show_logs: bool,
    list_state: ListState,
    fetch_token: Option<CancelToken>,
    /// The reducer allows one pending submit at a time.
    submit_token: Option<CancelToken>,
    dirty: bool,
}

impl App {
    fn dispatch(
        &mut self,
        state: &mut AppState,
        action: AppAction,
        tx: &mpsc::Sender<WorkerEvent>,
    ) {
        if let AppAction::Runtime(RuntimeAction::SubmitFinished { .. }) = &action {
            self.submit_token = None;
        }
        let effects = reduce(state, action);
        self.apply_effects(effects, tx);
    }

    fn apply_effects(&mut self, effects: Vec<OrderEffect>, tx: &mpsc::Sender<WorkerEvent>) {
        for effect in effects {
            match effect {
                OrderEffect::Render(_) => self.dirty = true,
                OrderEffect::StartFetch { fetch_id } => {
                    if let Some(previous) = self.fetch_token.take() {
                        previous.cancel();
                    }
                    let token = CancelToken::new();
                    self.fetch_token = Some(token.clone());
                    tracing::debug!(fetch_id, source = self.source.label(), "dispatching fetch");
                    spawn_fetch(Arc::clone(&self.source), fetch_id, token, tx.clone());
                }
                OrderEffect::SubmitOrder(order) => {
                    let token = CancelToken::new();
                    if let Some(previous) = self.submit_token.replace(token.clone()) {
                        previous.cancel();
                    }
                    tracing::info!(order_id = %order.id(), "dispatching submit");
                    spawn_submit(Arc::clone(&self.source), order, token, tx.clone());
                }
            }
        }
    }

    fn cancel_all(&mut self) {
        if let Some(token) = self.fetch_token.take() {
            token.cancel();
        }
        if let Some(token) = self.submit_token.take() {
            token.cancel();
        }
    }
}

fn worker_action(event: WorkerEvent) -> RuntimeAction {
    match event {
        WorkerEvent::Fetched { fetch_id, result } => match result {
            Ok(orders) => RuntimeAction::FetchSucceeded { fetch_id, orders },
            Err(err) => RuntimeAction::FetchFailed {
                fetch_id,
                message: err.to_string(),
            },
        },
        WorkerEvent::Submitted { order_id, outcome } => {
            RuntimeAction::SubmitFinished { order_id, outcome }
        }
    }
}

enum KeyHandlerResult {
    Continue(Option<UserAction>),
    Exit,
}

fn handle_key_event(key: event::KeyEvent, state: &AppState) -> KeyHandlerResult {
    if key.kind != KeyEventKind::Press {
        return KeyHandlerResult::Continue(None);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }

    if state.overlay == Overlay::Help {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                KeyHandlerResult::Continue(Some(UserAction::CloseOverlay))
            }
            _ => KeyHandlerResult::Continue(None),
        };
    }

    let action = match key.code {
        KeyCode::Char('q') => return KeyHandlerResult::Exit,
        KeyCode::Esc => UserAction::DismissNotice,
        KeyCode::Up | KeyCode::Char('k') => UserAction::SelectPrev,
        KeyCode::Down | KeyCode::Char('j') => UserAction::SelectNext,
        KeyCode::Char('a') => UserAction::SubmitSelected,
        KeyCode::Char('r') => UserAction::Refresh,
        KeyCode::Char('c') => UserAction::ClearLogs,
        KeyCode::Char('?') => UserAction::ToggleHelp,
        _ => return KeyHandlerResult::Continue(None),
    };
    KeyHandlerResult::Continue(Some(action))
}

fn handle_mouse_click(
    state: &AppState,
    app: &App,
    area: Rect,
    column: u16,
    row: u16,
) -> Option<UserAction> {
    let regions = layout_regions(area, app.show_logs);
    let list_area = list_rows_area(state, regions.list);
    if !contains(list_area, column, row) {
        return None;
    }
    let index = app.list_state.offset() + usize::from((row - list_area.y) / ROW_HEIGHT);
    state.orders().get(index).map(|order| UserAction::SelectOrder {
        id: order.id().to_string(),
    })
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    app: &mut App,
) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    app.dispatch(state, AppAction::User(UserAction::Refresh), &tx);

    loop {
        while let Ok(event) = rx.try_recv() {
            app.dispatch(state, AppAction::Runtime(worker_action(event)), &tx);
        }

        if app.poll.due(Instant::now()) {
            app.dispatch(state, AppAction::User(UserAction::Refresh), &tx);
        }

        if app.dirty {
            sync_list_selection(state, &mut app.list_state);
            terminal.draw(|f| ui(f, state, app))?;
            app.dirty = false;
        }

        let wait = app
            .poll
            .time_until_due(Instant::now())
            .map_or(INPUT_POLL, |until_due| until_due.min(INPUT_POLL));
        if !event::poll(wait)? {
            continue;
        }
        let action = match event::read()? {
            Event::Key(key) => match handle_key_event(key, state) {
                KeyHandlerResult::Continue(action) => action,
                KeyHandlerResult::Exit => return Ok(()),
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let size = terminal.size()?;
                    let area = Rect::new(0, 0, size.width, size.height);
                    handle_mouse_click(state, app, area, mouse.column, mouse.row)
                }
                _ => None,
            },
            Event::Resize(_, _) => {
                app.dirty = true;
                None
            }
            _ => None,
        };
        if let Some(action) = action {
            app.dispatch(state, AppAction::User(action), &tx);
        }
    }
}

fn sync_list_selection(state: &AppState, list_state: &mut ListState) {
    let index = state
        .selection
        .selected_order
        .as_deref()
        .and_then(|id| state.book.position(id));
    list_state.select(index);
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

fn palette_for(theme: UiTheme) -> UiPalette {
    match theme {
        UiTheme::Classic => UiPalette {
            accent: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            muted: Color::DarkGray,
            border: Color::Gray,
            selected_bg: Color::DarkGray,
        },
        UiTheme::Contrast => UiPalette {
            accent: Color::White,
            success: Color::LightGreen,
            warning: Color::LightYellow,
            danger: Color::LightRed,
            muted: Color::Gray,
            border: Color::White,
            selected_bg: Color::Blue,
        },
    }
}

struct Regions {
    header: Rect,
    list: Rect,
    detail: Rect,
    status: Rect,
    logs: Option<Rect>,
}

fn layout_regions(area: Rect, show_logs: bool) -> Regions {
    let log_height = if show_logs { LOG_STRIP_HEIGHT } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(log_height),
        ])
        .split(area);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    Regions {
        header: rows[0],
        list: body[0],
        detail: body[1],
        status: rows[2],
        logs: show_logs.then_some(rows[3]),
    }
}

/// Inner area of the list pane that holds order rows.
fn list_rows_area(state: &AppState, list: Rect) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(list);
    if matches!(state.feed, FeedStatus::Failed { .. }) {
        let banner = ERROR_BANNER_HEIGHT.min(inner.height);
        Rect::new(inner.x, inner.y + banner, inner.width, inner.height - banner)
    } else {
        inner
    }
}

fn ui(f: &mut ratatui::Frame, state: &AppState, app: &mut App) {
    let palette = app.palette;
    let regions = layout_regions(f.area(), app.show_logs);

    render_header(f, regions.header, state, palette);
    render_order_list(f, regions.list, state, palette, &mut app.list_state);
    render_order_detail(f, regions.detail, state, palette);
    render_status(f, regions.status, state, palette);
    if let Some(area) = regions.logs {
        render_logs(f, area, state, palette);
    }
    if state.overlay == Overlay::Help {
        render_help(f, palette);
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &AppState, palette: UiPalette) {
    let feed_style = match state.feed {
        FeedStatus::Ready => Style::default().fg(palette.success),
        FeedStatus::Loading => Style::default().fg(palette.warning),
        FeedStatus::Failed { .. } => Style::default().fg(palette.danger),
        FeedStatus::Idle => Style::default().fg(palette.muted),
    };
    let mut spans = vec![
        Span::styled(
            " orderdesk ",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("| {} | ", state.source_label),
            Style::default().fg(palette.muted),
        ),
        Span::styled(state.feed.label(), feed_style),
    ];
    if state.fetch_in_flight() && !state.book.is_empty() {
        spans.push(Span::styled(
            " (refreshing)",
            Style::default().fg(palette.muted),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn pane_block(title: &str, palette: UiPalette) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ))
}

fn order_list_item(row: &OrderRow, palette: UiPalette) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                row.id.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(row.customer_name.clone()),
        ]),
        Line::from(Span::styled(
            format!("  {}", row.meta),
            Style::default().fg(palette.muted),
        )),
    ])
}

fn render_order_list(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &AppState,
    palette: UiPalette,
    list_state: &mut ListState,
) {
    let block = pane_block("Orders", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let view = list_view(state);
    let rows = match &view {
        ListView::Loading => {
            f.render_widget(
                Paragraph::new("Loading orders...").style(Style::default().fg(palette.muted)),
                inner,
            );
            return;
        }
        ListView::Empty => {
            f.render_widget(
                Paragraph::new("No orders found.").style(Style::default().fg(palette.muted)),
                inner,
            );
            return;
        }
        ListView::Rows(rows) => rows,
        ListView::Failed { message, rows } => {
            let banner = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                ERROR_BANNER_HEIGHT.min(inner.height),
            );
            f.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(
                        "Failed to load orders.",
                        Style::default()
                            .fg(palette.danger)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        message.clone(),
                        Style::default().fg(palette.danger),
                    )),
                ])
                .wrap(Wrap { trim: true }),
                banner,
            );
            rows
        }
    };

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| order_list_item(row, palette))
        .collect();
    let list = List::new(items).highlight_style(
        Style::default()
            .bg(palette.selected_bg)
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(list, list_rows_area(state, area), list_state);
}

fn render_order_detail(f: &mut ratatui::Frame, area: Rect, state: &AppState, palette: UiPalette) {
    let block = pane_block("Order Details", palette);
    let Some(detail) = detail_view(state) else {
        f.render_widget(
            Paragraph::new("Select an order to view details")
                .style(Style::default().fg(palette.muted))
                .block(block),
            area,
        );
        return;
    };

    let muted = Style::default().fg(palette.muted);
    let mut lines = vec![
        Line::from(Span::styled(
            detail.id.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(detail.customer_name.clone()),
        Line::from(Span::styled(detail.placed_at.clone(), muted)),
        Line::from(""),
        Line::from(Span::styled(
            detail.items_heading.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    for item in &detail.items {
        lines.push(Line::from(vec![
            Span::styled(item.id.clone(), muted),
            Span::raw("  "),
            Span::raw(item.product_name.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", item.sku_label), muted),
            Span::raw(format!("   {}   ", item.price_line)),
            Span::styled(
                format!("${}", item.line_total),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", item.thumbnail),
            muted,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Total Amount: "),
        Span::styled(
            format!("${}", detail.total),
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("[a] {}", detail.action_label),
        Style::default().fg(palette.accent),
    )));

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_status(f: &mut ratatui::Frame, area: Rect, state: &AppState, palette: UiPalette) {
    let line = match &state.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => palette.accent,
                NoticeLevel::Success => palette.success,
                NoticeLevel::Error => palette.danger,
            };
            Line::from(Span::styled(
                format!(" {}", notice.message),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            " ↑/↓ select  a add to order  r refresh  c clear log  ? help  q quit",
            Style::default().fg(palette.muted),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_logs(f: &mut ratatui::Frame, area: Rect, state: &AppState, palette: UiPalette) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(" Log ", Style::default().fg(palette.muted)));
    if state.logs.is_empty() {
        let empty = Span::styled(" No log entries", Style::default().fg(palette.muted));
        f.render_widget(Paragraph::new(Line::from(empty)).block(block), area);
        return;
    }
    let visible = usize::from(block.inner(area).height);
    let mut lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => palette.danger,
                LogLevel::Warn => palette.warning,
                LogLevel::Info => palette.border,
                LogLevel::Debug | LogLevel::Trace => palette.muted,
            };
            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.time_label()),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(
                    format!("{:>5} ", entry.level.label()),
                    Style::default().fg(color),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    lines.reverse();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(f: &mut ratatui::Frame, palette: UiPalette) {
    let area = centered_rect(50, 50, f.area());
    let lines: Vec<Line> = KEY_HINTS
        .iter()
        .map(|hint| {
            Line::from(vec![
                Span::styled(
                    format!("{:>12}  ", hint.keys),
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(hint.label),
            ])
        })
        .collect();
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines).block(pane_block("Keys", palette)),
        area,
    );
}

fn centered_rect(
    percent_x: u16,
    percent_y: u16,
    r: ratatui::layout::Rect,
) -> ratatui::layout::Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
