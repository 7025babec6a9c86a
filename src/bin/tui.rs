use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use futures::{SinkExt, StreamExt};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use todo_sync::domain::{message::{ClientMessage, ServerMessage}, todo::Todo};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("TODO_SYNC_URL").unwrap_or_else(|_| "ws://127.0.0.1:3000/todos".to_string());
    let (socket, _) = connect_async(url.as_str()).await.with_context(|| format!("connecting to {url}"))?;
    let (mut write, mut read) = socket.split();

    // Server frames -> UI
    let (updates_tx, updates) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(Ok(frame)) = read.next().await {
            let Message::Text(text) = frame else { continue };
            if let Ok(ServerMessage::AllTodos { todos }) = serde_json::from_str(&text) {
                if updates_tx.send(Update::Todos(todos)).is_err() { return; }
            }
        }
        let _ = updates_tx.send(Update::Disconnected);
    });

    // UI -> server
    let (outbox, mut outgoing) = mpsc::unbounded_channel::<ClientMessage>();
    tokio::spawn(async move {
        while let Some(message) = outgoing.recv().await {
            let Ok(json) = serde_json::to_string(&message) else { continue };
            if write.send(Message::Text(json)).await.is_err() { break; }
        }
        let _ = write.close().await;
    });

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, url, updates, outbox);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

enum Update { Todos(Vec<Todo>), Disconnected }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create }

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter { All, Pending, Done }

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveField { Name, Description }

struct App {
    url: String,
    outbox: UnboundedSender<ClientMessage>,
    items: Vec<Todo>,
    connected: bool,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    field: ActiveField,
    draft_name: String,
    draft_desc: String,
}

impl App {
    fn apply(&mut self, update: Update) {
        match update {
            Update::Todos(todos) => self.items = todos,
            Update::Disconnected => self.connected = false,
        }
        self.recompute_filtered();
    }

    fn send(&self, message: ClientMessage) {
        // The writer task only goes away after the connection dropped; the footer already says so.
        let _ = self.outbox.send(message);
    }

    fn selected_todo(&self) -> Option<&Todo> {
        self.filtered_indices.get(self.selected).and_then(|&idx| self.items.get(idx))
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices.clear();
        for (i, t) in self.items.iter().enumerate() {
            let include = match self.filter {
                Filter::All => true,
                Filter::Pending => !t.is_completed,
                Filter::Done => t.is_completed,
            };
            if include { self.filtered_indices.push(i); }
        }
        // Clamp selection within filtered bounds
        let len = self.filtered_indices.len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn clear_drafts(&mut self) {
        self.mode = Mode::View;
        self.field = ActiveField::Name;
        self.draft_name.clear();
        self.draft_desc.clear();
    }
}

fn filter_label(filter: Filter) -> &'static str {
    match filter { Filter::All => "All", Filter::Pending => "Pending", Filter::Done => "Done" }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, url: String, mut updates: UnboundedReceiver<Update>, outbox: UnboundedSender<ClientMessage>) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App { url, outbox, items: vec![], connected: true, selected: 0, last_tick: Instant::now(), mode: Mode::View, list_state: ListState::default(), filter: Filter::All, filtered_indices: Vec::new(), field: ActiveField::Name, draft_name: String::new(), draft_desc: String::new() };

    loop {
        while let Ok(update) = updates.try_recv() { app.apply(update); }

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Todos (Enter: toggle, n: new, d: delete, f: filter, q: quit)  |  New: type name, Tab for description, Enter to send, Esc to cancel")
                .block(Block::default().borders(Borders::ALL).title("todo-sync"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.filtered_indices.iter().filter_map(|&idx| app.items.get(idx)).map(|t| {
                let mark = if t.is_completed { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, t.name))
            }).collect();
            if app.filtered_indices.is_empty() { app.list_state.select(None); } else { app.list_state.select(Some(app.selected)); }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", filter_label(app.filter))))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let detail = app.selected_todo()
                .map(|t| format!("Name:\n{}\n\nStatus: {}\n\nDescription:\n{}\n\nId: {}", t.name, if t.is_completed { "Done" } else { "Pending" }, t.description, t.id))
                .unwrap_or_default();
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match app.mode {
                Mode::View => format!("{} [{}]  |  Filter=[{}]", app.url, if app.connected { "connected" } else { "disconnected" }, filter_label(app.filter)),
                Mode::Create => format!("Create — {}: {}_  |  (Tab to switch, Enter to send, Esc to cancel)", match app.field { ActiveField::Name => "Name", ActiveField::Description => "Desc" }, match app.field { ActiveField::Name => &app.draft_name, ActiveField::Description => &app.draft_desc }),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create => "create" }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                        KeyCode::Down => { let len = app.filtered_indices.len(); if app.selected + 1 < len { app.selected += 1; } }
                        KeyCode::Enter => {
                            if let Some(todo) = app.selected_todo().cloned() {
                                app.send(ClientMessage::ToggleTodoCompletion { todo });
                            }
                        }
                        KeyCode::Char('n') => {
                            app.clear_drafts();
                            app.mode = Mode::Create;
                        }
                        KeyCode::Char('d') => {
                            if let Some(todo) = app.selected_todo().cloned() {
                                app.send(ClientMessage::RemoveTodo { todo });
                                if app.selected > 0 { app.selected -= 1; }
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = match app.filter { Filter::All => Filter::Pending, Filter::Pending => Filter::Done, Filter::Done => Filter::All };
                            app.recompute_filtered();
                        }
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => app.clear_drafts(),
                        KeyCode::Enter => {
                            let name = app.draft_name.trim();
                            if !name.is_empty() {
                                app.send(ClientMessage::AddTodo { todo: Todo::new(name, app.draft_desc.trim()) });
                            }
                            app.clear_drafts();
                        }
                        KeyCode::Backspace => { match app.field { ActiveField::Name => { app.draft_name.pop(); }, ActiveField::Description => { app.draft_desc.pop(); } } }
                        KeyCode::Char(c) => { match app.field { ActiveField::Name => app.draft_name.push(c), ActiveField::Description => app.draft_desc.push(c) } }
                        KeyCode::Tab => { app.field = match app.field { ActiveField::Name => ActiveField::Description, ActiveField::Description => ActiveField::Name }; }
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}
