//! Button-driven input for handheld units.
//!
//! A three-row menu (welcome, inbox, send) is mutated by a button-polling
//! role and drawn by a display role. Both go through [`Selection`], which
//! holds every read and every read-modify-write of the menu behind one lock.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::command::Command;
use crate::error::{Result, StationError};
use crate::pipeline::Shutdown;
use crate::queue::CommandSender;

/// Physical buttons on the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    /// Cycle to the next row.
    Mode,
    /// Increase the active row's value.
    Up,
    /// Decrease the active row's value.
    Down,
    /// Toggle the active row's armed flag; on the send row this sends.
    Ok,
}

/// Outcome of sampling the buttons once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPoll {
    Pressed(Button),
    Idle,
    /// No more input will ever arrive.
    Closed,
}

/// Debounced button input.
pub trait ButtonSource: Send {
    fn poll(&mut self) -> io::Result<ButtonPoll>;
}

/// Output surface for the menu.
pub trait Display: Send {
    fn draw(&mut self, screen: &Screen) -> io::Result<()>;
}

/// Menu rows, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    Welcome = 0,
    Inbox = 1,
    Send = 2,
}

impl Row {
    const ALL: [Row; 3] = [Row::Welcome, Row::Inbox, Row::Send];

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-row state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowState {
    pub active: bool,
    pub value: u8,
    pub armed: bool,
}

/// Last message shown in the inbox row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxEntry {
    pub source_id: u8,
    pub transmission_id: u16,
    pub text: String,
}

/// The whole menu. Only ever touched through [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    rows: [RowState; 3],
    selected: Row,
    max_value: u8,
    inbox: Option<InboxEntry>,
}

impl SelectionState {
    /// Start on the welcome row with values bounded to `0..=max_value`.
    pub fn new(max_value: u8) -> Self {
        let mut rows = [RowState::default(); 3];
        rows[Row::Welcome.index()].active = true;
        Self {
            rows,
            selected: Row::Welcome,
            max_value,
            inbox: None,
        }
    }

    pub fn selected(&self) -> Row {
        self.selected
    }

    pub fn row(&self, row: Row) -> RowState {
        self.rows[row.index()]
    }

    /// Apply one button press. Returns the command to send, if any.
    pub fn press(&mut self, button: Button) -> Option<Command> {
        let index = self.selected.index();
        match button {
            Button::Mode => {
                self.selected = Row::ALL[(index + 1) % Row::ALL.len()];
                for row in Row::ALL {
                    self.rows[row.index()].active = row == self.selected;
                }
                None
            }
            Button::Up => {
                let value = &mut self.rows[index].value;
                if *value < self.max_value {
                    *value += 1;
                }
                None
            }
            Button::Down => {
                let value = &mut self.rows[index].value;
                *value = value.saturating_sub(1);
                None
            }
            Button::Ok => {
                let row = &mut self.rows[index];
                row.armed = !row.armed;
                if self.selected == Row::Send && row.armed {
                    row.armed = false;
                    Some(Command::Predefined { msg_id: row.value })
                } else {
                    None
                }
            }
        }
    }

    /// What the display should show, given the outbound catalog.
    pub fn screen(&self, catalog: &Catalog) -> Screen {
        let row = self.row(self.selected);
        match self.selected {
            Row::Welcome => Screen::Welcome,
            Row::Inbox => Screen::Inbox {
                selected: row.value,
                armed: row.armed,
                last: self.inbox.clone(),
            },
            Row::Send => Screen::Send {
                msg_id: row.value,
                text: catalog.get(row.value),
                armed: row.armed,
            },
        }
    }
}

/// A rendered view of the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Inbox {
        selected: u8,
        armed: bool,
        last: Option<InboxEntry>,
    },
    Send {
        msg_id: u8,
        text: Option<&'static str>,
        armed: bool,
    },
}

impl Screen {
    /// Plain-text lines, heading first.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Screen::Welcome => vec!["WELCOME".to_string()],
            Screen::Inbox {
                selected,
                armed,
                last,
            } => {
                let mut lines = vec![
                    "INBOX".to_string(),
                    "SELECTED MSG:".to_string(),
                    selected.to_string(),
                ];
                if let Some(entry) = last {
                    lines.push(format!(
                        "#{} from {}: {}",
                        entry.transmission_id, entry.source_id, entry.text
                    ));
                }
                if *armed {
                    lines.push("OK Pressed...".to_string());
                }
                lines
            }
            Screen::Send {
                msg_id,
                text,
                armed,
            } => {
                let mut lines = vec![
                    "SEND".to_string(),
                    "SELECTED P_MSG:".to_string(),
                    format!("{} {}", u16::from(*msg_id) + 1, text.unwrap_or("")),
                ];
                if *armed {
                    lines.push("OK Pressed...".to_string());
                }
                lines
            }
        }
    }
}

/// Shared handle to the menu state.
#[derive(Debug, Clone)]
pub struct Selection {
    state: Arc<Mutex<SelectionState>>,
    catalog: &'static Catalog,
}

impl Selection {
    /// Menu over `catalog`; the send row's value ranges over its indices.
    pub fn new(catalog: &'static Catalog) -> Self {
        Self {
            state: Arc::new(Mutex::new(SelectionState::new(catalog.max_index()))),
            catalog,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SelectionState>> {
        self.state
            .lock()
            .map_err(|_| StationError::LockPoisoned("selection"))
    }

    /// Apply a button press atomically.
    pub fn press(&self, button: Button) -> Result<Option<Command>> {
        Ok(self.lock()?.press(button))
    }

    /// Snapshot the screen atomically.
    pub fn screen(&self) -> Result<Screen> {
        Ok(self.lock()?.screen(self.catalog))
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> Result<SelectionState> {
        Ok(self.lock()?.clone())
    }

    /// Record the latest received message for the inbox row.
    pub fn record_inbox(&self, entry: InboxEntry) -> Result<()> {
        self.lock()?.inbox = Some(entry);
        Ok(())
    }
}

/// Polls the buttons and feeds send requests into the command queue.
pub struct ButtonPoller {
    source: Box<dyn ButtonSource>,
    selection: Selection,
    queue: CommandSender,
    interval: Duration,
}

impl ButtonPoller {
    pub fn new(
        source: Box<dyn ButtonSource>,
        selection: Selection,
        queue: CommandSender,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            selection,
            queue,
            interval,
        }
    }

    /// Handle one press. The queue push happens after the lock is released,
    /// so a full queue never stalls the display.
    pub fn handle(&self, button: Button) -> Result<()> {
        let command = self.selection.press(button)?;
        debug!(?button, "button pressed");
        if let Some(command) = command {
            self.queue.push(command)?;
        }
        Ok(())
    }

    /// Poll until the source closes, the queue closes, or shutdown.
    pub fn run(mut self, shutdown: Shutdown) {
        while !shutdown.is_triggered() {
            match self.source.poll() {
                Ok(ButtonPoll::Pressed(button)) => match self.handle(button) {
                    Ok(()) => {}
                    Err(StationError::QueueClosed) => break,
                    Err(err) => warn!(error = %err, "button handling failed"),
                },
                Ok(ButtonPoll::Idle) => {}
                Ok(ButtonPoll::Closed) => {
                    debug!("button source closed");
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %err, "unreadable button input skipped");
                }
                Err(err) => {
                    warn!(error = %err, "button read failed");
                    break;
                }
            }
            thread::sleep(self.interval);
        }
    }
}

/// Redraws the display whenever the menu changes.
pub struct DisplayRenderer {
    display: Box<dyn Display>,
    selection: Selection,
    interval: Duration,
    last: Option<Screen>,
}

impl DisplayRenderer {
    pub fn new(display: Box<dyn Display>, selection: Selection, interval: Duration) -> Self {
        Self {
            display,
            selection,
            interval,
            last: None,
        }
    }

    /// Draw if the screen differs from the last one drawn.
    pub fn render_once(&mut self) -> Result<bool> {
        let screen = self.selection.screen()?;
        if self.last.as_ref() == Some(&screen) {
            return Ok(false);
        }
        if let Err(err) = self.display.draw(&screen) {
            warn!(error = %err, "display draw failed");
            return Ok(false);
        }
        self.last = Some(screen);
        Ok(true)
    }

    pub fn run(mut self, shutdown: Shutdown) {
        while !shutdown.is_triggered() {
            if let Err(err) = self.render_once() {
                warn!(error = %err, "render failed");
                break;
            }
            thread::sleep(self.interval);
        }
    }
}
