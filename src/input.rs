use crate::debug::pager::LOG_ROWS;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;
use tracing::warn;

/// left-hand side of a qwerty keyboard, laid out like the COSMAC keypad
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// Things the user asks of the emulator and debugger, rather than of the
/// CHIP-8 program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Help,
    /// move the log cursor by this many lines
    Scroll(isize),
    LogHome,
    LogEnd,
    Reboot,
    TogglePause,
    Step,
    DumpMemory,
    Quit,
}

/// reads keypresses
pub trait Input {
    /// get a list of all the mapped keys that have been pressed recently,
    /// without flushing them from the buffer
    fn peek_keys(&mut self) -> Result<&[u8], io::Error>;

    /// flush all the keypresses from the buffer
    fn flush_keys(&mut self) -> Result<(), io::Error>;

    /// take every action requested since the last call, oldest first
    fn take_actions(&mut self) -> Result<Vec<Action>, io::Error>;
}

fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::F(1) => Action::Help,
        KeyCode::PageUp => Action::Scroll(-(LOG_ROWS as isize)),
        KeyCode::PageDown => Action::Scroll(LOG_ROWS as isize),
        KeyCode::Up => Action::Scroll(-1),
        KeyCode::Down => Action::Scroll(1),
        KeyCode::Home => Action::LogHome,
        KeyCode::End => Action::LogEnd,
        KeyCode::Backspace => Action::Reboot,
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::F(10) => Action::Step,
        KeyCode::F(11) => Action::DumpMemory,
        KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// simple implementation of Input, using STDIN
pub struct StdinInput {
    buffer: Vec<u8>,
    actions: VecDeque<Action>,
    keymap: HashMap<char, u8>,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            buffer: Vec::new(),
            actions: VecDeque::new(),
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            if let Event::Key(evt) = read()? {
                self.handle_key(evt);
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, evt: KeyEvent) {
        // raw mode swallows the signal, so ^C has to be handled here
        if evt.code == KeyCode::Char('c') && evt.modifiers.contains(KeyModifiers::CONTROL) {
            self.actions.push_back(Action::Quit);
            return;
        }
        if let Some(action) = action_for(evt.code) {
            self.actions.push_back(action);
            return;
        }
        match evt.code {
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.buffer.push(*mapped_key),
                None => warn!("can't map {:?} to a COSMAC key", key),
            },
            other => warn!("unknown key {:?}", other),
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        self.read_stdin()?;
        Ok(self.buffer.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.read_stdin()?;
        self.buffer.clear();
        Ok(())
    }

    fn take_actions(&mut self) -> Result<Vec<Action>, io::Error> {
        self.read_stdin()?;
        Ok(self.actions.drain(..).collect())
    }
}

/// dummy Input implementation for testing
#[derive(Default)]
pub struct DummyInput {
    bytes: Vec<u8>,
    actions: VecDeque<Action>,
}

impl DummyInput {
    pub fn new(keys: &[u8]) -> Self {
        DummyInput {
            bytes: Vec::from(keys),
            actions: VecDeque::new(),
        }
    }

    /// queue an action for the next take_actions
    pub fn push_action(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    /// hold these keys until the next flush
    pub fn press(&mut self, keys: &[u8]) {
        self.bytes.extend_from_slice(keys);
    }
}

impl Input for DummyInput {
    fn peek_keys(&mut self) -> Result<&[u8], io::Error> {
        Ok(self.bytes.as_slice())
    }

    fn flush_keys(&mut self) -> Result<(), io::Error> {
        self.bytes.clear();
        Ok(())
    }

    fn take_actions(&mut self) -> Result<Vec<Action>, io::Error> {
        Ok(self.actions.drain(..).collect())
    }
}
