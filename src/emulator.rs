use crate::debug::capture::LineSource;
use crate::debug::{inspect, DebugSession};
use crate::display::Display;
use crate::input::{Action, Input};
use crate::interpreter::Chip8Interpreter;
use crate::sound::Sound;
use std::error::Error;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// the VIP's timers and display both run at 60Hz
const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Owns the machine and its devices and drives them a frame at a time.
/// `console` is where help text and memory dumps are printed; normally
/// stdout, which the debug log captures.
pub struct Emulator<D, I, S, W> {
    display: D,
    input: I,
    sound: S,
    console: W,
    interpreter: Chip8Interpreter,
    session: DebugSession,
    cycles_per_frame: u32,
}

impl<D: Display, I: Input, S: Sound, W: Write> Emulator<D, I, S, W> {
    pub fn new(
        display: D,
        input: I,
        sound: S,
        console: W,
        interpreter: Chip8Interpreter,
        cycles_per_frame: u32,
    ) -> Self {
        Emulator {
            display,
            input,
            sound,
            console,
            interpreter,
            session: DebugSession::new(),
            cycles_per_frame,
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    pub fn session(&self) -> &DebugSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DebugSession {
        &mut self.session
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn print_help(&mut self) -> Result<(), Box<dyn Error>> {
        inspect::print_help(&mut self.console)?;
        Ok(())
    }

    /// run frames at 60Hz until asked to quit
    pub fn main_loop(&mut self, source: &impl LineSource) -> Result<(), Box<dyn Error>> {
        loop {
            let started = Instant::now();
            if self.frame(source)? == Flow::Quit {
                info!("quitting");
                return Ok(());
            }
            if let Some(rest) = FRAME.checked_sub(started.elapsed()) {
                spin_sleep::sleep(rest);
            }
        }
    }

    /// One frame: handle the user's actions, run the machine (unless
    /// paused), then draw the screen and debugger.
    pub fn frame(&mut self, source: &impl LineSource) -> Result<Flow, Box<dyn Error>> {
        for action in self.input.take_actions()? {
            if self.apply(action)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        if !self.session.is_paused() {
            for _ in 0..self.cycles_per_frame {
                self.step()?;
                if self.session.is_paused() {
                    break;
                }
            }
            self.interpreter.tick_timers();
        }
        self.sound
            .set_beeping(!self.session.is_paused() && self.interpreter.is_beeping())?;
        self.input.flush_keys()?;

        self.session.update(&self.interpreter, source);
        self.display.draw(
            self.interpreter.screen(),
            &mut self.session.frame(&self.interpreter),
        )?;
        Ok(Flow::Continue)
    }

    fn apply(&mut self, action: Action) -> Result<Flow, Box<dyn Error>> {
        match action {
            Action::Help => self.print_help()?,
            Action::Scroll(delta) => self.session.pager_mut().scroll(delta),
            Action::LogHome => self.session.pager_mut().home(),
            Action::LogEnd => self.session.pager_mut().end(),
            Action::Reboot => {
                self.interpreter.reboot()?;
                self.session.reboot();
                info!("rebooted");
            }
            Action::TogglePause => {
                self.session.toggle_pause();
                info!(paused = self.session.is_paused(), "toggled pause");
            }
            Action::Step => {
                if self.session.is_paused() {
                    self.step()?;
                }
            }
            Action::DumpMemory => inspect::dump_memory(&self.interpreter, &mut self.console)?,
            Action::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// one instruction; a machine fault pauses so it can be inspected
    fn step(&mut self) -> Result<(), Box<dyn Error>> {
        let keys = self.input.peek_keys()?;
        if let Err(e) = self.interpreter.step(keys) {
            warn!("{}; pausing", e);
            self.session.set_paused(true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::capture::spawn_line_reader;
    use crate::debug::window::WindowState;
    use crate::display::{DummyDisplay, Overlay, Pane};
    use crate::input::DummyInput;
    use crate::machine::MachineView;
    use crate::sound::Mute;
    use std::io;
    use std::sync::mpsc::{self, Receiver, SyncSender};
    use std::thread;

    type TestEmulator = Emulator<DummyDisplay, DummyInput, Mute, Vec<u8>>;

    fn emulator(prog: &[u8], cycles: u32) -> (TestEmulator, SyncSender<String>, Receiver<String>) {
        let mut interpreter = Chip8Interpreter::new().unwrap();
        let mut prog = prog;
        interpreter.load_program(&mut prog).unwrap();
        let e = Emulator::new(
            DummyDisplay::new().unwrap(),
            DummyInput::new(&[]),
            Mute::new(),
            Vec::new(),
            interpreter,
            cycles,
        );
        let (tx, rx) = mpsc::sync_channel(32);
        (e, tx, rx)
    }

    /// ADD V0, #01 over and over
    fn counting_program() -> Vec<u8> {
        vec![0x70, 0x01].repeat(64)
    }

    #[test]
    fn test_frame_runs_cycles_and_draws() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 3);
        assert_eq!(e.frame(&rx)?, Flow::Continue);
        assert_eq!(e.interpreter().program_counter(), 0x206);
        assert_eq!(e.interpreter().registers()[0], 3);
        assert_eq!(e.display().frames, 1);
        let disasm = e.display().pane(Pane::Disassembly).unwrap();
        assert_eq!(disasm.rects().len(), 1);
        Ok(())
    }

    #[test]
    fn test_paused_frames_only_step_on_request() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 5);
        e.input_mut().push_action(Action::TogglePause);
        e.frame(&rx)?;
        assert!(e.session().is_paused());
        assert_eq!(e.interpreter().program_counter(), 0x200);

        e.input_mut().push_action(Action::Step);
        e.frame(&rx)?;
        assert_eq!(e.interpreter().program_counter(), 0x202);

        e.frame(&rx)?;
        assert_eq!(e.interpreter().program_counter(), 0x202);
        assert_eq!(e.display().frames, 3);
        Ok(())
    }

    #[test]
    fn test_step_ignored_while_running() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 1);
        e.input_mut().push_action(Action::Step);
        e.frame(&rx)?;
        // just the frame's own cycle
        assert_eq!(e.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_fault_pauses_on_the_instruction() -> Result<(), Box<dyn Error>> {
        // ADD V0, #01; then an undefined word
        let (mut e, _tx, rx) = emulator(&[0x70, 0x01, 0xff, 0xff], 10);
        e.frame(&rx)?;
        assert!(e.session().is_paused());
        assert_eq!(e.interpreter().program_counter(), 0x202);
        Ok(())
    }

    #[test]
    fn test_timers_and_sound_follow_pause() -> Result<(), Box<dyn Error>> {
        // LD V0, #03; LD ST, V0; LD DT, V0; JP #206
        let (mut e, _tx, rx) = emulator(&[0x60, 0x03, 0xf0, 0x18, 0xf0, 0x15, 0x12, 0x06], 3);
        e.frame(&rx)?;
        assert_eq!(e.interpreter().sound_timer(), 2);
        assert!(e.sound().is_beeping());

        e.input_mut().push_action(Action::TogglePause);
        e.frame(&rx)?;
        assert_eq!(e.interpreter().sound_timer(), 2);
        assert!(!e.sound().is_beeping());
        Ok(())
    }

    #[test]
    fn test_help_and_dump_go_to_console() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 1);
        e.input_mut().push_action(Action::Help);
        e.input_mut().push_action(Action::DumpMemory);
        e.frame(&rx)?;
        let text = String::from_utf8(e.console().clone())?;
        assert!(text.contains("F11      - Dump memory"));
        assert!(text.contains("Memory dump near I..."));
        // I is 0 at power-on, which is where the interpreter area starts
        assert!(text.contains(" 0000 - 00 00 00 00 00 00 00 00"));
        Ok(())
    }

    #[test]
    fn test_log_pane_follows_capture() -> Result<(), Box<dyn Error>> {
        let (mut e, tx, rx) = emulator(&counting_program(), 1);
        for i in 0..20 {
            tx.send(format!("line {}", i))?;
        }
        for _ in 0..20 {
            e.frame(&rx)?;
        }
        assert_eq!(e.session().pager().len(), 20);
        assert_eq!(e.session().pager().cursor(), 19);
        let log = e.display().pane(Pane::Log).unwrap();
        assert_eq!(log.texts().first(), Some(&"line 4"));
        assert_eq!(log.texts().last(), Some(&"line 19"));

        e.input_mut().push_action(Action::LogHome);
        e.frame(&rx)?;
        assert_eq!(e.session().pager().cursor(), 0);
        e.input_mut().push_action(Action::Scroll(1));
        e.frame(&rx)?;
        assert_eq!(e.session().pager().cursor(), 16);
        e.input_mut().push_action(Action::LogEnd);
        e.frame(&rx)?;
        assert_eq!(e.session().pager().cursor(), 19);
        Ok(())
    }

    #[test]
    fn test_reboot() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 4);
        e.frame(&rx)?;
        e.session_mut().set_paused(true);
        e.session_mut().pager_mut().push("kept".to_string());

        e.input_mut().push_action(Action::Reboot);
        e.frame(&rx)?;
        assert!(!e.session().is_paused());
        // rebooted, then ran this frame's cycles
        assert_eq!(e.interpreter().program_counter(), 0x208);
        assert_eq!(e.interpreter().registers()[0], 4);
        assert_eq!(e.session().pager().line(0), Some("kept"));
        assert_eq!(
            e.session().window().state(),
            WindowState::Stable { base: 0x206 }
        );
        Ok(())
    }

    #[test]
    fn test_quit_stops_before_running() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 1);
        e.input_mut().push_action(Action::Quit);
        assert_eq!(e.frame(&rx)?, Flow::Quit);
        assert_eq!(e.interpreter().program_counter(), 0x200);
        assert_eq!(e.display().frames, 0);
        Ok(())
    }

    #[test]
    fn test_main_loop_until_quit() -> Result<(), Box<dyn Error>> {
        let (mut e, _tx, rx) = emulator(&counting_program(), 1);
        e.input_mut().push_action(Action::Quit);
        e.main_loop(&rx)?;
        Ok(())
    }

    /// only the CHIP-8 screen fits, so no pane is ever painted
    #[derive(Default)]
    struct ScreenOnly {
        frames: usize,
    }

    impl Display for ScreenOnly {
        fn draw(&mut self, _data: &[u8], _overlay: &mut dyn Overlay) -> Result<(), io::Error> {
            self.frames += 1;
            Ok(())
        }

        fn get_display_size_bytes(&mut self) -> usize {
            0x100
        }
    }

    #[test]
    fn test_debugger_keeps_up_with_no_panes_shown() -> Result<(), Box<dyn Error>> {
        let mut interpreter = Chip8Interpreter::new()?;
        interpreter.load_program(&mut counting_program().as_slice())?;
        let mut e = Emulator::new(
            ScreenOnly::default(),
            DummyInput::new(&[]),
            Mute::new(),
            Vec::new(),
            interpreter,
            20,
        );
        let (tx, rx) = mpsc::sync_channel(4);
        tx.send("pending".to_string())?;

        e.frame(&rx)?;
        assert_eq!(e.display().frames, 1);
        assert_eq!(e.session().pager().line(0), Some("pending"));
        // pc is 0x228, past the first window
        assert_eq!(
            e.session().window().state(),
            WindowState::Stable { base: 0x226 }
        );
        Ok(())
    }

    #[test]
    fn test_console_output_never_stalls_frames() -> Result<(), Box<dyn Error>> {
        const FRAMES: usize = 600;
        let (reader, writer) = os_pipe::pipe()?;
        let source = spawn_line_reader(reader)?;
        let mut interpreter = Chip8Interpreter::new()?;
        interpreter.load_program(&mut counting_program().as_slice())?;
        let mut e = Emulator::new(
            DummyDisplay::new()?,
            DummyInput::new(&[]),
            Mute::new(),
            writer,
            interpreter,
            1,
        );

        // a dump every frame writes far more than the log takes in
        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            for _ in 0..FRAMES {
                e.input_mut().push_action(Action::DumpMemory);
                if e.frame(&source).is_err() {
                    return;
                }
            }
            let _ = done_tx.send(e.session().pager().len());
        });
        let taken = done_rx.recv_timeout(Duration::from_secs(30))?;
        assert!(taken > 0 && taken <= FRAMES, "took {} lines", taken);
        Ok(())
    }
}
