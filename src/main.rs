use std::error::Error;
use std::fs::File;
use std::io;

use chip8::config::Config;
use chip8::debug::capture::OutputCapture;
use chip8::display::MonoTermDisplay;
use chip8::emulator::Emulator;
use chip8::input::StdinInput;
use chip8::interpreter::Chip8Interpreter;
use chip8::sound::{Mute, SimpleBeep, Sound};
use tracing::info;

fn initialize_logging(config: &Config) {
    // stdout is the capture pipe by now, so this lands in the log pane
    tracing_subscriber::fmt()
        .with_writer(io::stdout)
        .with_max_level(config.log_level)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .init();
}

fn run<S: Sound>(config: &Config, sound: S, capture: &OutputCapture) -> Result<(), Box<dyn Error>> {
    // load before touching the terminal, so a bad path reads cleanly
    let mut interpreter = Chip8Interpreter::new()?;
    let mut f = File::open(&config.rom)?;
    interpreter.load_program(&mut f)?;

    let input = StdinInput::new()?;
    let display = MonoTermDisplay::new(64, 32)?;
    let mut emulator = Emulator::new(
        display,
        input,
        sound,
        io::stdout(),
        interpreter,
        config.cycles_per_frame,
    );
    emulator.session_mut().set_paused(config.start_paused);

    info!("running {}", config.rom.display());
    emulator.print_help()?;
    emulator.main_loop(capture)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::build();

    // without this there is nowhere to see diagnostics, so give up loudly
    let capture = OutputCapture::stdout()?;
    initialize_logging(&config);

    let result = if config.beep {
        run(&config, SimpleBeep::new(), &capture)
    } else {
        run(&config, Mute::new(), &capture)
    };

    // put stdout back before any error is reported, along with whatever the
    // log pane never got to show
    let leftover = capture.finish();
    for line in leftover.iter().flatten() {
        println!("{}", line);
    }
    result?;
    leftover?;
    Ok(())
}
