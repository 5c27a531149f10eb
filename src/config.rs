use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// CHIP-8 emulator with a live debugger
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CHIP-8 program to run
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Instructions executed per 60Hz frame
    #[arg(short, long, default_value_t = 10)]
    cycles_per_frame: u32,

    /// Sound the PC speaker instead of staying silent
    #[arg(short, long)]
    beep: bool,

    /// Start paused, ready to single-step
    #[arg(short, long)]
    paused: bool,

    /// Least severe messages shown in the log pane
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rom: PathBuf,
    pub cycles_per_frame: u32,
    pub beep: bool,
    pub start_paused: bool,
    pub log_level: LevelFilter,
}

impl Config {
    /// from the process's command line; prints usage and exits on bad input
    pub fn build() -> Self {
        Self::from(Args::parse())
    }

    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Args::try_parse_from(args).map(Self::from)
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            rom: args.rom,
            cycles_per_frame: args.cycles_per_frame,
            beep: args.beep,
            start_paused: args.paused,
            log_level: args.log_level,
        }
    }
}
