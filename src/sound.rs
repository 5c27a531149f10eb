use beep::beep;
use std::error::Error;
use tracing::debug;

/// The VIP's single-tone beeper.
pub trait Sound {
    fn beep(&mut self) -> Result<(), Box<dyn Error>>;
    fn stop(&mut self) -> Result<(), Box<dyn Error>>;
    fn is_beeping(&self) -> bool;

    /// follow the tone timer, only touching the device when it changes
    fn set_beeping(&mut self, on: bool) -> Result<(), Box<dyn Error>> {
        match (on, self.is_beeping()) {
            (true, false) => self.beep(),
            (false, true) => self.stop(),
            _ => Ok(()),
        }
    }
}

const SIMPLEBEEP_PITCH: u16 = 2093; // C

/// the PC speaker, through the beep crate
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        beep(SIMPLEBEEP_PITCH)?;
        self.is_beeping = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        beep(0)?;
        self.is_beeping = false;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.is_beeping
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        if self.is_beeping {
            let _ = beep(0);
        }
    }
}

/// silence; remembers whether it would be beeping
#[derive(Default)]
pub struct Mute {
    on: bool,
    pub changes: usize,
}

impl Mute {
    pub fn new() -> Self {
        Mute::default()
    }
}

impl Sound for Mute {
    fn beep(&mut self) -> Result<(), Box<dyn Error>> {
        debug!("beep");
        self.on = true;
        self.changes += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Box<dyn Error>> {
        self.on = false;
        self.changes += 1;
        Ok(())
    }

    fn is_beeping(&self) -> bool {
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_beeping_only_on_change() -> Result<(), Box<dyn Error>> {
        let mut m = Mute::new();
        m.set_beeping(false)?;
        assert_eq!(m.changes, 0);
        m.set_beeping(true)?;
        m.set_beeping(true)?;
        assert!(m.is_beeping());
        assert_eq!(m.changes, 1);
        m.set_beeping(false)?;
        assert!(!m.is_beeping());
        assert_eq!(m.changes, 2);
        Ok(())
    }
}
