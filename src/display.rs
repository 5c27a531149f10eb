use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Widget};
use tui::Terminal;

/// Display is used by the emulator to draw things on the screen. It should
/// abstract the implementation details, so a variety of kinds of screen would
/// work. Alongside the CHIP-8 screen it gives the debugger somewhere to paint.
pub trait Display {
    /// draw data based on internal resolution of display, then let the
    /// overlay paint each debugger pane
    fn draw(&mut self, data: &[u8], overlay: &mut dyn Overlay) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize;
}

/// The debugger panes drawn next to the CHIP-8 screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Disassembly,
    Registers,
    Log,
}

/// Whatever paints the debugger panes each frame.
pub trait Overlay {
    fn paint(&mut self, pane: Pane, sink: &mut dyn DrawSink);
}

/// Primitive drawing into one pane. Coordinates are character cells from the
/// pane's top-left corner; anything outside the pane is dropped.
pub trait DrawSink {
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color);
    fn draw_text(&mut self, text: &str, x: u16, y: u16);
}

/// DrawSink onto a region of a TUI buffer
pub struct BufferSink<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> BufferSink<'a> {
    /// `area` must lie inside `buf`
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        BufferSink { buf, area }
    }
}

impl DrawSink for BufferSink<'_> {
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        let rect = Rect::new(
            self.area.x + x,
            self.area.y + y,
            w.min(self.area.width - x),
            h.min(self.area.height - y),
        );
        self.buf.set_style(rect, Style::default().bg(color));
    }

    fn draw_text(&mut self, text: &str, x: u16, y: u16) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        self.buf.set_stringn(
            self.area.x + x,
            self.area.y + y,
            text,
            (self.area.width - x) as usize,
            Style::default(),
        );
    }
}

/// one call made on a RecordingSink
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect(u16, u16, u16, u16, Color),
    Text(String, u16, u16),
}

/// DrawSink that remembers what it was asked to draw, in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<DrawCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text(text, _, _) => Some(text.as_str()),
                DrawCall::Rect(..) => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Rect(..)))
            .collect()
    }
}

impl DrawSink for RecordingSink {
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) {
        self.calls.push(DrawCall::Rect(x, y, w, h, color));
    }

    fn draw_text(&mut self, text: &str, x: u16, y: u16) {
        self.calls.push(DrawCall::Text(text.to_string(), x, y));
    }
}

// store useful metadata about the terminal
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// cells taken by the bordered screen
    fn frame_size(&self) -> (u16, u16) {
        (2 + self.0 as u16, 2 + self.1 as u16)
    }

    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }

    /// where each debugger pane goes, around a screen of this size:
    /// disassembly and registers to the right, the log underneath
    fn pane_layout(&self) -> [(Pane, &'static str, Rect); 3] {
        let (w, h) = self.frame_size();
        [
            (Pane::Disassembly, "Disassembly", Rect::new(w, 0, 28, 21)),
            (Pane::Registers, "Registers", Rect::new(w + 28, 0, 26, 18)),
            (Pane::Log, "Log", Rect::new(0, h, w.max(47), 18)),
        ]
    }
}

/// the part of `rect` on screen, if any
fn clip(rect: Rect, screen: Rect) -> Option<Rect> {
    if rect.intersects(screen) {
        Some(rect.intersection(screen))
    } else {
        None
    }
}

/// hands one pane's area of the buffer to the overlay
struct PaneWidget<'a> {
    pane: Pane,
    overlay: &'a mut dyn Overlay,
}

impl Widget for PaneWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut sink = BufferSink::new(buf, area);
        self.overlay.paint(self.pane, &mut sink);
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm. It
/// writes to stderr, because stdout is captured for the debug log.
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stderr>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stderr = io::stderr();
        execute!(stderr, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y, 1),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = execute!(io::stderr(), Show, LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8], overlay: &mut dyn Overlay) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        assert_eq!(
            data.len(),
            self.resolution.byte_count(),
            "MonoTermDisplay must have correct-sized data to draw"
        );
        // i don't know how to draw things that aren't mono
        assert_eq!(
            self.resolution.2, 1,
            "MonoTermDisplay can only render one bitplane"
        );

        let resolution = &self.resolution;
        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let screen = f.size();
            let (w, h) = resolution.frame_size();
            let size = match clip(Rect::new(0, 0, w, h), screen) {
                Some(size) => size,
                None => return,
            };

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block) //Braille
                .paint(|ctx| {
                    // expand each bitplane into x, y float coords, suitable for
                    // rendering with TUI. this just prints blocky points for now
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 0).collect::<Vec<_>>(),
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &resolution.bitplane_from_data(data, 1).collect::<Vec<_>>(),
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);

            for (pane, title, rect) in resolution.pane_layout() {
                let rect = match clip(rect, screen) {
                    // too small to hold a border and any content
                    Some(rect) if rect.width >= 3 && rect.height >= 3 => rect,
                    _ => continue,
                };
                let block = Block::default().title(title).borders(Borders::ALL);
                let inner = block.inner(rect);
                f.render_widget(block, rect);
                f.render_widget(
                    PaneWidget {
                        pane,
                        overlay: &mut *overlay,
                    },
                    inner,
                );
            }
        })?;
        Ok(())
    }

    /// how big the display data should be
    fn get_display_size_bytes(&mut self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines. Each draw paints every pane into
/// a RecordingSink, kept until the next frame.
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub panes: Vec<(Pane, RecordingSink)>,
}

impl DummyDisplay {
    pub fn new() -> Result<DummyDisplay, io::Error> {
        Ok(DummyDisplay::default())
    }

    /// what the overlay drew into `pane` on the last frame
    pub fn pane(&self, pane: Pane) -> Option<&RecordingSink> {
        self.panes.iter().find(|(p, _)| *p == pane).map(|(_, s)| s)
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _data: &[u8], overlay: &mut dyn Overlay) -> Result<(), io::Error> {
        self.frames += 1;
        self.panes.clear();
        for pane in [Pane::Disassembly, Pane::Registers, Pane::Log] {
            let mut sink = RecordingSink::new();
            overlay.paint(pane, &mut sink);
            self.panes.push((pane, sink));
        }
        Ok(())
    }

    fn get_display_size_bytes(&mut self) -> usize {
        0x100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Resolution tests
    #[test]
    fn test_pixel_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.pixel_count(), 2048)
    }

    #[test]
    fn test_byte_count() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.byte_count(), 256)
    }

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32, 1);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_bitplane_iterator() {
        let r = Resolution(64, 32, 1);
        let mut data = [0u8; 256];
        data[0] = 0x80; // top-left
        data[255] = 0x01; // bottom-right
        let mut lit: Vec<_> = r.bitplane_from_data(&data, 1).collect();
        lit.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(lit, vec![(0.0, 0.0), (63.0, -31.0)]);
        assert_eq!(r.bitplane_from_data(&data, 0).count(), 2046);
    }

    #[test]
    fn test_clip() {
        let screen = Rect::new(0, 0, 80, 24);
        assert_eq!(clip(Rect::new(70, 20, 20, 20), screen), Some(Rect::new(70, 20, 10, 4)));
        assert_eq!(clip(Rect::new(80, 0, 10, 10), screen), None);
    }

    #[test]
    fn test_panes_fit_their_content() {
        let r = Resolution(64, 32, 1);
        let layout = r.pane_layout();
        let (_, _, disasm) = layout[0];
        let (_, _, log) = layout[2];
        // borders take one cell each side
        assert_eq!(disasm.height - 2, 19);
        assert_eq!(log.height - 2, 16);
        assert!(log.width - 2 >= 45);
        assert_eq!(disasm.x, 66);
        assert_eq!(log.y, 34);
    }

    // sink tests
    #[test]
    fn test_buffer_sink_offsets_and_clips() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));
        let area = Rect::new(2, 1, 6, 2);
        {
            let mut sink = BufferSink::new(&mut buf, area);
            sink.draw_text("abcdefghij", 1, 0);
            sink.draw_text("zz", 0, 7);
            sink.fill_rect(0, 1, 100, 100, Color::Red);
        }
        assert_eq!(buf.get(3, 1).symbol, "a");
        assert_eq!(buf.get(7, 1).symbol, "e");
        // clipped at the area's right edge
        assert_eq!(buf.get(8, 1).symbol, " ");
        assert_eq!(buf.get(2, 2).bg, Color::Red);
        assert_eq!(buf.get(7, 2).bg, Color::Red);
        assert_eq!(buf.get(8, 2).bg, Color::Reset);
        assert_eq!(buf.get(2, 3).bg, Color::Reset);
    }

    #[test]
    fn test_buffer_sink_text_keeps_highlight() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 10, 1));
        let mut sink = BufferSink::new(&mut buf, Rect::new(0, 0, 10, 1));
        sink.fill_rect(0, 0, 10, 1, Color::Blue);
        sink.draw_text("x", 0, 0);
        assert_eq!(buf.get(0, 0).symbol, "x");
        assert_eq!(buf.get(0, 0).bg, Color::Blue);
    }

    #[test]
    fn test_recording_sink() {
        let mut sink = RecordingSink::new();
        sink.fill_rect(0, 1, 2, 3, Color::Green);
        sink.draw_text("hi", 4, 5);
        assert_eq!(sink.texts(), vec!["hi"]);
        assert_eq!(sink.rects(), vec![&DrawCall::Rect(0, 1, 2, 3, Color::Green)]);
    }

    struct Echo;

    impl Overlay for Echo {
        fn paint(&mut self, pane: Pane, sink: &mut dyn DrawSink) {
            sink.draw_text(&format!("{:?}", pane), 0, 0);
        }
    }

    #[test]
    fn test_dummy_display_paints_every_pane() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new()?;
        d.draw(&[0; 256], &mut Echo)?;
        d.draw(&[0; 256], &mut Echo)?;
        assert_eq!(d.frames, 2);
        assert_eq!(d.panes.len(), 3);
        assert_eq!(d.pane(Pane::Log).unwrap().texts(), vec!["Log"]);
        Ok(())
    }
}
