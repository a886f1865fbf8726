//! Terminal preview of an emulated keyboard using crossterm.
//!
//! Draws the key matrix in an alternate screen with true color, one cell per
//! matrix position, sampling [`EmulatedKeyboard::displayed`] every frame.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossterm::{
    cursor, event,
    style::{self, Color, Stylize},
    terminal, ExecutableCommand, QueueableCommand,
};
use keyglow_device::{EmulatedKeyboard, LogicalKey};

use crate::layout::KeyMatrix;

/// Width of each cell in characters.
const CELL_W: usize = 5;
/// Gap color.
const BG: Color = Color::Rgb { r: 20, g: 20, b: 20 };

/// Short label fitting in one cell
pub fn cell_label(key: LogicalKey) -> String {
    key.name().chars().take(CELL_W - 1).collect()
}

/// Readable text color on top of `(r, g, b)`
fn text_color((r, g, b): (u8, u8, u8)) -> Color {
    let lum = (r as u16 + g as u16 + b as u16) / 3;
    if lum > 128 {
        Color::Black
    } else {
        Color::White
    }
}

/// Run the preview until q/Esc/Ctrl-C, `running` turning false, or
/// `deadline` passing.
pub fn run(
    keyboard: &EmulatedKeyboard,
    matrix: &KeyMatrix,
    title: &str,
    running: &AtomicBool,
    deadline: Option<Instant>,
    fps: u32,
) -> io::Result<()> {
    let frame_dur = Duration::from_secs_f64(1.0 / fps.clamp(1, 60) as f64);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout
        .execute(terminal::EnterAlternateScreen)?
        .execute(cursor::Hide)?;

    let result = run_loop(&mut stdout, keyboard, matrix, title, running, deadline, frame_dur);

    stdout
        .execute(cursor::Show)?
        .execute(terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

fn quit_requested() -> io::Result<bool> {
    if !event::poll(Duration::ZERO)? {
        return Ok(false);
    }
    if let event::Event::Key(key) = event::read()? {
        return Ok(match key.code {
            event::KeyCode::Char('q') | event::KeyCode::Esc => true,
            event::KeyCode::Char('c') => key.modifiers.contains(event::KeyModifiers::CONTROL),
            _ => false,
        });
    }
    Ok(false)
}

fn run_loop(
    stdout: &mut io::Stdout,
    keyboard: &EmulatedKeyboard,
    matrix: &KeyMatrix,
    title: &str,
    running: &AtomicBool,
    deadline: Option<Instant>,
    frame_dur: Duration,
) -> io::Result<()> {
    let start = Instant::now();

    while running.load(Ordering::SeqCst) && deadline.map_or(true, |d| Instant::now() < d) {
        if quit_requested()? {
            running.store(false, Ordering::SeqCst);
            break;
        }

        stdout.queue(cursor::MoveTo(0, 0))?;
        stdout.queue(style::PrintStyledContent(
            format!(
                " {}  |  {:6.1}s  |  q/Esc to quit ",
                title,
                start.elapsed().as_secs_f64()
            )
            .with(Color::White)
            .on(Color::DarkGrey),
        ))?;

        for y in 0..matrix.height() {
            stdout.queue(cursor::MoveTo(0, (y + 2) as u16))?;
            for x in 0..matrix.width() {
                let cell = match matrix.key_at(x, y) {
                    Some(key) => {
                        let rgb = keyboard.displayed(key, matrix.frame_position(key));
                        let bg = Color::Rgb {
                            r: rgb.0,
                            g: rgb.1,
                            b: rgb.2,
                        };
                        format!("{:^width$}", cell_label(key), width = CELL_W)
                            .with(text_color(rgb))
                            .on(bg)
                    }
                    None => " ".repeat(CELL_W).with(BG).on(BG),
                };
                stdout.queue(style::PrintStyledContent(cell))?;
            }
        }
        stdout.flush()?;

        std::thread::sleep(frame_dur);
    }

    Ok(())
}
