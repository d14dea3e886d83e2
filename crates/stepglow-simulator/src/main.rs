//! Desktop simulator for the stepglow watchface.
//!
//! Renders the hourly step grid in an SDL2 window via
//! `embedded-graphics-simulator`, fed by a synthetic step history so the
//! backfill, the minute ticks and midnight rollover can be watched without a
//! device.
//!
//! # Usage
//!
//! ```text
//! stepglow-simulator [config.toml]
//! ```
//!
//! `STEPGLOW_SPEED=600` runs simulated time 600x faster than real time.
//!
//! # Key bindings
//!
//! | Key     | Action                          |
//! |---------|---------------------------------|
//! | R       | Restart tracking (re-backfill)  |
//! | Q / Esc | Quit                            |

mod clock;
mod provider;

use std::time::{Duration, Instant};

use chrono::{Local, TimeZone};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Text};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};
use thiserror::Error;

use stepglow_core::intensity::Palette;
use stepglow_core::scheduler::{Task, TaskQueue};
use stepglow_core::time::Clock;
use stepglow_core::ui::StepGrid;
use stepglow_core::{StepTracker, TrackerConfig, TrackerError};

use clock::SimClock;
use provider::SyntheticHistory;

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 144;
const DISPLAY_HEIGHT_PX: u32 = 168;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 3;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Height of the daily progress bar along the bottom edge.
const PROGRESS_HEIGHT_PX: u32 = 6;

/// Pending tasks: one backfill step plus the periodic tick.
const TASK_QUEUE_CAPACITY: usize = 4;

/// Repaint requests from the tracker.
static REPAINT: RepaintSignal = Signal::new();

#[derive(Error, Debug)]
enum SimulatorError {
    #[error("failed to read {path}: {source}")]
    ReadConfig {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    ParseConfig {
        path: String,
        source: toml::de::Error,
    },
    #[error("tracker rejected configuration: {0}")]
    Tracker(TrackerError),
}

impl From<TrackerError> for SimulatorError {
    fn from(err: TrackerError) -> Self {
        Self::Tracker(err)
    }
}

/// Load the tracker configuration from the path given on the command line.
fn load_config() -> Result<TrackerConfig, SimulatorError> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(TrackerConfig::default());
    };

    let text = std::fs::read_to_string(&path).map_err(|source| SimulatorError::ReadConfig {
        path: path.clone(),
        source,
    })?;
    let config: TrackerConfig =
        toml::from_str(&text).map_err(|source| SimulatorError::ParseConfig {
            path: path.clone(),
            source,
        })?;

    info!("Loaded configuration from {}", path);
    Ok(config)
}

fn speed_from_env() -> u32 {
    std::env::var("STEPGLOW_SPEED")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

type RepaintSignal = Signal<CriticalSectionRawMutex, ()>;
type SimTracker<'a> = StepTracker<&'a SimClock, SyntheticHistory, &'a RepaintSignal>;

fn draw_face<D>(
    tracker: &SimTracker<'_>,
    grid: &mut StepGrid,
    display: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let palette = Palette::DEFAULT;

    display.clear(Rgb565::BLACK)?;

    grid.set_levels(tracker.levels().map(|(_, level)| level));
    grid.draw(display)?;

    let now = tracker.clock().now();
    let (time_text, date_text) = match Local.timestamp_opt(now, 0).single() {
        Some(local) => (
            local.format("%H:%M").to_string(),
            local.format("%a %m/%d").to_string(),
        ),
        None => (String::from("--:--"), String::new()),
    };

    let right = DISPLAY_WIDTH_PX as i32 - 4;
    Text::with_alignment(
        &time_text,
        Point::new(right, 24),
        MonoTextStyle::new(&FONT_10X20, Rgb565::WHITE),
        Alignment::Right,
    )
    .draw(display)?;
    Text::with_alignment(
        &date_text,
        Point::new(right, 42),
        MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE),
        Alignment::Right,
    )
    .draw(display)?;

    let total = tracker.daily_total();
    Text::with_alignment(
        &format!("{} steps", total),
        Point::new(right, 60),
        MonoTextStyle::new(&FONT_6X10, palette.color(tracker.daily_level())),
        Alignment::Right,
    )
    .draw(display)?;

    // Daily progress bar, right of the grid columns
    let bar_left = grid.bounds().top_left.x + grid.used_width() as i32 + 4;
    let bar_width = (DISPLAY_WIDTH_PX as i32 - bar_left - 4).max(0) as u32;
    let goal = tracker.config().daily_goal.max(1) as u64;
    let filled = (bar_width as u64 * (total as u64).min(goal) / goal) as u32;
    let bar_top = DISPLAY_HEIGHT_PX as i32 - PROGRESS_HEIGHT_PX as i32 - 4;

    Rectangle::new(
        Point::new(bar_left, bar_top),
        Size::new(bar_width, PROGRESS_HEIGHT_PX),
    )
    .into_styled(PrimitiveStyle::with_stroke(Rgb565::WHITE, 1))
    .draw(display)?;
    Rectangle::new(
        Point::new(bar_left, bar_top),
        Size::new(filled, PROGRESS_HEIGHT_PX),
    )
    .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
    .draw(display)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn run() -> Result<(), SimulatorError> {
    let config = load_config()?;
    let speed = speed_from_env();

    info!("Starting stepglow simulator");
    info!(
        "Display: {}×{} (scale {}×), time speed {}×",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE, speed
    );
    info!("Keys: R=Restart  Q=Quit");

    let palette = Palette::DEFAULT;
    palette.check_levels(config.num_levels)?;

    let clock = SimClock::new(speed);
    let utc_offset = Local::now().offset().local_minus_utc();
    let mut tracker = StepTracker::new(
        config,
        &clock,
        SyntheticHistory::new(utc_offset),
        &REPAINT,
    )?;
    let mut queue: TaskQueue<TASK_QUEUE_CAPACITY> = TaskQueue::default();

    let mut display =
        SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Stepglow Simulator", &output_settings);

    let mut grid = StepGrid::new(
        Rectangle::new(Point::zero(), Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)),
        palette,
    );

    tracker.start(&mut queue);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    if let Err(e) = draw_face(&tracker, &mut grid, &mut display) {
        error!("Draw error: {:?}", e);
    }
    REPAINT.reset();
    window.update(&display);
    let mut needs_redraw = false;

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::R => {
                        info!("Restarting tracking");
                        tracker.start(&mut queue);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let now = embassy_time::Instant::from_millis(clock.elapsed_ms());
        while let Some(task) = queue.pop_due(now) {
            if task == Task::Tick {
                // The clock text changes every minute regardless of steps
                needs_redraw = true;
            }
            tracker.run(task, &mut queue);
        }

        if REPAINT.try_take().is_some() || needs_redraw {
            if let Err(e) = draw_face(&tracker, &mut grid, &mut display) {
                error!("Draw error: {:?}", e);
            }
            needs_redraw = false;
        }

        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
