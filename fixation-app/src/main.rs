mod app;

use std::path::{Path, PathBuf};

use anyhow::Result;
use fixation_experiment::instructions::{INTERVAL_PROMPT, PAGES, WELCOME};
use fixation_experiment::{Devices, SessionConfig, SessionContext, SessionDriver, SessionOutcome};
use fixation_render::FieldImages;
use fixation_timing::HighPrecisionTimer;
use log::info;

use app::Screen;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== FIXATION TRAINING ===");
    println!("Platform: {}", std::env::consts::OS);
    println!("Architecture: {}", std::env::consts::ARCH);
    println!("Press SPACE to continue or Q to quit.\n");

    let mut rng = rand::rng();
    let context = SessionContext::new(SessionConfig::default(), &mut rng)?;
    info!("session parameters: {}", context.config.to_json());

    let assets = asset_dir()?;
    info!("loading stimuli from {}", assets.display());
    let fields = FieldImages::load(&assets.join("static_1.png"), &assets.join("static_2.png"))?;

    let screen = Screen::open(context.config.stimuli.clone(), &fields, context.config.quit_key)?;
    screen.warm_texts(&[WELCOME, PAGES[0], PAGES[1], PAGES[2], INTERVAL_PROMPT]);
    let cue_frames = context.config.cue_frames;
    let devices = Devices {
        display: screen.clone(),
        keyboard: screen.clone(),
        timer: HighPrecisionTimer::new(),
        rng,
    };

    let mut driver = SessionDriver::new(context, devices);
    let outcome = driver.run()?;

    let stats = screen.calibration_stats();
    info!(
        "frame timing: mean {:.3}ms, jitter {:.3}ms, min {:.3}ms, max {:.3}ms, {:.1} fps",
        stats.average_frame_time_ns / 1e6,
        stats.jitter_ns / 1e6,
        stats.min_frame_time_ns / 1e6,
        stats.max_frame_time_ns / 1e6,
        stats.effective_fps
    );
    info!(
        "cue of {cue_frames} frames lasted {:.1}ms",
        stats.duration_of(cue_frames).as_secs_f64() * 1e3
    );

    match outcome {
        SessionOutcome::Completed { trials } => {
            println!("\nTraining completed: {trials} trials. Thank you!");
        }
        SessionOutcome::Aborted { completed_trials } => {
            println!("\nTraining stopped after {completed_trials} trials.");
        }
    }
    Ok(())
}

/// `assets/` next to the executable or in one of its parent directories,
/// else under the working directory.
fn asset_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let found = exe.parent().and_then(find_assets);
    Ok(match found {
        Some(dir) => dir,
        None => std::env::current_dir()?.join("assets"),
    })
}

fn find_assets(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("assets"))
        .find(|dir| dir.join("static_1.png").is_file())
}
