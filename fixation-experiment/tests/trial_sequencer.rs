mod common;

use std::time::Duration;

use common::*;
use fixation_core::{ArrowDirection, DistractorGlyph, FieldId, Key, Side, Stimulus};
use fixation_experiment::{
    Devices, SessionBlock, SessionConfig, SessionContext, SessionDriver, SessionOutcome,
    TrialOutcome, TrialPlan, TrialSequencer, TrialSummary,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn blocks(spec: &[(bool, usize)]) -> SessionConfig {
    SessionConfig {
        blocks: spec
            .iter()
            .map(|&(show_distractor, n_trials)| SessionBlock {
                show_distractor,
                n_trials,
            })
            .collect(),
        ..Default::default()
    }
}

fn left_first_plan() -> TrialPlan {
    TrialPlan::from_sequences(
        vec![Side::Left, Side::Right],
        vec![DistractorGlyph::Slash, DistractorGlyph::Backslash],
    )
    .unwrap()
}

fn completed(outcome: TrialOutcome) -> TrialSummary {
    match outcome {
        TrialOutcome::Completed(summary) => summary,
        TrialOutcome::Aborted => panic!("trial was aborted"),
    }
}

#[test]
fn passive_session_alternates_for_two_display_windows() {
    let config = fixed_display_time(blocks(&[(false, 2)]), 2.0);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(1)).unwrap();
    let devices = simulated(FRAME_16_6, ScriptedKeyboard::always(Key::Space), 5);
    let mut driver = SessionDriver::new(ctx, devices);

    let outcome = driver.run_session(false, 2).unwrap();
    assert_eq!(outcome, SessionOutcome::Completed { trials: 2 });

    // 120 frames reach 1.992 s, so a 2 s window shows 121 frames
    let display = &driver.devices().display;
    assert_eq!(display.count(|f| f.field().is_some()), 2 * 2 * 121);
    assert_eq!(
        display.draw_count(|s| matches!(s, Stimulus::Arrow { .. } | Stimulus::Glyph { .. })),
        0
    );
    assert_eq!(display.count(Frame::is_blank_clear), 2);
    assert_eq!(display.count(|f| f.clear), 2);
    // prompt + 242 alternation frames + final clear, per trial
    assert_eq!(display.frames.len(), 2 * 244);
}

#[test]
fn passive_trial_reports_equal_phase_counts() {
    let config = fixed_display_time(blocks(&[(false, 2)]), 2.0);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(2)).unwrap();
    let mut devices = simulated(FRAME_16_6, ScriptedKeyboard::always(Key::Space), 5);

    let summary = completed(
        TrialSequencer::new(&ctx, &mut devices)
            .run_trial(0, false)
            .unwrap(),
    );
    assert_eq!(summary.display_time, Duration::from_secs(2));
    assert_eq!(summary.pre_frames, 121);
    assert_eq!(summary.post_frames, 121);
    assert_eq!(summary.cue_frames, 0);
    assert_eq!(summary.flash_frames, 0);
}

#[test]
fn cued_trial_shows_arrow_then_glyph_on_the_planned_side() {
    let config = fixed_display_time(blocks(&[(true, 1), (false, 1)]), 2.0);
    let ctx = SessionContext::with_plan(config, left_first_plan()).unwrap();
    let devices = simulated(FRAME_16_6, ScriptedKeyboard::always(Key::Space), 9);
    let mut driver = SessionDriver::new(ctx, devices);

    let outcome = driver.run_session(true, 1).unwrap();
    assert_eq!(outcome, SessionOutcome::Completed { trials: 1 });

    let display = &driver.devices().display;
    assert_eq!(
        display.count(|f| f.arrow() == Some(ArrowDirection::Left)),
        50
    );
    assert_eq!(
        display.count(|f| f.arrow() == Some(ArrowDirection::Right)),
        0
    );
    assert_eq!(display.count(|f| f.glyph_x() == Some(-300.0)), 4);
    assert_eq!(
        display.draw_count(|s| matches!(s, Stimulus::Glyph { .. })),
        4
    );

    let cue_frames: Vec<_> = display.frames.iter().filter(|f| f.arrow().is_some()).collect();
    assert!(cue_frames.iter().all(|f| !f.has_fixation() && f.field().is_none()));
    assert!(
        display
            .frames
            .iter()
            .filter(|f| f.field().is_some())
            .all(Frame::has_fixation)
    );
}

#[test]
fn flash_draws_field_then_glyph_then_fixation() {
    let config = fixed_display_time(blocks(&[(true, 1), (false, 1)]), 2.0);
    let ctx = SessionContext::with_plan(config, left_first_plan()).unwrap();
    let mut devices = simulated(FRAME_16_6, ScriptedKeyboard::always(Key::Space), 9);

    let summary = completed(
        TrialSequencer::new(&ctx, &mut devices)
            .run_trial(0, true)
            .unwrap(),
    );
    assert_eq!(summary.cue_frames, 50);
    assert_eq!(summary.flash_frames, 4);

    let flash: Vec<_> = devices
        .display
        .frames
        .iter()
        .filter(|f| f.glyph_x().is_some())
        .collect();
    for frame in flash {
        assert!(matches!(frame.stimuli[0], Stimulus::Field(_)));
        assert!(matches!(
            frame.stimuli[1],
            Stimulus::Glyph {
                glyph: DistractorGlyph::Slash,
                ..
            }
        ));
        assert!(matches!(frame.stimuli[2], Stimulus::Circle { .. }));
    }
}

#[test]
fn fields_alternate_on_every_frame_across_all_phases() {
    let config = fixed_display_time(blocks(&[(true, 2)]), 1.7);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(4)).unwrap();
    let devices = simulated(FRAME_16_6, ScriptedKeyboard::always(Key::Space), 4);
    let mut driver = SessionDriver::new(ctx, devices);
    driver.run_session(true, 2).unwrap();

    let frames = &driver.devices().display.frames;
    let trials: Vec<Vec<FieldId>> = frames
        .split(Frame::is_blank_clear)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| chunk.iter().filter_map(Frame::field).collect())
        .collect();
    assert_eq!(trials.len(), 2);
    for fields in trials {
        assert_eq!(fields.first(), Some(&FieldId::First));
        assert!(fields.windows(2).all(|w| w[0] != w[1]));
        assert_eq!(fields.len(), 2 * 103 + 4);
    }
}

#[test]
fn one_display_time_bounds_both_alternation_phases() {
    let config = blocks(&[(true, 6)]);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(8)).unwrap();
    let step = Duration::from_millis(10);
    let mut devices = simulated(step, ScriptedKeyboard::always(Key::Space), 21);

    let mut times = Vec::new();
    for index in 0..6 {
        let summary = completed(
            TrialSequencer::new(&ctx, &mut devices)
                .run_trial(index, true)
                .unwrap(),
        );
        let d = summary.display_time;
        assert!(d >= Duration::from_millis(1500) && d <= Duration::from_millis(2500));
        let expected = d.as_nanos().div_ceil(step.as_nanos()) as usize;
        assert_eq!(summary.pre_frames, expected);
        assert_eq!(summary.post_frames, expected);
        times.push(d);
    }
    times.dedup();
    assert!(times.len() > 1);
}

#[test]
fn alternation_stops_at_the_first_reading_past_display_time() {
    let d = Duration::from_secs(2);
    let eps = Duration::from_millis(1);
    let config = fixed_display_time(blocks(&[(false, 2)]), 2.0);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(0)).unwrap();
    let timer = ScriptedTimer::default();
    timer
        .readings
        .borrow_mut()
        .extend([d - eps, d + eps, Duration::ZERO, d - eps, d]);
    let mut devices = Devices {
        display: RecordingDisplay::default(),
        keyboard: ScriptedKeyboard::always(Key::Space),
        timer,
        rng: StdRng::seed_from_u64(0),
    };

    let summary = completed(
        TrialSequencer::new(&ctx, &mut devices)
            .run_trial(1, false)
            .unwrap(),
    );
    assert_eq!(summary.pre_frames, 1);
    assert_eq!(summary.post_frames, 2);
    // pre, post and end of trial
    assert_eq!(devices.timer.resets, 3);
}

#[test]
fn quit_at_a_prompt_aborts_without_presenting_the_trial() {
    let config = fixed_display_time(blocks(&[(false, 2)]), 2.0);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(1)).unwrap();
    let keyboard = ScriptedKeyboard::then_always([Key::Space], Key::Q);
    let mut driver = SessionDriver::new(ctx, simulated(FRAME_16_6, keyboard, 1));

    let outcome = driver.run_session(false, 2).unwrap();
    assert_eq!(outcome, SessionOutcome::Aborted { completed_trials: 1 });

    let devices = driver.devices();
    assert_eq!(devices.display.count(Frame::is_blank_clear), 1);
    assert_eq!(devices.display.count(|f| f.field().is_some()), 2 * 121);
    assert!(devices.keyboard.reads.iter().all(|keys| keys.contains(&Key::Q)));
}

#[test]
fn unrelated_keys_do_not_start_a_trial() {
    let config = fixed_display_time(blocks(&[(false, 2)]), 2.0);
    let ctx = SessionContext::new(config, &mut StdRng::seed_from_u64(1)).unwrap();
    let keyboard = ScriptedKeyboard {
        keys: [Key::Return, Key::Escape, Key::Space].into(),
        ..Default::default()
    };
    let mut devices = simulated(FRAME_16_6, keyboard, 1);

    let outcome = TrialSequencer::new(&ctx, &mut devices)
        .run_trial(0, false)
        .unwrap();
    assert!(matches!(outcome, TrialOutcome::Completed(_)));
    assert_eq!(devices.keyboard.reads, vec![vec![Key::Space, Key::Q]]);
}
