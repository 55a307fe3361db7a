//! End-to-end session walkthroughs on a virtual clock.

mod common;

use brewguide_core::{
    Event, Intent, OutcomeDraft, Phase, Rating, ScaledStep, SessionInput, TasteTag,
};
use common::{advance, secs, start, FlakyStore};
use std::time::Duration;

#[test]
fn untimed_then_timed_step() {
    let (clock, mut session) = start(vec![
        ScaledStep::untimed(0, "Rinse the filter and discard the water"),
        ScaledStep::timed(1, "Bloom with 50g", 45.0).with_water(50.0, true),
    ]);
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert_eq!(session.current_step_index(), Some(0));
    assert_eq!(session.remaining_seconds(), None);

    let advanced = session.apply(Intent::NextStep).unwrap();
    assert!(matches!(
        advanced,
        Event::StepAdvanced {
            from_step: 0,
            to_step: 1,
            phase: Phase::Active,
            ..
        }
    ));
    assert_eq!(session.remaining_seconds(), Some(45.0));

    let events = advance(&clock, &mut session, secs(45));
    assert!(matches!(events.as_slice(), [Event::StepReady { step_index: 1, .. }]));
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert_eq!(session.remaining_seconds(), Some(0.0));

    let done = session.apply(Intent::NextStep).unwrap();
    assert!(matches!(done, Event::SessionCompleted { step_count: 2, .. }));
    assert_eq!(session.phase(), Phase::Completed);
    assert_eq!(session.remaining_seconds(), None);
    assert!(!session.has_live_timer());
}

#[test]
fn pause_and_resume_keep_remaining_time() {
    let (clock, mut session) = start(vec![ScaledStep::timed(0, "Steep", 30.0)]);
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.remaining_seconds(), Some(30.0));

    advance(&clock, &mut session, secs(10));
    let paused = session.apply(Intent::Pause).unwrap();
    assert!(matches!(
        paused,
        Event::TimerPaused {
            forced: false,
            ..
        }
    ));
    assert_eq!(session.phase(), Phase::Paused);
    assert_eq!(session.remaining_seconds(), Some(20.0));

    // Time passing while paused changes nothing.
    advance(&clock, &mut session, secs(60));
    assert_eq!(session.remaining_seconds(), Some(20.0));

    session.apply(Intent::Resume).unwrap();
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.remaining_seconds(), Some(20.0));

    advance(&clock, &mut session, secs(20));
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert_eq!(session.remaining_seconds(), Some(0.0));
}

#[test]
fn backgrounding_forces_pause_without_auto_resume() {
    let (clock, mut session) = start(vec![ScaledStep::timed(0, "Steep", 30.0)]);
    advance(&clock, &mut session, secs(4));

    let paused = session
        .handle(SessionInput::AppActivityChanged { is_active: false })
        .unwrap();
    assert!(matches!(paused, Event::TimerPaused { forced: true, .. }));
    assert_eq!(session.phase(), Phase::Paused);
    assert_eq!(clock.active_countdowns(), 0);

    assert_eq!(
        session.handle(SessionInput::AppActivityChanged { is_active: true }),
        None
    );
    assert_eq!(session.phase(), Phase::Paused);
    assert_eq!(session.remaining_seconds(), Some(26.0));
}

#[test]
fn backgrounding_outside_active_is_ignored() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Grind")]);
    assert_eq!(session.app_activity_changed(false), None);
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
}

#[test]
fn next_is_gated_on_the_countdown() {
    let (clock, mut session) = start(vec![
        ScaledStep::timed(0, "Bloom", 30.0),
        ScaledStep::untimed(1, "Serve"),
    ]);
    assert!(!session.next_enabled());
    assert_eq!(session.apply(Intent::NextStep), None);

    advance(&clock, &mut session, Duration::from_millis(29_900));
    assert_eq!(session.phase(), Phase::Active);
    assert_eq!(session.apply(Intent::NextStep), None);

    session.apply(Intent::Pause);
    assert_eq!(session.apply(Intent::NextStep), None);
    assert_eq!(session.current_step_index(), Some(0));

    session.apply(Intent::Resume);
    advance(&clock, &mut session, Duration::from_millis(100));
    assert!(session.next_enabled());
    assert!(session.apply(Intent::NextStep).is_some());
    assert_eq!(session.current_step_index(), Some(1));
}

#[test]
fn pause_and_resume_on_untimed_step_are_no_ops() {
    let (clock, mut session) = start(vec![ScaledStep::untimed(0, "Weigh beans")]);
    assert_eq!(session.apply(Intent::Pause), None);
    assert_eq!(session.apply(Intent::Resume), None);
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert_eq!(clock.started_countdowns(), 0);
}

#[test]
fn zero_duration_step_is_untimed() {
    let (clock, mut session) = start(vec![
        ScaledStep::timed(0, "Tare the scale", 0.0),
        ScaledStep::timed(1, "Pour", 5.0),
    ]);
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert_eq!(session.remaining_seconds(), None);
    assert_eq!(clock.started_countdowns(), 0);
    session.apply(Intent::NextStep);
    assert_eq!(clock.started_countdowns(), 1);
}

#[test]
fn completed_session_ignores_step_intents() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Serve")]);
    session.apply(Intent::NextStep).unwrap();
    for intent in [Intent::NextStep, Intent::NextStep, Intent::Pause, Intent::Resume, Intent::Start] {
        assert_eq!(session.apply(intent), None);
    }
    assert_eq!(session.phase(), Phase::Completed);
}

#[test]
fn restart_from_the_middle_cancels_the_countdown() {
    let (clock, mut session) = start(vec![
        ScaledStep::untimed(0, "Rinse"),
        ScaledStep::timed(1, "Bloom", 45.0),
        ScaledStep::timed(2, "Pour", 60.0),
    ]);
    session.apply(Intent::NextStep);
    advance(&clock, &mut session, secs(12));
    assert_eq!(clock.active_countdowns(), 1);

    let restarted = session.apply(Intent::Restart).unwrap();
    assert!(matches!(
        restarted,
        Event::SessionRestarted {
            phase: Phase::ReadyToAdvance,
            ..
        }
    ));
    assert_eq!(session.current_step_index(), Some(0));
    assert_eq!(session.remaining_seconds(), None);
    assert_eq!(clock.active_countdowns(), 0);

    // Nothing from the cancelled countdown leaks into the new run.
    assert!(advance(&clock, &mut session, secs(120)).is_empty());
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
}

#[test]
fn exit_cancels_and_reports_position() {
    let (clock, mut session) = start(vec![
        ScaledStep::untimed(0, "Rinse"),
        ScaledStep::timed(1, "Bloom", 45.0),
    ]);
    session.apply(Intent::NextStep);
    assert_eq!(clock.active_countdowns(), 1);
    let exited = session.exit();
    assert!(matches!(
        exited,
        Event::SessionExited {
            step_index: Some(1),
            ..
        }
    ));
    assert_eq!(clock.active_countdowns(), 0);
}

#[test]
fn exit_from_completed_discards_without_saving() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Serve")]);
    session.apply(Intent::NextStep);
    let exited = session.exit();
    assert!(matches!(exited, Event::SessionExited { step_index: None, .. }));
}

#[tokio::test]
async fn failed_save_keeps_session_completed_for_retry() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Serve")]);
    session.apply(Intent::NextStep);
    let store = FlakyStore::failing(1);
    let draft = OutcomeDraft::new(Rating::new(4).unwrap());

    let err = session.save_outcome(&store, draft.clone()).await.unwrap_err();
    assert_eq!(err.reason(), "store offline");
    assert_eq!(session.phase(), Phase::Completed);
    assert_eq!(session.pending_outcome(), Some(&draft));
    assert!(session.saved_outcome().is_none());

    let saved = session.save_outcome(&store, draft).await.unwrap();
    assert!(matches!(
        saved,
        Event::OutcomeSaved {
            rating: 4,
            tag: None,
            ..
        }
    ));
    assert_eq!(store.attempts(), 2);
    assert_eq!(store.inner.len(), 1);
    assert!(session.pending_outcome().is_none());
}

#[tokio::test]
async fn retry_resends_the_pending_draft() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Serve")]);
    session.apply(Intent::NextStep);
    let store = FlakyStore::failing(2);
    let draft = OutcomeDraft::new(Rating::new(2).unwrap())
        .with_tag(TasteTag::Sour)
        .with_note("grind finer next time");

    assert!(session.save_outcome(&store, draft).await.is_err());
    assert!(session.retry_save_outcome(&store).await.is_err());
    session.retry_save_outcome(&store).await.unwrap();

    let saved = store.inner.saved();
    assert_eq!(saved.len(), 1);
    let outcome = &saved[0];
    assert_eq!(outcome.session_id, session.id());
    assert_eq!(outcome.rating.value(), 2);
    assert_eq!(outcome.tag, Some(TasteTag::Sour));
    assert_eq!(outcome.note.as_deref(), Some("grind finer next time"));
    assert_eq!(outcome.inputs.recipe_name, "V60 Classic");
    assert_eq!(outcome.step_count, 1);
    assert!(outcome.completed_at >= outcome.started_at);
}

#[tokio::test]
#[should_panic(expected = "only be saved once the session completed")]
async fn saving_before_completion_panics() {
    let (_clock, mut session) = start(vec![ScaledStep::timed(0, "Steep", 30.0)]);
    let store = FlakyStore::default();
    let _ = session
        .save_outcome(&store, OutcomeDraft::new(Rating::new(3).unwrap()))
        .await;
}

#[tokio::test]
async fn restart_after_completion_clears_the_outcome_draft() {
    let (_clock, mut session) = start(vec![ScaledStep::untimed(0, "Serve")]);
    session.apply(Intent::NextStep);
    let store = FlakyStore::failing(1);
    let _ = session
        .save_outcome(&store, OutcomeDraft::new(Rating::new(5).unwrap()))
        .await;
    assert!(session.pending_outcome().is_some());

    session.apply(Intent::Restart);
    assert_eq!(session.phase(), Phase::ReadyToAdvance);
    assert!(session.pending_outcome().is_none());
    assert!(session.completed_at().is_none());
}
