use kinema_animation::{AnimationEngine, PlayState, Scheduler, ScrollEventKind, ScrollTracker};
use kinema_core::{Bounds, Element, Property, PropertyMap};
use kinema_motion::{AnimationOptions, Animator, Host, MotionConfig, ScrollTriggerOptions};
use std::sync::{Arc, Mutex};

fn x(value: f32) -> PropertyMap {
    PropertyMap::new().with(Property::X, value)
}

#[test]
fn test_create_then_get_returns_same_handle() -> anyhow::Result<()> {
    let scheduler = Scheduler::new();
    let animator = Animator::with_host(Host::new().with_engine(scheduler.clone()))?;

    let first = animator.create_timeline("hero", &AnimationOptions::new());
    assert_eq!(animator.get_timeline("hero"), Some(first));

    let second = animator.create_timeline("hero", &AnimationOptions::new());
    assert_eq!(animator.get_timeline("hero"), Some(second));
    assert_eq!(animator.timelines().len(), 1);

    // replacing a name doesn't stop the old timeline
    assert!(scheduler.state(first).is_some());
    Ok(())
}

#[test]
fn test_timeline_options_are_honoured() -> anyhow::Result<()> {
    let scheduler = Scheduler::new();
    let animator = Animator::with_host(Host::new().with_engine(scheduler.clone()))?;
    let el = Element::new();

    let options = AnimationOptions::new()
        .delay(0.5)
        .repeat(1)
        .extra("yoyo", serde_json::Value::Bool(true));
    let handle = animator.create_timeline("swing", &options);
    animator.add_to_timeline("swing", &el, &x(10.0), &AnimationOptions::new().duration(1.0).ease("linear"));

    scheduler.advance(0.5);
    assert_eq!(el.get(&Property::X), 0.0);

    scheduler.advance(1.0);
    assert_eq!(el.get(&Property::X), 10.0);

    scheduler.advance(1.0);
    assert_eq!(el.get(&Property::X), 0.0);
    assert_eq!(scheduler.state(handle), Some(PlayState::Finished));
    Ok(())
}

#[test]
fn test_controls_on_unknown_names_are_noops() -> anyhow::Result<()> {
    let scheduler = Scheduler::new();
    let animator = Animator::with_host(Host::new().with_engine(scheduler.clone()))?;

    animator.play_timeline("nope");
    animator.pause_timeline("nope");
    animator.reverse_timeline("nope");
    animator.restart_timeline("nope");

    assert_eq!(animator.get_timeline("nope"), None);
    assert_eq!(scheduler.count(), 0);
    Ok(())
}

#[test]
fn test_kill_all_reaches_named_timelines_unless_scoped() -> anyhow::Result<()> {
    let scheduler = Scheduler::new();
    let animator = Animator::with_host(Host::new().with_engine(scheduler.clone()))?;
    let handle = animator.create_timeline("loop", &AnimationOptions::new());
    animator.kill_all();
    assert_eq!(scheduler.state(handle), None);

    let scheduler = Scheduler::new();
    let config = MotionConfig::from_toml_str("scoped_kill_all = true")?;
    let animator =
        Animator::with_config(Host::new().with_engine(scheduler.clone()), config)?;
    let handle = animator.create_timeline("loop", &AnimationOptions::new());
    animator.kill_all();
    assert!(scheduler.state(handle).is_some());
    Ok(())
}

#[test]
fn test_scroll_trigger_starts_preset() -> anyhow::Result<()> {
    let scheduler = Scheduler::new();
    let tracker = ScrollTracker::new(800.0);
    let host = Host::new()
        .with_engine(scheduler.clone())
        .with_scroll_observer(tracker.clone());
    let animator = Arc::new(Animator::with_host(host)?);

    let card = Element::new().with_bounds(Bounds::new(1200.0, 300.0));
    card.set(Property::Opacity, 0.0);

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let handle = {
        let trigger_animator = animator.clone();
        let card_handle = card.clone();
        let kinds = kinds.clone();
        animator.scroll_trigger(
            &card,
            move |event| {
                kinds.lock().unwrap().push(event.kind);
                if event.kind == ScrollEventKind::Enter {
                    trigger_animator.fade_in(&card_handle, &AnimationOptions::new().duration(0.5));
                }
            },
            &ScrollTriggerOptions::new().start("top center").markers(true),
        )
    };
    assert!(handle.is_some());

    // trigger line sits at 1200 - 400 = 800
    tracker.set_scroll(700.0);
    tracker.update();
    assert!(kinds.lock().unwrap().is_empty());

    tracker.set_scroll(900.0);
    tracker.update();
    assert_eq!(*kinds.lock().unwrap(), vec![ScrollEventKind::Enter]);
    assert_eq!(animator.active_count(), 1);

    scheduler.advance(0.5);
    assert_eq!(card.get(&Property::Opacity), 1.0);

    assert_eq!(animator.kill_scroll_triggers(), 1);
    assert_eq!(tracker.count(), 0);
    Ok(())
}
