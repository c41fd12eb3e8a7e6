//! End-to-end scenarios for the keyed-list driver

use std::cell::RefCell;
use std::rc::Rc;

use recoil_animation::{
    spring, AnimationError, PlainStyle, PolicyResult, Style, TransitionMotion, TransitionPolicy,
    TransitionStyle,
};
use recoil_core::{LifecycleState, ManualHost};

const FRAME: f64 = 1000.0 / 60.0;

#[derive(Clone, Debug, PartialEq)]
struct Card {
    title: &'static str,
}

fn card(key: &str, title: &'static str, x: f64) -> TransitionStyle<Card> {
    TransitionStyle::new(key, Card { title }, Style::new().with("x", spring(x)))
}

/// Enter from `x = -50`, leave toward `x = 0`, and log every notification
#[derive(Default)]
struct SlideInOut {
    log: Rc<RefCell<Vec<String>>>,
}

impl TransitionPolicy<Card> for SlideInOut {
    fn will_enter(&mut self, item: &TransitionStyle<Card>) -> PolicyResult<PlainStyle> {
        self.log.borrow_mut().push(format!("enter {}", item.key));
        Ok(PlainStyle::new().with("x", -50.0))
    }

    fn will_leave(&mut self, item: &TransitionStyle<Card>) -> PolicyResult<Option<Style>> {
        self.log.borrow_mut().push(format!("leave {}", item.key));
        Ok(Some(Style::new().with("x", spring(0.0))))
    }

    fn did_leave(&mut self, key: &str, data: &Card) {
        self.log.borrow_mut().push(format!("gone {key} ({})", data.title));
    }
}

fn keys(motion: &TransitionMotion<Card, ManualHost>) -> Vec<&str> {
    motion.merged_keys().collect()
}

fn settle(motion: &mut TransitionMotion<Card, ManualHost>, host: &ManualHost) {
    for _ in 0..2_000 {
        if motion.pending_frame().is_none() {
            return;
        }
        motion.tick(host.advance(FRAME)).expect("tick");
    }
    panic!("keyed motion never settled");
}

#[test]
fn second_list_before_first_tick_is_not_lost() {
    let host = ManualHost::new();
    let policy = SlideInOut::default();
    let log = policy.log.clone();

    let mut motion = TransitionMotion::builder(vec![card("a", "A", 0.0)])
        .policy(policy)
        .mount(host.clone())
        .unwrap();
    motion
        .set_styles(vec![card("a", "A", 0.0), card("b", "B", 10.0)])
        .unwrap();

    motion.tick(host.advance(FRAME)).unwrap();

    assert_eq!(keys(&motion), vec!["a", "b"]);
    assert_eq!(*log.borrow(), vec!["enter b".to_string()]);

    let b = motion.interpolated_styles()[1].style.get("x").unwrap();
    assert!(b > -50.0 && b < 10.0, "b should start from its enter value, got {b}");
}

#[test]
fn lists_replaced_twice_before_a_tick_still_enter_every_item() {
    let host = ManualHost::new();
    let policy = SlideInOut::default();
    let log = policy.log.clone();

    let mut motion = TransitionMotion::builder(Vec::<TransitionStyle<Card>>::new())
        .policy(policy)
        .mount(host.clone())
        .unwrap();
    motion.set_styles(vec![card("a", "A", 0.0)]).unwrap();
    motion
        .set_styles(vec![card("a", "A", 0.0), card("b", "B", 10.0)])
        .unwrap();
    motion.tick(host.advance(FRAME)).unwrap();

    assert_eq!(keys(&motion), vec!["a", "b"]);
    assert_eq!(
        *log.borrow(),
        vec!["enter a".to_string(), "enter b".to_string()]
    );
}

#[test]
fn leaving_items_animate_out_in_place() {
    let host = ManualHost::new();
    let policy = SlideInOut::default();
    let log = policy.log.clone();

    let mut motion = TransitionMotion::builder(vec![
        card("a", "A", 1.0),
        card("b", "B", 1.0),
        card("x", "X", 1.0),
    ])
    .policy(policy)
    .mount(host.clone())
    .unwrap();
    settle(&mut motion, &host);

    motion
        .set_styles(vec![card("c", "C", 1.0), card("b", "B", 1.0), card("d", "D", 1.0)])
        .unwrap();
    motion.tick(host.advance(FRAME)).unwrap();
    assert_eq!(keys(&motion), vec!["a", "c", "b", "x", "d"]);

    settle(&mut motion, &host);
    assert_eq!(keys(&motion), vec!["c", "b", "d"]);
    assert_eq!(motion.state(), LifecycleState::Idle);

    let log = log.borrow();
    assert!(log.contains(&"gone a (A)".to_string()));
    assert!(log.contains(&"gone x (X)".to_string()));
}

#[test]
fn item_returning_while_leaving_keeps_its_state() {
    let host = ManualHost::new();
    let policy = SlideInOut::default();
    let log = policy.log.clone();

    let mut motion = TransitionMotion::builder(vec![card("a", "A", 10.0)])
        .policy(policy)
        .mount(host.clone())
        .unwrap();
    settle(&mut motion, &host);

    motion.set_styles(Vec::new()).unwrap();
    for _ in 0..3 {
        motion.tick(host.advance(FRAME)).unwrap();
    }
    let halfway = motion.interpolated_styles()[0].style.get("x").unwrap();
    assert!(halfway < 10.0 && halfway > 0.0);

    motion.set_styles(vec![card("a", "A", 10.0)]).unwrap();
    motion.tick(host.advance(FRAME)).unwrap();
    // Picked up where it was, no second enter
    let resumed = motion.interpolated_styles()[0].style.get("x").unwrap();
    assert!((resumed - halfway).abs() < 5.0);
    assert!(!log.borrow().iter().any(|entry| entry.starts_with("enter")));
}

#[test]
fn duplicate_keys_are_rejected_at_the_boundary() {
    let host = ManualHost::new();
    let mut motion = TransitionMotion::new(host.clone(), vec![card("a", "A", 0.0)]).unwrap();

    let err = motion
        .set_styles(vec![card("k", "1", 0.0), card("k", "2", 0.0)])
        .unwrap_err();
    assert!(matches!(err, AnimationError::DuplicateKey(ref key) if key == "k"));
    assert_eq!(keys(&motion), vec!["a"]);
}

#[test]
fn invalid_spring_is_rejected_before_animating() {
    let host = ManualHost::new();
    let mut motion = TransitionMotion::new(host.clone(), vec![card("a", "A", 0.0)]).unwrap();

    let broken = Style::new().with(
        "x",
        recoil_animation::SpringValue {
            target: 1.0,
            stiffness: 170.0,
            damping: 26.0,
            precision: 0.0,
        },
    );
    let err = motion
        .set_styles(vec![TransitionStyle::new("a", Card { title: "A" }, broken)])
        .unwrap_err();
    assert!(matches!(err, AnimationError::InvalidSpring { .. }));
}

#[test]
fn host_dispatch_drives_the_list() {
    let host = ManualHost::new();
    let mut motion = TransitionMotion::new(host.clone(), vec![card("a", "A", 0.0)]).unwrap();
    motion.set_styles(vec![card("a", "A", 20.0)]).unwrap();

    for _ in 0..2_000 {
        let now = host.advance(FRAME);
        for id in host.fire_pending() {
            motion.on_frame(id, now).unwrap();
        }
        if motion.state() == LifecycleState::Idle {
            break;
        }
    }
    assert_eq!(motion.interpolated_styles()[0].style.get("x"), Some(20.0));
    assert_eq!(host.pending_count(), 0);
}
