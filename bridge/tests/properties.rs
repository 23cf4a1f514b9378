//! Command-loop properties checked against the scripted in-memory guest.
//!
//! Each property runs over a spread of inputs: ASCII and multi-byte text,
//! lengths on both sides of the input buffer capacity, and blank input.

mod common;

use advent_bridge::command_loop::normalize_command;
use advent_bridge::{LogCategory, Panel, Submission};
use advent_guestapi::{MemGuest, OutputBundle, INPUT_CAPACITY};

use common::*;

fn sample_commands() -> Vec<String> {
    vec![
        "look".into(),
        "  Take LAMP ".into(),
        "ÉCOUTE LE SAMOVAR".into(),
        "говорить с товарищем".into(),
        "x".repeat(255),
        "y".repeat(256),
        "z".repeat(257),
        "a".repeat(300),
        "ж".repeat(200),
        "€".repeat(100),
        format!("{}🜁", "q".repeat(254)),
    ]
}

// ── Property: blank input is a silent no-op ──

#[test]
fn test_blank_input_touches_nothing() {
    let (mut session, mut t) = start_mem(MemGuest::echo());

    for blank in ["", " ", "\t", "\n", "  \r\n  ", "\u{3000}"] {
        assert_eq!(session.submit(&mut t, blank).unwrap(), Submission::Ignored);
    }

    assert!(t.log().is_empty());
    assert_eq!(session.guest().input_ptr_queries(), 0);
    assert!(session.guest().received().is_empty());
}

// ── Property: short commands arrive whole; long ones are cut at a boundary ──

#[test]
fn test_guest_receives_bounded_prefix() {
    let (mut session, mut t) = start_mem(MemGuest::echo());

    for raw in sample_commands() {
        let expected = normalize_command(&raw).unwrap();
        session.submit(&mut t, &raw).unwrap();

        let received = session.guest().received().last().unwrap().clone();
        let text = String::from_utf8(received).expect("guest input must be valid UTF-8");

        if expected.len() <= INPUT_CAPACITY {
            assert_eq!(text, expected);
        } else {
            assert!(text.len() <= INPUT_CAPACITY);
            assert!(expected.starts_with(&text));
            // Nothing more could have fit.
            let next = expected[text.len()..].chars().next().unwrap();
            assert!(text.len() + next.len_utf8() > INPUT_CAPACITY);
        }
    }
}

#[test]
fn test_ascii_over_capacity_sends_exactly_capacity() {
    let (mut session, mut t) = start_mem(MemGuest::echo());

    for n in [257, 300, 1000] {
        session.submit(&mut t, &"a".repeat(n)).unwrap();
    }

    assert_eq!(
        session.guest().received_lengths(),
        vec![INPUT_CAPACITY; 3]
    );
}

// ── Property: one echo, then one output, per command ──

#[test]
fn test_each_command_logs_echo_then_output() {
    let (mut session, mut t) = start_mem(MemGuest::echo());
    let commands = sample_commands();

    for raw in &commands {
        session.submit(&mut t, raw).unwrap();
    }

    let entries = t.log().entries();
    assert_eq!(entries.len(), 2 * commands.len());
    for (pair, raw) in entries.chunks(2).zip(&commands) {
        assert_eq!(pair[0].category, LogCategory::UserInput);
        assert_eq!(pair[0].text, format!("> {}", normalize_command(raw).unwrap()));
        assert_eq!(pair[1].category, LogCategory::SystemOutput);
    }
    assert_eq!(t.scrolled_to(), Some(entries.len() - 1));
}

// ── Property: panels show only the latest bundle ──

#[test]
fn test_panels_replace() {
    let guest = MemGuest::new(|cmd| OutputBundle {
        output: format!("You {}.", cmd),
        image: format!("image of {}", cmd),
        tts: format!("say {}", cmd),
        sfx: String::new(),
    });
    let (mut session, mut t) = start_mem(guest);

    session.submit(&mut t, "sit").unwrap();
    session.submit(&mut t, "stand").unwrap();

    assert_eq!(t.panel(Panel::Image), Some("image of stand"));
    assert_eq!(t.panel(Panel::Tts), Some("say stand"));
    assert_eq!(t.panel(Panel::Sfx), Some(""));
}

// ── Property: nothing cached between commands ──

#[test]
fn test_input_pointer_requeried_every_command() {
    let (mut session, mut t) = start_mem(MemGuest::echo().relocating_input().growing());

    for cmd in ["one", "two", "three", "four"] {
        session.submit(&mut t, cmd).unwrap();
        assert_eq!(t.log().entries().last().unwrap().text, cmd);
    }

    assert_eq!(session.guest().input_ptr_queries(), 4);
    let received: Vec<&[u8]> = session.guest().received().iter().map(Vec::as_slice).collect();
    assert_eq!(received, vec![&b"one"[..], b"two", b"three", b"four"]);
}

#[test]
fn test_init_without_output_still_renders_panels() {
    let (_session, t) = start_mem(MemGuest::echo().with_init(OutputBundle {
        image: "a door".into(),
        ..OutputBundle::default()
    }));

    assert_eq!(t.log().len(), 1);
    assert_eq!(t.log().entries()[0].text, "");
    assert_eq!(t.panel(Panel::Image), Some("a door"));
}

#[test]
fn test_scripted_narrative() {
    let (mut session, mut t) = start_mem(MemGuest::fixed(narrative("You see a room.")));

    session.submit(&mut t, "LOOK").unwrap();

    assert_eq!(log_texts(&t), vec!["> look", "You see a room."]);
    for panel in Panel::ALL {
        assert_eq!(t.panel(panel), Some(""));
    }
}
