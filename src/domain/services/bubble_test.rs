use ratatui::style::Color;
use ratatui::style::Modifier;

use super::format_inline;
use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[test]
fn it_formats_plain_text_as_one_span() {
    let spans = format_inline("Hello world");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].content, "Hello world");
    assert!(spans[0].style.add_modifier.is_empty());
}

#[test]
fn it_formats_bold_markers() {
    let spans = format_inline("Hi! I'm **Faiz**, your AI companion.");
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].content, "Hi! I'm ");
    assert_eq!(spans[1].content, "Faiz");
    assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
    assert_eq!(spans[2].content, ", your AI companion.");
    assert!(!spans[2].style.add_modifier.contains(Modifier::BOLD));
}

#[test]
fn it_formats_italic_markers() {
    let spans = format_inline("a *b* c");
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[1].content, "b");
    assert!(spans[1].style.add_modifier.contains(Modifier::ITALIC));
}

#[test]
fn it_formats_underscore_italic_markers() {
    let spans = format_inline("a _b_ c");
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0].content, "a ");
    assert_eq!(spans[1].content, "b");
    assert!(spans[1].style.add_modifier.contains(Modifier::ITALIC));
    assert_eq!(spans[2].content, " c");
    assert!(!spans[2].style.add_modifier.contains(Modifier::ITALIC));
}

#[test]
fn it_formats_code_markers() {
    let spans = format_inline("run `/help` for details");
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[1].content, "/help");
    assert_eq!(spans[1].style.fg, Some(Color::Yellow));
}

#[test]
fn it_keeps_asterisks_inside_code_spans() {
    let spans = format_inline("`a * b`");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].content, "a * b");
    assert_eq!(spans[0].style.fg, Some(Color::Yellow));
}

#[test]
fn it_keeps_underscores_inside_code_spans() {
    let spans = format_inline("`snake_case`");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].content, "snake_case");
    assert_eq!(spans[0].style.fg, Some(Color::Yellow));
}

#[test]
fn it_flushes_unclosed_markers() {
    let spans = format_inline("**loud");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].content, "loud");
    assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
}

#[test]
fn it_wraps_a_message_in_borders() {
    let message = Message::new(Author::Assistant, "Hello there\nSecond line");
    let bubble = Bubble::new(&message, BubbleAlignment::Left, 100);
    let lines = bubble.as_lines();

    assert_eq!(lines.len(), 4);
    let top = lines[0]
        .spans
        .iter()
        .map(|span| {
            return span.content.to_string();
        })
        .collect::<String>();
    let bottom = lines[3]
        .spans
        .iter()
        .map(|span| {
            return span.content.to_string();
        })
        .collect::<String>();

    assert!(top.trim_end().starts_with('╭'));
    assert!(top.trim_end().ends_with('╮'));
    assert!(bottom.trim_end().starts_with('╰'));
    assert!(bottom.trim_end().ends_with('╯'));
}

#[test]
fn it_right_aligns_user_bubbles() {
    let message = Message::new(Author::User, "Hello");
    let bubble = Bubble::new(&message, BubbleAlignment::Right, 100);
    let lines = bubble.as_lines();

    let top = lines[0]
        .spans
        .iter()
        .map(|span| {
            return span.content.to_string();
        })
        .collect::<String>();

    assert!(top.starts_with(' '));
    assert!(top.ends_with('╮'));
}

#[test]
fn it_renders_error_bubbles_in_red() {
    let message = Message::new_with_type(Author::Assistant, MessageType::Error, "It broke!");
    let bubble = Bubble::new(&message, BubbleAlignment::Left, 100);
    let lines = bubble.as_lines();

    assert_eq!(lines[0].spans[0].style.fg, Some(Color::Red));
}

#[test]
fn it_survives_a_window_narrower_than_its_borders() {
    let text = ["word"; 10].join(" ");
    let message = Message::new(Author::User, &text);
    let bubble = Bubble::new(&message, BubbleAlignment::Right, 4);
    let lines = bubble.as_lines();

    assert!(lines.len() > 2);
}

#[test]
fn it_word_wraps_long_lines() {
    let text = ["word"; 40].join(" ");
    let message = Message::new(Author::Assistant, &text);
    let bubble = Bubble::new(&message, BubbleAlignment::Left, 50);
    let lines = bubble.as_lines();

    // Borders plus more than one content line.
    assert!(lines.len() > 3);
}
