#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    window_max_width: usize,
}

// Unicode character border + padding.
const BUBBLE_PADDING: usize = 8;
// left border + left padding + (text, not counted) + right padding + right
// border + scrollbar.
const BORDER_ELEMENTS_LENGTH: usize = 5;
const OUTER_PADDING_PERCENTAGE: f32 = 0.04;

fn char_len(text: &str) -> usize {
    return text.chars().count();
}

fn repeat_from_subtractions(text: &str, subtractions: Vec<usize>) -> String {
    let count = subtractions
        .into_iter()
        .map(|e| {
            return i32::try_from(e).unwrap();
        })
        .reduce(|a, b| {
            return a - b;
        })
        .unwrap();

    if count <= 0 {
        return "".to_string();
    }

    return [text].repeat(count.try_into().unwrap()).join("");
}

fn inline_style(bold: bool, italic: bool, code: bool) -> Style {
    let mut style = Style::default();
    if bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if code {
        style = style.fg(Color::Yellow);
    }

    return style;
}

/// Interprets the inline formatting markers of a chat line: `**bold**`,
/// `*italic*` or `_italic_`, and `` `code` ``. Markers style their content
/// rather than being escaped into the output.
pub fn format_inline(line: &str) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = vec![];
    let mut buffer = String::new();
    let mut bold = false;
    let mut italic = false;
    let mut code = false;

    let chars = line.chars().collect::<Vec<char>>();
    let mut idx = 0;
    while idx < chars.len() {
        let marker = match chars[idx] {
            '*' if !code && idx + 1 < chars.len() && chars[idx + 1] == '*' => Some(2),
            '*' | '_' if !code => Some(1),
            '`' => Some(1),
            _ => None,
        };

        if marker.is_none() {
            buffer.push(chars[idx]);
            idx += 1;
            continue;
        }

        if !buffer.is_empty() {
            spans.push(Span::styled(
                buffer.to_string(),
                inline_style(bold, italic, code),
            ));
            buffer.clear();
        }

        match marker.unwrap() {
            2 => bold = !bold,
            _ if chars[idx] == '`' => code = !code,
            _ => italic = !italic,
        }
        idx += marker.unwrap();
    }

    if !buffer.is_empty() {
        spans.push(Span::styled(buffer, inline_style(bold, italic, code)));
    }

    return spans;
}

impl<'a> Bubble<'_> {
    pub fn new(message: &'a Message, alignment: BubbleAlignment, window_max_width: usize) -> Bubble {
        return Bubble {
            alignment,
            message,
            window_max_width,
        };
    }

    pub fn as_lines(&self) -> Vec<Line<'a>> {
        let mut lines: Vec<Line> = vec![];
        let max_line_length = self.get_max_line_length();

        for full_line in self.message.text.lines() {
            if full_line.trim().is_empty() {
                lines.push(self.spans_to_line(vec![Span::from(" ")], max_line_length));
                continue;
            }

            let spans = format_inline(full_line);

            let mut split_spans = vec![];
            let mut line_char_count = 0;

            for span in spans {
                if char_len(&span.content) + line_char_count <= max_line_length {
                    line_char_count += char_len(&span.content);
                    split_spans.push(span);
                    continue;
                }

                let mut word_set: Vec<&str> = vec![];

                for word in span.content.split(' ') {
                    if char_len(word) + line_char_count > max_line_length {
                        split_spans.push(Span::styled(word_set.join(" "), span.style));
                        lines.push(self.spans_to_line(split_spans, max_line_length));

                        split_spans = vec![];
                        word_set = vec![];
                        line_char_count = 0;
                    }

                    word_set.push(word);
                    line_char_count += char_len(word) + 1;
                }

                split_spans.push(Span::styled(word_set.join(" "), span.style));
            }

            lines.push(self.spans_to_line(split_spans, max_line_length));
        }

        return self.wrap_lines_in_bubble(lines, max_line_length);
    }

    fn spans_to_line(&self, mut spans: Vec<Span<'a>>, max_line_length: usize) -> Line<'a> {
        let line_str_len: usize = spans.iter().map(|e| return char_len(&e.content)).sum();
        let fill = repeat_from_subtractions(" ", vec![max_line_length, line_str_len]);
        let formatted_line_length = line_str_len + char_len(&fill) + BUBBLE_PADDING;

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.append(&mut spans);
        wrapped_spans.push(self.highlight_span(format!("{fill} │")));

        let outer_bubble_padding =
            repeat_from_subtractions(" ", vec![self.window_max_width, formatted_line_length]);

        if self.alignment == BubbleAlignment::Left {
            wrapped_spans.push(Span::from(outer_bubble_padding));
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(outer_bubble_padding)];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    fn get_max_line_length(&self) -> usize {
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length =
            ((self.window_max_width as f32 * OUTER_PADDING_PERCENTAGE).ceil()) as usize;

        let line_border_width = BORDER_ELEMENTS_LENGTH + min_bubble_padding_length;

        let mut max_line_length = self
            .message
            .text
            .lines()
            .map(|line| {
                return format_inline(line)
                    .iter()
                    .map(|span| {
                        return char_len(&span.content);
                    })
                    .sum::<usize>();
            })
            .max()
            .unwrap_or(1);

        if max_line_length > self.window_max_width.saturating_sub(line_border_width) {
            max_line_length = self.window_max_width.saturating_sub(line_border_width);
        }

        let username = &self.message.author.to_string();
        if max_line_length < char_len(username) {
            max_line_length = char_len(username);
        }

        return max_line_length;
    }

    fn wrap_lines_in_bubble(&self, lines: Vec<Line<'a>>, max_line_length: usize) -> Vec<Line<'a>> {
        // Add 2 for the vertical bars.
        let inner_bar = ["─"].repeat(max_line_length + 2).join("");
        let top_left_border = "╭";
        let mut top_bar = format!("{top_left_border}{inner_bar}╮");
        let bottom_bar = format!("╰{inner_bar}╯");
        let bar_bubble_padding = repeat_from_subtractions(
            " ",
            vec![self.window_max_width, max_line_length, BUBBLE_PADDING],
        );

        let username = &self.message.author.to_string();
        let top_replace = ["─"].repeat(char_len(username)).join("");
        top_bar = top_bar.replace(
            format!("{top_left_border}{top_replace}").as_str(),
            format!("{top_left_border}{username}").as_str(),
        );

        if self.alignment == BubbleAlignment::Left {
            let mut res = vec![self.highlight_line(format!("{top_bar}{bar_bubble_padding}"))];
            res.extend(lines);
            res.push(self.highlight_line(format!("{bottom_bar}{bar_bubble_padding}")));
            return res;
        }

        let mut res = vec![self.highlight_line(format!("{bar_bubble_padding}{top_bar}"))];
        res.extend(lines);
        res.push(self.highlight_line(format!("{bar_bubble_padding}{bottom_bar}")));
        return res;
    }

    fn highlight_span(&self, text: String) -> Span<'a> {
        if self.message.message_type() == MessageType::Error {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Red),
                    ..Style::default()
                },
            );
        } else if self.message.author == Author::Assistant {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Cyan),
                    ..Style::default()
                },
            );
        }

        return Span::from(text);
    }

    fn highlight_line(&self, text: String) -> Line<'a> {
        return Line::from(self.highlight_span(text));
    }
}
