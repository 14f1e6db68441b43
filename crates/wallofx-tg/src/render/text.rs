//! Segmentation of the tweet text into entity runs and greedy word wrapping.

use super::fonts::{MeasureText, TextStyle};

const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunKind {
    Plain,
    Url,
    Mention,
    Hashtag,
}

impl RunKind {
    pub(crate) fn is_entity(self) -> bool {
        self != Self::Plain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run<'a> {
    pub(crate) text: &'a str,
    pub(crate) kind: RunKind,
}

/// Splits a single line into plain and entity runs. When several entities
/// start at the same position the first one in the `URL > mention > hashtag`
/// order wins.
pub(crate) fn segment(line: &str) -> Vec<Run<'_>> {
    let patterns = [
        (lazy_regex::regex!(r"https?://\S+"), RunKind::Url),
        (lazy_regex::regex!(r"@\w+"), RunKind::Mention),
        (lazy_regex::regex!(r"#\w+"), RunKind::Hashtag),
    ];

    let mut runs = vec![];
    let mut rest = line;

    while !rest.is_empty() {
        let earliest = patterns
            .iter()
            .filter_map(|(regex, kind)| Some((regex.find(rest)?, *kind)))
            .min_by_key(|(found, _)| found.start());

        let Some((found, kind)) = earliest else {
            runs.push(Run {
                text: rest,
                kind: RunKind::Plain,
            });
            break;
        };

        if found.start() > 0 {
            runs.push(Run {
                text: &rest[..found.start()],
                kind: RunKind::Plain,
            });
        }

        runs.push(Run {
            text: found.as_str(),
            kind,
        });

        rest = &rest[found.end()..];
    }

    runs
}

/// Runs that are not separated by whitespace. They are never split across
/// lines unless the whole word doesn't fit into a line.
type Word<'a> = Vec<Run<'a>>;

fn words<'a>(runs: &[Run<'a>]) -> Vec<Word<'a>> {
    let mut words = vec![];
    let mut word = vec![];

    for &run in runs {
        if run.kind.is_entity() {
            word.push(run);
            continue;
        }

        let mut rest = run.text;

        loop {
            let Some(space) = rest.find(char::is_whitespace) else {
                if !rest.is_empty() {
                    word.push(Run { text: rest, ..run });
                }
                break;
            };

            if space > 0 {
                word.push(Run {
                    text: &rest[..space],
                    ..run
                });
            }

            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }

            rest = rest[space..].trim_start();
        }
    }

    if !word.is_empty() {
        words.push(word);
    }

    words
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    /// Offset from the start of the line
    pub(crate) x: u32,
    pub(crate) text: String,
    pub(crate) kind: RunKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Line {
    pub(crate) fragments: Vec<Fragment>,

    /// Whether the line starts after an explicit line break in the text
    pub(crate) hard_break: bool,
}

impl Line {
    pub(crate) fn is_blank(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Wraps the text into lines that fit into `max_width`. Every `\n` in the
/// text starts a new line, the rest of the lines are produced by the greedy
/// word wrap.
pub(crate) fn wrap(
    text: &str,
    style: TextStyle,
    max_width: u32,
    measure: &dyn MeasureText,
) -> Vec<Line> {
    let mut wrapper = Wrapper {
        measure,
        style,
        max_width,
        space_width: measure.text_width(style, " "),
        lines: vec![],
        line: Line::default(),
        x: 0,
    };

    for (i, source_line) in text.split('\n').enumerate() {
        if i > 0 {
            wrapper.break_line();
            wrapper.line.hard_break = true;
        }

        for word in words(&segment(source_line)) {
            wrapper.push_word(&word);
        }
    }

    wrapper.finish()
}

struct Wrapper<'m> {
    measure: &'m dyn MeasureText,
    style: TextStyle,
    max_width: u32,
    space_width: u32,
    lines: Vec<Line>,
    line: Line,
    x: u32,
}

impl Wrapper<'_> {
    fn width(&self, text: &str) -> u32 {
        self.measure.text_width(self.style, text)
    }

    fn break_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.line));
        self.x = 0;
    }

    fn place(&mut self, text: &str, kind: RunKind, width: u32) {
        self.line.fragments.push(Fragment {
            x: self.x,
            text: text.to_owned(),
            kind,
        });
        self.x += width;
    }

    fn push_word(&mut self, word: &[Run<'_>]) {
        let widths: Vec<u32> = word.iter().map(|run| self.width(run.text)).collect();
        let word_width: u32 = widths.iter().sum();

        if !self.line.is_blank() {
            if self.x + self.space_width + word_width <= self.max_width {
                self.x += self.space_width;
            } else {
                self.break_line();
            }
        }

        if word_width <= self.max_width {
            for (run, width) in word.iter().zip(widths) {
                self.place(run.text, run.kind, width);
            }
            return;
        }

        for (run, width) in word.iter().zip(widths) {
            if self.x + width <= self.max_width {
                self.place(run.text, run.kind, width);
            } else if run.kind.is_entity() {
                self.push_overflowing_entity(*run, width);
            } else {
                self.push_overflowing_plain(run.text);
            }
        }
    }

    /// An entity goes to its own line. If even the whole line is not enough
    /// it is truncated with an ellipsis.
    fn push_overflowing_entity(&mut self, run: Run<'_>, width: u32) {
        if !self.line.is_blank() {
            self.break_line();
        }

        if width <= self.max_width {
            self.place(run.text, run.kind, width);
            return;
        }

        let truncated = ellipsize(run.text, self.style, self.max_width, self.measure);
        let width = self.width(&truncated);
        self.place(&truncated, run.kind, width);
    }

    /// Plain text is broken at character boundaries
    fn push_overflowing_plain(&mut self, text: &str) {
        let mut rest = text;

        while !rest.is_empty() {
            let available = self.max_width.saturating_sub(self.x);
            let fits = longest_fitting_prefix(rest, self.style, available, self.measure);

            // Nothing fits in the remainder of the line. Continue on a new
            // line, where at least one character is always placed.
            let len = match fits {
                0 if !self.line.is_blank() => {
                    self.break_line();
                    continue;
                }
                0 => rest.chars().next().map_or(rest.len(), char::len_utf8),
                len => len,
            };

            let (head, tail) = rest.split_at(len);
            let width = self.width(head);
            self.place(head, RunKind::Plain, width);
            rest = tail;

            if !rest.is_empty() {
                self.break_line();
            }
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.lines.push(self.line);
        self.lines
    }
}

/// Truncates the text with an ellipsis if it doesn't fit into `max_width`
pub(crate) fn ellipsize(
    text: &str,
    style: TextStyle,
    max_width: u32,
    measure: &dyn MeasureText,
) -> String {
    if measure.text_width(style, text) <= max_width {
        return text.to_owned();
    }

    let available = max_width.saturating_sub(measure.text_width(style, ELLIPSIS));
    let len = longest_fitting_prefix(text, style, available, measure);

    format!("{}{ELLIPSIS}", &text[..len])
}

/// Byte length of the longest prefix of `text` that fits into `width`
fn longest_fitting_prefix(
    text: &str,
    style: TextStyle,
    width: u32,
    measure: &dyn MeasureText,
) -> usize {
    let mut fits = 0;
    for (idx, ch) in text.char_indices() {
        let end = idx + ch.len_utf8();
        if measure.text_width(style, &text[..end]) > width {
            break;
        }
        fits = end;
    }
    fits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::FixedAdvance;
    use expect_test::{expect, Expect};
    use std::fmt::Write;

    /// `FixedAdvance` makes every body character 40 px wide
    const CHAR: u32 = 40;

    #[track_caller]
    fn assert_segments(input: &str, expected: Expect) {
        let actual = segment(input)
            .iter()
            .map(|run| format!("{:?}({:?})", run.kind, run.text))
            .collect::<Vec<_>>()
            .join(" ");

        expected.assert_eq(&actual);
    }

    #[track_caller]
    fn assert_wrap(text: &str, max_chars: u32, expected: Expect) {
        let lines = wrap(text, TextStyle::Body, max_chars * CHAR, &FixedAdvance);

        let mut actual = String::new();
        for line in &lines {
            let marker = if line.hard_break { '¶' } else { '|' };
            write!(actual, "{marker}").unwrap();
            for fragment in &line.fragments {
                let kind = if fragment.kind.is_entity() { "*" } else { "" };
                write!(actual, " {}:{kind}{}", fragment.x / CHAR, fragment.text).unwrap();
            }
            actual.push('\n');
        }

        expected.assert_eq(&actual);
    }

    #[test]
    fn segments_entities() {
        assert_segments(
            "hi @user, see https://x.com/a #tag!",
            expect![[r##"Plain("hi ") Mention("@user") Plain(", see ") Url("https://x.com/a") Plain(" ") Hashtag("#tag") Plain("!")"##]],
        );
        assert_segments("", expect![""]);
        assert_segments("plain text", expect![[r#"Plain("plain text")"#]]);
        assert_segments(
            "https://x.com/#tag@user",
            expect![[r#"Url("https://x.com/#tag@user")"#]],
        );
        assert_segments("#привет мир", expect![[r##"Hashtag("#привет") Plain(" мир")"##]]);
    }

    #[test]
    fn wraps_greedily() {
        assert_wrap(
            "the quick brown fox jumps over the lazy dog",
            10,
            expect![[r#"
                | 0:the 4:quick
                | 0:brown 6:fox
                | 0:jumps 6:over
                | 0:the 4:lazy
                | 0:dog
            "#]],
        );
    }

    #[test]
    fn hard_breaks_are_kept() {
        assert_wrap(
            "first\n\nsecond line\nthird",
            100,
            expect![[r#"
                | 0:first
                ¶
                ¶ 0:second 7:line
                ¶ 0:third
            "#]],
        );

        let text = "a\nb c d e f g h\n\nlong line of words here\n";
        for max_chars in [3, 8, 100] {
            let lines = wrap(text, TextStyle::Body, max_chars * CHAR, &FixedAdvance);
            let hard_breaks = lines.iter().filter(|line| line.hard_break).count();
            assert_eq!(hard_breaks, text.matches('\n').count(), "max_chars: {max_chars}");
        }
    }

    #[test]
    fn glued_runs_stay_together() {
        assert_wrap(
            "aaaa (@mention) bbbb",
            12,
            expect![[r#"
                | 0:aaaa
                | 0:( 1:*@mention 9:)
                | 0:bbbb
            "#]],
        );
    }

    #[test]
    fn entity_is_never_split() {
        let text = "see https://example.com/some/long/path and @someone_with_a_long_name";

        for max_chars in [12, 20, 30, 80] {
            let lines = wrap(text, TextStyle::Body, max_chars * CHAR, &FixedAdvance);

            let entities: Vec<&str> = lines
                .iter()
                .flat_map(|line| &line.fragments)
                .filter(|fragment| fragment.kind.is_entity())
                .map(|fragment| fragment.text.as_str())
                .collect();

            for entity in entities {
                let whole = ["https://example.com/some/long/path", "@someone_with_a_long_name"];
                let is_whole = whole.contains(&entity);
                let is_truncated = entity.ends_with(ELLIPSIS)
                    && whole
                        .iter()
                        .any(|whole| whole.starts_with(entity.trim_end_matches(ELLIPSIS)));
                assert!(is_whole || is_truncated, "{entity} at {max_chars}");
            }

            for line in &lines {
                let width = line
                    .fragments
                    .last()
                    .map(|last| last.x + last.text.chars().count() as u32 * CHAR)
                    .unwrap_or(0);
                assert!(width <= max_chars * CHAR, "{line:?}");
            }
        }
    }

    #[test]
    fn overwide_entity_is_truncated() {
        assert_wrap(
            "go https://example.com/very/long now",
            10,
            expect![[r#"
                | 0:go
                | 0:*https://e…
                | 0:now
            "#]],
        );
    }

    #[test]
    fn overwide_plain_word_is_broken_by_chars() {
        assert_wrap(
            "ab abcdefghijklmnopqrstuvwxyz",
            10,
            expect![[r#"
                | 0:ab
                | 0:abcdefghij
                | 0:klmnopqrst
                | 0:uvwxyz
            "#]],
        );
    }

    #[test]
    fn ellipsizes() {
        let max = 6 * CHAR;
        assert_eq!(ellipsize("short", TextStyle::Body, max, &FixedAdvance), "short");
        assert_eq!(ellipsize("longer text", TextStyle::Body, max, &FixedAdvance), "longe…");
    }

    #[test]
    fn empty_text() {
        assert_wrap("", 10, expect![[r#"
            |
        "#]]);
    }
}
