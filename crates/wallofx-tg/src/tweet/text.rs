use itertools::Itertools;

/// Normalizes line endings to `\n` and collapses whitespace inside of each
/// line. The line breaks themselves are kept as is, including empty lines.
pub(crate) fn normalize_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(|line| line.split_whitespace().join(" "))
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_text("a  b\t c"), "a b c");
        assert_eq!(normalize_text(" leading\r\ntrailing  "), "leading\ntrailing");
        assert_eq!(normalize_text("a\r\rb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\n\nb"), "a\n\n\nb");
        assert_eq!(normalize_text(""), "");
    }
}
