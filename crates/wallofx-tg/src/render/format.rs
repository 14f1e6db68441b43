use chrono::prelude::*;
use itertools::Itertools;

/// Groups the digits by thousands: `1234567` -> `1,234,567`
pub(crate) fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let digits = digits.as_bytes();

    // The first group takes the remainder, so it may be shorter than 3
    let first = match digits.len() % 3 {
        0 => 3,
        len => len,
    };

    let (head, tail) = digits.split_at(first.min(digits.len()));

    std::iter::once(head)
        .chain(tail.chunks(3))
        .map(|group| std::str::from_utf8(group).unwrap_or_default())
        .join(",")
}

/// `Oct 03, 2022`
pub(crate) fn format_short_date(date: DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// `October 03, 2022 at 08:47 PM`, always in UTC
pub(crate) fn format_full_date(date: DateTime<Utc>) -> String {
    date.format("%B %d, %Y at %I:%M %p").to_string()
}

/// Up to two upper-case letters for the avatar placeholder
pub(crate) fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();

    let initials: String = match words.as_slice() {
        [] => "?".to_owned(),
        [word] => word.chars().take(2).collect(),
        [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
    };

    initials.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts() {
        let cases = [
            (0, "0"),
            (7, "7"),
            (999, "999"),
            (1000, "1,000"),
            (12_345, "12,345"),
            (999_999, "999,999"),
            (1_234_567, "1,234,567"),
            (u64::MAX, "18,446,744,073,709,551,615"),
        ];

        for (count, expected) in cases {
            assert_eq!(format_count(count), expected);
        }
    }

    #[test]
    fn dates() {
        let date = Utc.with_ymd_and_hms(2022, 10, 3, 20, 47, 8).unwrap();
        assert_eq!(format_short_date(date), "Oct 03, 2022");
        assert_eq!(format_full_date(date), "October 03, 2022 at 08:47 PM");
    }

    #[test]
    fn initials_of_names() {
        assert_eq!(initials("John Smith"), "JS");
        assert_eq!(initials("john"), "JO");
        assert_eq!(initials("Ana Maria Lopez"), "AM");
        assert_eq!(initials("Ω"), "Ω");
        assert_eq!(initials("   "), "?");
    }
}
