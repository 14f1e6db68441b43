use easy_ext::ext;

pub(crate) mod prelude {
    pub(crate) use super::ErrorExt as _;
    pub(crate) use super::StrExt as _;
}

#[ext(ErrorExt)]
pub(crate) impl<E> E
where
    E: std::error::Error + ?Sized,
{
    fn display_chain(&self) -> display_error_chain::DisplayErrorChain<&Self> {
        display_error_chain::DisplayErrorChain::new(self)
    }
}

#[ext(StrExt)]
pub(crate) impl str {
    /// Cuts the string to at most `max_chars` characters, appending `suffix`
    /// if anything was cut off. Never splits a multibyte character.
    fn truncate_chars(&self, max_chars: usize, suffix: &str) -> String {
        match self.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => format!("{}{suffix}", &self[..byte_idx]),
            None => self.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars() {
        assert_eq!("hello".truncate_chars(5, "..."), "hello");
        assert_eq!("hello!".truncate_chars(5, "..."), "hello...");
        assert_eq!("привет мир".truncate_chars(6, "…"), "привет…");
        assert_eq!("".truncate_chars(0, "..."), "");
    }
}
