use crate::prelude::*;
use crate::{render, tg, tweet, Result};
use serde::de::DeserializeOwned;

/// Whole application config. Only `TG_TOKEN` is required, everything else
/// has a reasonable default.
pub struct Config {
    pub(crate) tg: tg::Config,
    pub(crate) tweet: tweet::Config,
    pub(crate) render: render::Config,
}

impl Config {
    /// Reads the config from the environment. A missing token or a malformed
    /// value is reported as an error instead of a panic, because it's the
    /// operator's mistake.
    pub fn load() -> Result<Config> {
        Self::from_vars(std::env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Config> {
        let vars: Vec<_> = vars.into_iter().collect();

        Ok(Self {
            tg: from_vars("TG_", &vars)?,
            tweet: from_vars("TWEET_", &vars)?,
            render: from_vars("RENDER_", &vars)?,
        })
    }
}

fn from_vars<T: DeserializeOwned>(prefix: &str, vars: &[(String, String)]) -> Result<T> {
    envy::prefixed(prefix)
        .from_iter(vars.iter().cloned())
        .fatal_ctx(|| format!("Invalid `{prefix}*` environment variables"))
}

pub(crate) fn from_env_or_panic<T: DeserializeOwned>(prefix: &str) -> T {
    envy::prefixed(prefix).from_env().unwrap_or_else(|err| {
        panic!(
            "BUG: Couldn't load config from environment for {}: {:#?}",
            std::any::type_name::<T>(),
            err
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::render::ThemeName;
    use assert_matches::assert_matches;

    fn vars(vars: &[(&str, &str)]) -> Vec<(String, String)> {
        vars.iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn only_the_token_is_required() {
        let config = Config::from_vars(vars(&[("TG_TOKEN", "123:abc"), ("PATH", "/bin")])).unwrap();

        assert_eq!(config.tg.token, "123:abc");
        assert_eq!(config.tweet.api_url.as_str(), "https://api.fxtwitter.com/");
        assert_eq!(config.render.theme, ThemeName::Dark);
        assert!(config.render.output_dir.is_none());
    }

    #[test]
    fn reads_the_render_options() {
        let config = Config::from_vars(vars(&[
            ("TG_TOKEN", "123:abc"),
            ("RENDER_THEME", "sepia"),
            ("RENDER_OUTPUT_DIR", "/tmp/tweets"),
        ]))
        .unwrap();

        assert_eq!(config.render.theme, ThemeName::Sepia);
        assert_eq!(config.render.output_dir.as_deref(), Some(std::path::Path::new("/tmp/tweets")));
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = Config::from_vars(vars(&[("RENDER_THEME", "light")])).err().unwrap();

        assert_matches!(err.kind(), ErrorKind::Fatal { message, .. } if message.contains("TG_"));
    }
}
