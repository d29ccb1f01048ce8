use crate::prelude::*;
use dialoguer::console::{user_attended, Color, Style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::FuzzySelect;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use itertools::Itertools;
use std::cmp::Reverse;

/// Lowercase alphanumerics only, so `create-tags` and `CreateTags` meet.
pub fn normalize(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect()
}

/// Options matching `query`, best first. A normalized exact match wins alone.
pub fn candidates<'a>(query: &str, options: &[&'a str]) -> Vec<&'a str> {
    let wanted = normalize(query);
    if let Some(exact) = options.iter().find(|o| normalize(o) == wanted) {
        return vec![*exact];
    }
    let matcher = SkimMatcherV2::default().ignore_case();
    options
        .iter()
        .filter_map(|o| matcher.fuzzy_match(o, query.trim()).map(|score| (score, *o)))
        .sorted_by_key(|&(score, o)| (Reverse(score), o))
        .map(|(_, o)| o)
        .collect()
}

/// Resolves `query` against `options`, prompting when several match and
/// someone is at the terminal.
pub fn resolve<'a>(kind: &str, query: &str, options: &[&'a str]) -> Result<&'a str> {
    let found = candidates(query, options);
    match found.as_slice() {
        [] => bail!("no {kind} matches {query:?}"),
        [one] => Ok(*one),
        many if user_attended() => {
            let idx = select(&f!("Which {kind}?"), many, query)?;
            Ok(many[idx])
        }
        many => bail!("{query:?} matches several {kind}s: {}", many.iter().join(", ")),
    }
}

pub fn select(message: &str, options: &[&str], start_value: &str) -> Result<usize> {
    ensure!(!options.is_empty(), "nothing to select");
    let theme = ColorfulTheme {
        active_item_style: Style::new().fg(Color::Green),
        fuzzy_match_highlight_style: Style::new().fg(Color::Green),
        ..ColorfulTheme::default()
    };
    FuzzySelect::with_theme(&theme)
        .with_prompt(message)
        .with_initial_text(start_value)
        .default(0)
        .items(options)
        .interact_opt()?
        .ok_or_else(|| eyre!("nothing selected"))
}
