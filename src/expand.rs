//! Alias and variable substitution on a segment's words.

use crate::command::ExitCode;
use crate::env::Environment;
use crate::lexer;
use crate::registry::Aliases;
use crate::session::Session;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\?|\$|[A-Za-z_][A-Za-z0-9_]*)").expect("variable pattern is valid")
});

/// Replace the leading word with its alias body.
///
/// Applied once: the words of the body are not looked up again, and an alias whose body
/// starts with its own name is left alone.
pub fn expand_aliases(words: Vec<String>, aliases: &Aliases) -> Vec<String> {
    let Some(first) = words.first() else {
        return words;
    };
    let Some(body) = aliases.get(first) else {
        return words;
    };
    let replacement = lexer::split_into_words(body)
        .unwrap_or_else(|_| body.split_whitespace().map(String::from).collect());
    if replacement.first() == Some(first) {
        return words;
    }
    tracing::trace!("alias {} -> {:?}", first, replacement);
    replacement
        .into_iter()
        .chain(words.into_iter().skip(1))
        .collect()
}

/// Substitute `$?`, `$$` and `$NAME` in every word.
///
/// Substituted text is not scanned again. A word made only of variables that expand to
/// nothing is dropped instead of becoming an empty argument.
pub fn expand_variables(
    words: Vec<String>,
    env: &Environment,
    last_status: ExitCode,
    pid: u32,
) -> Vec<String> {
    words
        .into_iter()
        .filter_map(|word| {
            if !word.contains('$') {
                return Some(word);
            }
            let expanded = VAR_PATTERN
                .replace_all(&word, |caps: &Captures| match &caps[1] {
                    "?" => last_status.to_string(),
                    "$" => pid.to_string(),
                    name => env.get_var(name).unwrap_or_default().to_string(),
                })
                .into_owned();
            (!expanded.is_empty()).then_some(expanded)
        })
        .collect()
}

/// Alias substitution followed by variable substitution, as run before dispatch.
pub fn expand(words: Vec<String>, session: &Session) -> Vec<String> {
    let words = expand_aliases(words, &session.aliases);
    expand_variables(
        words,
        &session.env,
        session.last_status,
        std::process::id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &[&str]) -> Vec<String> {
        s.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_alias_replaces_first_word_only() {
        let mut aliases = Aliases::new();
        aliases.set("ll", "ls -l");
        let out = expand_aliases(words(&["ll", "/tmp", "ll"]), &aliases);
        assert_eq!(out, words(&["ls", "-l", "/tmp", "ll"]));
    }

    #[test]
    fn test_alias_is_not_recursive() {
        let mut aliases = Aliases::new();
        aliases.set("a", "b x");
        aliases.set("b", "c y");
        assert_eq!(expand_aliases(words(&["a"]), &aliases), words(&["b", "x"]));
    }

    #[test]
    fn test_self_referencing_alias_left_alone() {
        let mut aliases = Aliases::new();
        aliases.set("ls", "ls --color");
        assert_eq!(expand_aliases(words(&["ls"]), &aliases), words(&["ls"]));
    }

    #[test]
    fn test_status_and_pid() {
        let env = Environment::detached(".");
        let out = expand_variables(words(&["echo", "$?", "$$", "x$?y"]), &env, 2, 4242);
        assert_eq!(out, words(&["echo", "2", "4242", "x2y"]));
    }

    #[test]
    fn test_named_variables() {
        let mut env = Environment::detached(".");
        env.set_var("HOME", "/home/me");
        let out = expand_variables(words(&["cd", "$HOME/src", "$HOME:$HOME"]), &env, 0, 1);
        assert_eq!(out, words(&["cd", "/home/me/src", "/home/me:/home/me"]));
    }

    #[test]
    fn test_unset_variable_word_is_dropped() {
        let env = Environment::detached(".");
        let out = expand_variables(words(&["echo", "$NOPE", "a$NOPE"]), &env, 0, 1);
        assert_eq!(out, words(&["echo", "a"]));
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let env = Environment::detached(".");
        let out = expand_variables(words(&["echo", "$", "5$", "$1"]), &env, 0, 1);
        assert_eq!(out, words(&["echo", "$", "5$", "$1"]));
    }

    #[test]
    fn test_substitution_not_rescanned() {
        let mut env = Environment::detached(".");
        env.set_var("A", "$B");
        env.set_var("B", "oops");
        assert_eq!(expand_variables(words(&["$A"]), &env, 0, 1), words(&["$B"]));
    }

    #[test]
    fn test_empty_word_without_dollar_is_kept() {
        let env = Environment::detached(".");
        assert_eq!(expand_variables(words(&["echo", ""]), &env, 0, 1), words(&["echo", ""]));
    }
}
