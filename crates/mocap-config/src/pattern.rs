//! Shell-style matching of static calibration trials.

use regex::Regex;

use crate::error::ConfigError;

/// Glob identifying static trials.
///
/// Supports `*`, `?`, and bracket classes (`[Ss]`, `[0-9]`, `[!x]`). An
/// unterminated `[` matches itself.
/// A trial file matches when its whole name matches `<pattern>.trc`.
#[derive(Debug, Clone)]
pub struct StaticPattern {
    glob: String,
    regex: Regex,
}

impl StaticPattern {
    pub fn new(glob: &str) -> Result<Self, ConfigError> {
        let trimmed = glob.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: glob.to_string(),
                message: "pattern is empty".to_string(),
            });
        }
        let regex_source = glob_to_regex(&format!("{trimmed}.trc"));
        let regex = Regex::new(&regex_source).map_err(|e| ConfigError::InvalidPattern {
            pattern: glob.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            glob: trimmed.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }

    /// Whether a marker file name (e.g. `subject_static01.trc`) is a static trial.
    pub fn matches_file(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Whether a trial base name is a static trial.
    pub fn matches_trial(&self, trial: &str) -> bool {
        self.matches_file(&format!("{trial}.trc"))
    }
}

/// Translate a shell glob into an anchored regular expression.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut source = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            '[' => match bracket_class(&chars[i + 1..]) {
                Some((class, consumed)) => {
                    source.push_str(&class);
                    i += consumed;
                }
                None => source.push_str(r"\["),
            },
            other => source.push_str(&regex::escape(&other.to_string())),
        }
        i += 1;
    }
    source.push('$');
    source
}

/// Regex class for the bracket expression following a `[`.
///
/// Returns the class and the number of glob characters it consumed, or
/// `None` when there is no closing `]`. A `]` right after `[` or `[!` is a
/// literal member.
fn bracket_class(rest: &[char]) -> Option<(String, usize)> {
    let mut j = 0;
    let negated = rest.first() == Some(&'!');
    if negated {
        j += 1;
    }
    if rest.get(j) == Some(&']') {
        j += 1;
    }
    let close = j + rest[j..].iter().position(|&c| c == ']')?;
    let start = usize::from(negated);
    let mut class = String::from(if negated { "[^" } else { "[" });
    for (offset, &ch) in rest[start..close].iter().enumerate() {
        match ch {
            '\\' | '[' | ']' | '&' | '~' | '|' => {
                class.push('\\');
                class.push(ch);
            }
            '^' if offset == 0 => class.push_str(r"\^"),
            other => class.push(other),
        }
    }
    class.push(']');
    Some((class, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_matches_static_trials() {
        let pattern = StaticPattern::new("*static*").unwrap();
        assert!(pattern.matches_file("S01_static.trc"));
        assert!(pattern.matches_file("static.trc"));
        assert!(pattern.matches_trial("S01_static_2"));
        assert!(!pattern.matches_file("S01_walk.trc"));
        assert!(!pattern.matches_file("S01_static.mot"));
    }

    #[test]
    fn literal_characters_are_escaped() {
        let pattern = StaticPattern::new("cal.?").unwrap();
        assert!(pattern.matches_file("cal.1.trc"));
        assert!(!pattern.matches_file("calx1.trc"));
    }

    #[test]
    fn bracket_classes_select_characters() {
        let pattern = StaticPattern::new("[Ss]tatic*").unwrap();
        assert!(pattern.matches_file("Static01.trc"));
        assert!(pattern.matches_file("static_a.trc"));
        assert!(!pattern.matches_file("xstatic.trc"));

        let ranged = StaticPattern::new("cal[0-9]").unwrap();
        assert!(ranged.matches_trial("cal3"));
        assert!(!ranged.matches_trial("calx"));
    }

    #[test]
    fn negated_classes_exclude_characters() {
        let pattern = StaticPattern::new("*static[!_]*").unwrap();
        assert!(pattern.matches_file("S01_static1.trc"));
        assert!(!pattern.matches_file("S01_static_1.trc"));
    }

    #[test]
    fn unterminated_bracket_is_literal() {
        let pattern = StaticPattern::new("cal[1").unwrap();
        assert!(pattern.matches_file("cal[1.trc"));
        assert!(!pattern.matches_file("cal1.trc"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(matches!(
            StaticPattern::new("  "),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
