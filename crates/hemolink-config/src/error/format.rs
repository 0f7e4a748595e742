//! Terminal rendering for configuration errors

use crate::error::ConfigError;
use std::fmt;
use yansi::Paint;

/// Renders a [`ConfigError`] for the terminal, colored when stderr is a tty.
///
/// Field errors name the `HEMOLINK_*` variable that overrides the field.
pub struct ErrorFormatter {
    error: ConfigError,
    use_colors: bool,
}

/// A headline plus labelled detail lines.
struct Rendered {
    headline: String,
    details: Vec<(&'static str, String)>,
}

impl ErrorFormatter {
    pub fn new(error: ConfigError) -> Self {
        Self {
            error,
            use_colors: supports_color(),
        }
    }

    pub fn format(&self) -> String {
        if !self.use_colors {
            return self.error.to_string();
        }
        match self.render() {
            Some(rendered) => paint(&rendered),
            None => self.error.to_string(),
        }
    }

    fn render(&self) -> Option<Rendered> {
        let rendered = match &self.error {
            ConfigError::InvalidEnum {
                field,
                value,
                options,
                hint,
            } => Rendered {
                headline: format!("{} = '{}' is not recognised", field, value),
                details: vec![
                    ("Valid options", options.clone()),
                    ("Hint", hint.clone()),
                    ("Override", env_var(field)),
                ],
            },
            ConfigError::InvalidWeightSum {
                field,
                expected,
                actual,
                hint,
            } => Rendered {
                headline: format!("{} weights sum to {:.3}, expected {}", field, actual, expected),
                details: vec![("Hint", hint.clone())],
            },
            ConfigError::OutOfRange {
                field,
                value,
                min,
                max,
            } => Rendered {
                headline: format!("{} = {} is outside [{}, {}]", field, value, min, max),
                details: vec![("Override", env_var(field))],
            },
            ConfigError::InvalidInteger { field, value, min } => Rendered {
                headline: format!("{} = {} must be greater than {}", field, value, min),
                details: vec![("Override", env_var(field))],
            },
            ConfigError::ValidationError { field, message } => Rendered {
                headline: format!("{}: {}", field, message),
                details: vec![("Override", env_var(field))],
            },
            ConfigError::FileNotFound { path } => Rendered {
                headline: format!("no configuration at {}", path.display()),
                details: vec![(
                    "Hint",
                    "pass --config or create hemolink.yaml in the working directory".to_string(),
                )],
            },
            _ => return None,
        };
        Some(rendered)
    }
}

fn paint(rendered: &Rendered) -> String {
    let mut out = format!("{} {}", "✗".red().bold(), rendered.headline.as_str().bold());
    for (label, value) in &rendered.details {
        out.push_str(&format!("\n  {}: {}", label.cyan(), value));
    }
    out
}

/// `ranking.top_k` -> `HEMOLINK_RANKING_TOP_K`
fn env_var(field: &str) -> String {
    format!("HEMOLINK_{}", field.replace('.', "_").to_uppercase())
}

fn supports_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stderr)
}

impl fmt::Display for ErrorFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
