//! Result rendering for `pack` and `list`.
//!
//! Human output goes to stdout with console styling; `--json` switches to a
//! single `{operation, status, data|error}` document per invocation.

mod formatter;
mod human;
mod json;

pub use formatter::OutputFormatter;
pub use formatter::PackSummary;

use human::HumanFormatter;
use json::JsonFormatter;

/// Picks the formatter for the global output flags.
pub fn create_formatter(json: bool, verbose: bool, quiet: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter::new(verbose, quiet))
    }
}
