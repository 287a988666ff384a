//! Interactive strategy chooser.

use coverview_core::StrategyId;
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Numbered list of strategies, one per line.
pub fn render_menu() -> String {
    let mut menu = String::from("Available search strategies:\n");
    for id in StrategyId::all() {
        menu.push_str(&format!(
            "   {}. {:<20} {}\n",
            id.menu_key(),
            id.display_name(),
            id.description()
        ));
    }
    menu
}

/// Resolves menu input. Empty input picks the default; anything
/// unrecognized falls back to it with a warning.
pub fn select_strategy(input: &str) -> StrategyId {
    let input = input.trim();
    if input.is_empty() {
        return StrategyId::default();
    }
    StrategyId::from_menu_choice(input).unwrap_or_else(|| {
        let fallback = StrategyId::default();
        warn!("Invalid choice '{}'. Using {}.", input, fallback.display_name());
        fallback
    })
}

/// Resolves a non-interactive `--strategy` value: `all`, a name, or a menu
/// number. Unknown values fall back to the default like [`select_strategy`].
pub fn resolve_strategies(choice: &str) -> Vec<StrategyId> {
    if choice.trim() == "all" {
        return StrategyId::all();
    }
    vec![select_strategy(choice)]
}

/// Prints the menu to `output` and reads one line of `input`.
pub fn prompt_strategy<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<StrategyId> {
    let count = StrategyId::all().len();
    write!(output, "{}", render_menu())?;
    write!(output, "\nSelect strategy (1-{}) [default: 1]: ", count)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let choice = select_strategy(&line);
    writeln!(output, "Selected: {}", choice.display_name())?;
    Ok(choice)
}
