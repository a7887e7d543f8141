/// Boxed banner shown when the REPL starts.
pub fn welcome_message(title: &str) -> String {
    let inner = format!("  {}  ·  read-only SQLite file inspector  ", title);
    let width = inner.chars().count();
    let border = "─".repeat(width);
    format!(
        "┌{}┐\n│{}│\n└{}┘\nType .help for commands.",
        border, inner, border
    )
}
