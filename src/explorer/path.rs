//! Conversion between displayed remote paths and `cd`/`download` arguments.
//!
//! Displayed paths keep whatever separator style the agent reported. Only the
//! outbound argument is rewritten.

use super::types::WirePath;

const WIRE_SEPARATOR: &str = "\\\\";

/// Replace every `/` or `\` with a doubled backslash
pub fn to_wire_separator(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    for ch in path.chars() {
        match ch {
            '/' | '\\' => out.push_str(WIRE_SEPARATOR),
            other => out.push(other),
        }
    }
    out
}

/// Build the argument for descending from `current` into `child`
pub fn join_child(current: &str, child: &str) -> WirePath {
    WirePath::from_display(&display_child(current, child))
}

impl WirePath {
    /// Escape a displayed or typed path for use as a command argument
    pub fn from_display(path: &str) -> Self {
        WirePath(to_wire_separator(path))
    }
}

/// Display form of `current` joined with `child`, in the agent's own separator style
pub fn display_child(current: &str, child: &str) -> String {
    if current.is_empty() || current.ends_with(['/', '\\']) {
        format!("{}{}", current, child)
    } else if current.contains('\\') {
        format!("{}\\{}", current, child)
    } else {
        format!("{}/{}", current, child)
    }
}

/// Whether a displayed path names the same location as an escaped argument
pub fn matches_wire(display: &str, wire: &WirePath) -> bool {
    to_wire_separator(display.trim_end_matches(['/', '\\'])) == wire.as_str().trim_end_matches('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_both_separator_styles() {
        assert_eq!(to_wire_separator(r"C:\Users/alice"), r"C:\\Users\\alice");
        assert_eq!(to_wire_separator("/var/log"), r"\\var\\log");
        assert_eq!(to_wire_separator("plain"), "plain");
    }

    #[test]
    fn trailing_separator_does_not_double_up() {
        let a = join_child(r"C:\Users", "Docs");
        let b = join_child(r"C:\Users\", "Docs");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), r"C:\\Users\\Docs");
    }

    #[test]
    fn joins_forward_slash_paths() {
        assert_eq!(join_child("/home/op", "logs").as_str(), r"\\home\\op\\logs");
        assert_eq!(join_child("/", "etc").as_str(), r"\\etc");
    }

    #[test]
    fn from_display_escapes_once() {
        let wire = WirePath::from_display(r"C:\Users\alice");
        assert_eq!(wire.to_string(), r"C:\\Users\\alice");
    }

    #[test]
    fn display_child_keeps_agent_style() {
        assert_eq!(display_child(r"C:\Users\alice", "a.txt"), r"C:\Users\alice\a.txt");
        assert_eq!(display_child("/tmp/", "a.txt"), "/tmp/a.txt");
    }

    #[test]
    fn matches_wire_ignores_style_and_trailing_separator() {
        let wire = join_child(r"C:\Users", "alice");
        assert!(matches_wire(r"C:\Users\alice\", &wire));
        assert!(matches_wire("C:/Users/alice", &wire));
        assert!(!matches_wire(r"C:\Users", &wire));
    }
}
