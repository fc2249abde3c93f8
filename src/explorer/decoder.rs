//! Decoder for the line-oriented listing format emitted by remote agents

use super::types::{DirectoryListing, FileEntry};

/// Fields collected for a `Files {` block that has not seen its `Mode:` line yet
#[derive(Debug, Default)]
struct PendingEntry {
    name: Option<String>,
    is_dir: Option<bool>,
    size: Option<u64>,
    mod_time: Option<i64>,
}

impl PendingEntry {
    fn finish(self, mode: String) -> FileEntry {
        FileEntry {
            name: self.name.unwrap_or_default(),
            is_dir: self.is_dir.unwrap_or(false),
            size_bytes: self.size.unwrap_or(0),
            modified_at: self.mod_time.unwrap_or(0),
            mode,
        }
    }
}

/// Decode a raw listing payload. Never fails: anything unusable decodes to
/// [`DirectoryListing::missing`].
pub fn decode(raw: &str) -> DirectoryListing {
    let mut listing = DirectoryListing::missing();
    let mut saw_path = false;
    let mut pending: Option<PendingEntry> = None;

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("Path:") {
            listing.path = quoted_value(line);
            saw_path = true;
        } else if line.starts_with("Exists:") {
            listing.exists = line.contains("true");
        } else if line.starts_with("timezoneOffset:") {
            listing.timezone_offset_seconds = int_value(line);
        } else if line.starts_with("timezone:") {
            listing.timezone = quoted_value(line);
        } else if line.starts_with("Files {") {
            // An unterminated previous block is dropped here
            pending = Some(PendingEntry::default());
        } else if line.starts_with("Mode:") {
            // Mode closes the block; a stray Mode line outside one is ignored
            if let Some(entry) = pending.take() {
                listing.entries.push(entry.finish(quoted_value(line)));
            }
        } else if let Some(entry) = pending.as_mut() {
            if line.starts_with("Name:") {
                entry.name = Some(quoted_value(line));
            } else if line.starts_with("IsDir:") {
                entry.is_dir = Some(line.contains("true"));
            } else if line.starts_with("Size:") {
                entry.size = Some(int_value::<u64>(line));
            } else if line.starts_with("ModTime:") {
                entry.mod_time = Some(int_value(line));
            }
        }
    }

    if !saw_path {
        return DirectoryListing::missing();
    }
    if !listing.exists {
        listing.entries.clear();
    }
    listing
}

/// Text between the first pair of double quotes after the field name, or empty
fn quoted_value(line: &str) -> String {
    let Some((_, rest)) = line.split_once(':') else {
        return String::new();
    };
    let Some(start) = rest.find('"') else {
        return String::new();
    };
    let rest = &rest[start + 1..];
    match rest.find('"') {
        Some(end) => rest[..end].to_string(),
        None => String::new(),
    }
}

/// Integer after the first colon; overflow and garbage become zero
fn int_value<T>(line: &str) -> T
where
    T: std::str::FromStr + Default,
{
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = r#"Path: "C:\Users\alice"
Exists: true
timezone: "IST"
timezoneOffset: 19800
Files {
Name: "notes.txt"
Size: 120
ModTime: 1700000000
Mode: "-rw-r--r--"
}
"#;

    fn block(name: &str, is_dir: Option<bool>) -> String {
        let mut out = format!("Files {{\nName: \"{}\"\n", name);
        if let Some(is_dir) = is_dir {
            out.push_str(&format!("IsDir: {}\n", is_dir));
        }
        out.push_str("Size: 10\nModTime: 1\nMode: \"drwxr-xr-x\"\n}\n");
        out
    }

    #[test]
    fn decodes_single_file_listing() {
        let listing = decode(SCENARIO_A);
        assert_eq!(listing.path, r"C:\Users\alice");
        assert!(listing.exists);
        assert_eq!(listing.timezone, "IST");
        assert_eq!(listing.timezone_offset_seconds, 19800);
        assert_eq!(
            listing.entries,
            vec![FileEntry {
                name: "notes.txt".to_string(),
                is_dir: false,
                size_bytes: 120,
                modified_at: 1_700_000_000,
                mode: "-rw-r--r--".to_string(),
            }]
        );
    }

    #[test]
    fn keeps_block_order() {
        let mut raw = String::from("Path: \"/srv\"\nExists: true\n");
        for name in ["zeta", "alpha", "mid"] {
            raw.push_str(&block(name, Some(true)));
        }
        let names: Vec<_> = decode(&raw).entries.into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn empty_or_pathless_input_is_missing() {
        assert_eq!(decode(""), DirectoryListing::missing());
        let raw = format!("Exists: true\n{}", block("a", None));
        let listing = decode(&raw);
        assert!(!listing.exists);
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn is_dir_defaults_to_false() {
        let raw = format!("Path: \"/\"\nExists: true\n{}", block("etc", None));
        assert!(!decode(&raw).entries[0].is_dir);
    }

    #[test]
    fn unterminated_blocks_are_dropped() {
        let raw = "Path: \"/\"\nExists: true\nFiles {\nName: \"half\"\nSize: 3\nFiles {\nName: \"whole\"\nMode: \"x\"\n}\nFiles {\nName: \"tail\"\n";
        let listing = decode(raw);
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, "whole");
    }

    #[test]
    fn mode_only_block_gives_nameless_entry() {
        let raw = "Path: \"/\"\r\nExists: true\r\nFiles {\r\nMode: \"----------\"\r\n}\r\n";
        let listing = decode(raw);
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, "");
        assert_eq!(listing.entries[0].size_bytes, 0);
    }

    #[test]
    fn bad_numbers_decode_as_zero() {
        let raw = "Path: \"/\"\nExists: true\ntimezoneOffset: east\nFiles {\nSize: 99999999999999999999999\nModTime: -12\nMode: \"m\"\n}\n";
        let listing = decode(raw);
        assert_eq!(listing.timezone_offset_seconds, 0);
        assert_eq!(listing.entries[0].size_bytes, 0);
        assert_eq!(listing.entries[0].modified_at, -12);
    }

    #[test]
    fn missing_quotes_give_empty_path() {
        let listing = decode("Path: /tmp\nExists: true\n");
        assert_eq!(listing.path, "");
        assert!(listing.exists);
    }

    #[test]
    fn not_existing_listing_has_no_entries() {
        let raw = format!("Path: \"/gone\"\nExists: false\n{}", block("x", None));
        let listing = decode(&raw);
        assert_eq!(listing.path, "/gone");
        assert!(listing.entries.is_empty());
    }

    #[test]
    fn fields_may_come_in_any_order_before_mode() {
        let raw = "Path: \"/srv\"\nExists: true\n\
Files {\nModTime: 1700000000\nIsDir: true\nSize: 4096\nName: \"data\"\nMode: \"drwxr-x---\"\n}\n";
        let listing = decode(raw);
        assert_eq!(
            listing.entries,
            vec![FileEntry {
                name: "data".to_string(),
                is_dir: true,
                size_bytes: 4096,
                modified_at: 1_700_000_000,
                mode: "drwxr-x---".to_string(),
            }]
        );
    }

    #[test]
    fn single_line_block_openers() {
        let raw = "Path: \"/srv\"\nExists: true\n\
Files {}\nName: \"a\"\nMode: \"-rw-\"\n\
Files {}\n\
Files {}\nName: \"b\"\nIsDir: true\nMode: \"drw-\"\n";
        let listing = decode(raw);
        let names: Vec<_> = listing.entries.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
        // The empty middle block never saw Mode and is dropped
        assert_eq!(names, vec![("a", false), ("b", true)]);
    }
}
