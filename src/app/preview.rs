//! Inline preview of a remote file's leading bytes

const PREVIEW_LINES: usize = 12;
const MAX_LINE_CHARS: usize = 160;
const HEX_ROW: usize = 16;
/// Bytes inspected when deciding between text and hex
const SNIFF_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading { name: String },
    Ready(Preview),
    Failed { name: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub binary: bool,
    pub total_bytes: usize,
    pub lines: Vec<String>,
    /// More content exists past what `lines` shows
    pub truncated: bool,
}

impl Preview {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let name = name.into();
        if looks_binary(bytes) {
            let rows = bytes.chunks(HEX_ROW).take(PREVIEW_LINES);
            let lines = rows
                .enumerate()
                .map(|(i, row)| hex_row(i * HEX_ROW, row))
                .collect();
            return Self {
                name,
                binary: true,
                total_bytes: bytes.len(),
                lines,
                truncated: bytes.len() > PREVIEW_LINES * HEX_ROW,
            };
        }

        let text = String::from_utf8_lossy(bytes);
        let mut all = text.lines();
        let lines: Vec<String> = all
            .by_ref()
            .take(PREVIEW_LINES)
            .map(|line| line.chars().take(MAX_LINE_CHARS).collect())
            .collect();
        Self {
            name,
            binary: false,
            total_bytes: bytes.len(),
            lines,
            truncated: all.next().is_some(),
        }
    }
}

fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_BYTES)];
    if sample.contains(&0) {
        return true;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => false,
        // A multi-byte char cut off by the sample boundary is still text
        Err(e) => e.error_len().is_some(),
    }
}

fn hex_row(offset: usize, row: &[u8]) -> String {
    let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = row
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!("{:08x}  {:<47}  |{}|", offset, hex.join(" "), ascii)
}
