//! Common utilities and helpers

pub mod path;
pub mod time;
pub mod waveform;

/// Format file size for display
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Keep the last `max_lines` lines of a tool's diagnostic output
pub fn diagnostic_tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_diagnostic_tail() {
        let text = "one\n\ntwo\nthree\nfour\n";
        assert_eq!(diagnostic_tail(text, 2), "three\nfour");
        assert_eq!(diagnostic_tail(text, 10), "one\ntwo\nthree\nfour");
        assert_eq!(diagnostic_tail("", 3), "");
    }
}
