// utils module - small display helpers

/// shorten a path for display, keeping its tail (`...` + last 27 chars past 30)
pub fn display_path(path: &str) -> String {
    let chars: Vec<char> = path.chars().collect();
    if chars.len() <= 30 {
        return path.to_string();
    }

    let tail: String = chars[chars.len() - 27..].iter().collect();
    format!("...{tail}")
}

/// "1 file" / "3 files"
pub fn plural(count: usize, noun: &str) -> String {
    format!("{count} {noun}{}", if count == 1 { "" } else { "s" })
}
