//! Terminal colorization for PlantUML source
//!
//! Applies ANSI escape codes to PlantUML tokens using crossterm.

use crossterm::style::{Color, Stylize};

/// Keywords that open a declaration line
const DECLARATION_KEYWORDS: &[&str] = &[
    "abstract",
    "class",
    "interface",
    "enum",
    "actor",
    "actor/",
    "usecase",
    "usecase/",
    "package",
    "participant",
    "component",
    "start",
    "stop",
];

/// Colorize PlantUML source using ANSI escape codes
///
/// - `@startuml` / `@enduml`: Magenta
/// - Declaration keywords: Cyan
/// - Arrows: Yellow
/// - Member visibility markers: Green
/// - Names and labels: Default (terminal color)
pub fn colorize_puml(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 2);

    for line in input.lines() {
        if line.starts_with('@') {
            result.push_str(&format!("{}", line.with(Color::Magenta)));
        } else {
            result.push_str(&colorize_line(line));
        }
        result.push('\n');
    }

    // Remove trailing newline to match input format
    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    result
}

fn colorize_line(line: &str) -> String {
    let indent_len = line.len() - line.trim_start().len();
    let (indent, body) = line.split_at(indent_len);

    // Class members: `  +name : type`
    if !indent.is_empty() {
        if let Some(marker) = body.chars().next().filter(|c| "+-#~".contains(*c)) {
            let rest = &body[marker.len_utf8()..];
            return format!(
                "{}{}{}",
                indent,
                marker.to_string().with(Color::Green),
                rest
            );
        }
    }

    let mut leading_keywords = true;
    let tokens: Vec<String> = body
        .split(' ')
        .map(|token| {
            if leading_keywords && DECLARATION_KEYWORDS.contains(&token) {
                return format!("{}", token.with(Color::Cyan));
            }
            leading_keywords = false;
            if is_arrow(token) {
                format!("{}", token.with(Color::Yellow))
            } else {
                token.to_string()
            }
        })
        .collect();

    format!("{}{}", indent, tokens.join(" "))
}

/// `-->`, `..|>`, `o--`, `*--`, `->` and friends
fn is_arrow(token: &str) -> bool {
    token.len() >= 2
        && (token.contains('-') || token.contains(".."))
        && token.chars().all(|c| "-.<>|o*".contains(c))
}
