// Startup Banner
// Human readable summary printed to the console once the server is bound.

use crate::quotes::Theme;
use crate::speed::SpeedLabel;

const INNER_WIDTH: usize = 62;

fn line(text: &str) -> String {
    format!("║  {:<width$}║", text, width = INNER_WIDTH - 2)
}

fn rule(left: char, right: char) -> String {
    format!("{}{}{}", left, "═".repeat(INNER_WIDTH), right)
}

/// Render the banner for a server reachable at `base_url`
pub fn render(base_url: &str, port: u16) -> String {
    let themes = Theme::ALL
        .iter()
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    let speeds = SpeedLabel::ALL
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    [
        rule('╔', '╗'),
        line("QuoteSim - Mock OpenAI Server"),
        rule('╠', '╣'),
        line(&format!("Endpoint: {}/v1/chat/completions", base_url)),
        line(&format!("Port: {}", port)),
        rule('╠', '╣'),
        line(&format!("Themes: {}", themes)),
        line(&format!("Speeds: {}", speeds)),
        line("Note: Random selection per request (no dynamic control)"),
        rule('╠', '╣'),
        line("Press Ctrl+C to stop"),
        rule('╚', '╝'),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_contents() {
        let banner = render("http://127.0.0.1:8080", 8080);
        assert!(banner.contains("http://127.0.0.1:8080/v1/chat/completions"));
        assert!(banner.contains("Port: 8080"));
        assert!(banner.contains("Star Wars, Computer, Rick & Morty, GoT, LOTR, Matrix"));
        assert!(banner.contains("slow, normal, fast, superfast, randomized"));
    }

    #[test]
    fn test_banner_is_boxed() {
        let banner = render("http://localhost:9000", 9000);
        let widths: Vec<usize> = banner.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == INNER_WIDTH + 2));
    }
}
