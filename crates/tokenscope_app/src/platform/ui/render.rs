use serde_json::json;
use tokenscope_core::{token_color, AppViewModel, ApiLogEntry, Segment, VisualizationView};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Render the whole screen as lines of ANSI text.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![
        CLEAR_SCREEN.to_string(),
        format!("{BOLD}Tokenscope{RESET}  {DIM}(:help for commands){RESET}"),
        render_tabs(view),
    ];

    if let Some(tab) = view.tabs.iter().find(|tab| tab.is_active) {
        lines.push(format!(
            "Model: {BOLD}{}{RESET}  {DIM}[{}]{RESET}",
            tab.selected_model,
            tab.models.join(", ")
        ));
        if let Some(note) = tab.note {
            lines.push(format!("{DIM}Note: {note}{RESET}"));
        }
    }

    lines.push(String::new());
    lines.push(format!("Text ({} characters):", format_with_commas(view.char_count as u64)));
    if view.text.is_empty() {
        lines.push(format!("{DIM}  (empty){RESET}"));
    } else {
        lines.extend(view.text.lines().map(|line| format!("  {line}")));
    }

    lines.push(String::new());
    let status = if view.loading { "  (counting...)" } else { "" };
    lines.push(format!(
        "Tokens: {BOLD}{}{RESET}{status}",
        format_with_commas(view.token_count)
    ));
    lines.push(format_price(view));

    if let Some(vis) = &view.visualization {
        lines.push(String::new());
        lines.push("Visualization:".to_string());
        lines.extend(render_visualization(vis));
    }

    if let Some(message) = &view.notification {
        lines.push(String::new());
        lines.push(format!("\x1b[31m! {message}{RESET}  {DIM}(:dismiss){RESET}"));
    }

    lines.push(String::new());
    lines.push(format!("{BOLD}API log{RESET} ({} requests)", view.logs.len()));
    for entry in &view.logs {
        lines.extend(render_log_entry(entry));
    }

    lines
}

fn render_tabs(view: &AppViewModel) -> String {
    view.tabs
        .iter()
        .map(|tab| {
            if tab.is_active {
                format!("{BOLD}[{}]{RESET}", tab.name)
            } else {
                format!(" {} ", tab.name)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_price(view: &AppViewModel) -> String {
    let currency = &view.currency;
    match (view.price_local, view.exchange_rate) {
        (Some(local), Some(rate)) => format!(
            "Price: ${:.6} USD  ~ {local:.2} {currency}  {DIM}(1 USD = {rate:.2} {currency}){RESET}",
            view.price_usd
        ),
        _ => format!(
            "Price: ${:.6} USD  {DIM}(no {currency} rate yet){RESET}",
            view.price_usd
        ),
    }
}

/// Coloured text followed by the token list in matching colours.
pub fn render_visualization(vis: &VisualizationView) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from("  ");
    for segment in &vis.segments {
        if segment.text == "\n" {
            lines.push(std::mem::replace(&mut current, String::from("  ")));
        } else {
            current.push_str(&paint_segment(segment));
        }
    }
    lines.push(current);

    lines.push("Tokens:".to_string());
    let tokens: Vec<String> = vis
        .tokens
        .iter()
        .enumerate()
        .map(|(index, token)| {
            let id = vis
                .token_ids
                .get(index)
                .map_or_else(|| "?".to_string(), i64::to_string);
            format!("{}{:?}{RESET}{DIM}#{id}{RESET}", background(index), token)
        })
        .collect();
    lines.push(format!("  {}", tokens.join(" ")));
    lines
}

fn paint_segment(segment: &Segment) -> String {
    match &segment.token {
        Some(mark) => format!("{}{}{RESET}", background(mark.index), segment.text),
        None => segment.text.clone(),
    }
}

/// 24-bit background in the token's pastel colour, with black text.
fn background(index: usize) -> String {
    let (r, g, b) = token_color(index).to_rgb();
    format!("\x1b[48;2;{r};{g};{b}m\x1b[30m")
}

fn render_log_entry(entry: &ApiLogEntry) -> Vec<String> {
    let request = &entry.request;
    let body = json!({
        "text": request.body.text,
        "provider": request.body.provider,
        "model": request.body.model,
        "visualize": request.body.visualize,
    });

    let mut lines = vec![format!(
        "{DIM}#{} {}{RESET} {BOLD}{}{RESET} {}",
        entry.id, entry.timestamp, request.method, request.url
    )];
    lines.extend(
        request
            .headers
            .iter()
            .map(|(name, value)| format!("  {name}: {value}")),
    );
    lines.push("  Request:".to_string());
    lines.extend(indent(&pretty(&body)));
    match &entry.response {
        Some(response) => {
            lines.push(format!("  Response {}:", response.status));
            lines.extend(indent(&response.body));
        }
        None => lines.push(format!("  {DIM}(no response){RESET}")),
    }
    lines
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn indent(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(|line| format!("    {line}"))
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
