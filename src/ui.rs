//! Server-rendered interactive page.
//!
//! The form submits `GET /?ticker=...`; the handler runs the quote and hands
//! the outcome back here for rendering.

use crate::data::types::CurrencyPair;
use crate::services::quote::QuoteOutcome;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const TITLE: &str = "📈 Stock Price Analyzer";

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; color: #262730; }
form { display: flex; gap: .5rem; align-items: flex-end; margin: 1rem 0; }
label { display: flex; flex-direction: column; flex: 1; font-size: .9rem; }
input { padding: .5rem; font-size: 1rem; }
button { padding: .55rem 1rem; font-size: 1rem; cursor: pointer; }
.msg { padding: .75rem 1rem; border-radius: .4rem; margin: 1rem 0; }
.success { background: #d4edda; color: #155724; }
.warning { background: #fff3cd; color: #856404; }
.error { background: #f8d7da; color: #721c24; }
figure { margin: 0; }
figcaption { color: #6c757d; font-size: .9rem; text-align: center; }
img { max-width: 100%; }
"#;

/// Escape text for interpolation into HTML bodies and attribute values.
pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_class(outcome: &QuoteOutcome) -> &'static str {
    match outcome {
        QuoteOutcome::Success { .. } => "success",
        QuoteOutcome::Degraded { .. } => "warning",
        QuoteOutcome::NotFound { .. } | QuoteOutcome::MissingTicker { .. } => "error",
    }
}

fn render_outcome(ticker_input: &str, outcome: &QuoteOutcome) -> String {
    let mut html = format!(
        r#"<div class="msg {}">{}</div>"#,
        message_class(outcome),
        html_escape(outcome.message())
    );

    if let Some(chart) = outcome.chart() {
        html.push_str(&format!(
            r#"<figure><img src="/charts/{}" alt="chart"><figcaption>Price Trend of {}</figcaption></figure>"#,
            html_escape(&chart.file_name),
            html_escape(ticker_input)
        ));
    }
    html
}

/// Render the full page. `outcome` is `None` before the first submit.
pub fn render_page(ticker_input: &str, pair: &CurrencyPair, outcome: Option<&QuoteOutcome>) -> String {
    let result = outcome
        .map(|o| render_outcome(ticker_input, o))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
<p>Enter a stock symbol to fetch its latest price in {base} &amp; {target}, along with a trend graph.</p>
<form method="get" action="/">
<label>Enter Stock Symbol (e.g., AAPL, TSLA, MSFT)
<input type="text" name="ticker" value="{value}">
</label>
<button type="submit">Get Stock Price</button>
</form>
{result}
</body>
</html>
"#,
        title = TITLE,
        style = STYLE,
        base = html_escape(&pair.base),
        target = html_escape(&pair.target),
        value = html_escape(ticker_input),
        result = result
    )
}
