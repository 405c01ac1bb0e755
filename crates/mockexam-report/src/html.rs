//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use mockexam_core::report::ExamReport;
use mockexam_core::timer::format_time;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for a submitted attempt.
pub fn generate_html(report: &ExamReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>mockexam results: {}%</title>\n",
        report.percentage
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Exam results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Source: <strong>{}</strong> | {} questions | {}</p>\n",
        html_escape(&report.source),
        report.question_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"score\">{}% ({} of {} correct)</p>\n",
        report.percentage, report.correct_answers, report.question_count
    ));
    html.push_str(&score_bar(report.percentage));

    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Time used</th><td>{} of {}</td></tr>\n",
        format_time(report.time_used_secs),
        format_time(report.duration_secs)
    ));
    html.push_str(&format!(
        "<tr><th>Submitted</th><td>{}</td></tr>\n",
        if report.auto_submitted {
            "automatically, time ran out"
        } else {
            "by candidate"
        }
    ));
    html.push_str(&format!(
        "<tr><th>Missed</th><td>{}</td></tr>\n",
        report.missed().count()
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Your answer</th><th onclick=\"sortTable(3)\">Correct answer</th><th onclick=\"sortTable(4)\">Reference</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (i, r) in report.results.iter().enumerate() {
        let class = if r.is_correct { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            i + 1,
            html_escape(&r.question),
            html_escape(r.answer_label()),
            html_escape(&r.correct_answer),
            html_escape(r.reference.as_deref().unwrap_or("-")),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &ExamReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn score_bar(percentage: u32) -> String {
    let max_width = 400;
    let bar_height = 30;
    let width = percentage.min(100) as usize * max_width / 100;

    let color = if percentage >= 80 {
        "#22c55e"
    } else if percentage >= 50 {
        "#eab308"
    } else {
        "#ef4444"
    };

    format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n  \
         <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"var(--border)\" rx=\"4\"/>\n  \
         <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n</svg>\n",
        max_width, bar_height, max_width, bar_height, width, bar_height, color
    )
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 2rem; font-weight: bold; margin: 0.5rem 0; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.results-table th { cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = Number(va), nb = Number(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
