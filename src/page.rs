//! Dashboard page - three multi-select filters and the chart container
//!
//! Options come from the dataset; every change posts the current selection
//! to `/api/figure` and redraws the chart with the returned figure.

use crate::config::PageConfig;
use crate::dataset::{Dimension, Table};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn control_id(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Sensor => "sensor",
        Dimension::Signal => "signal",
        Dimension::Track => "track",
    }
}

fn placeholder(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Sensor => "Select sensor types",
        Dimension::Signal => "Select signal processing techniques",
        Dimension::Track => "Select track parameters or irregularities",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn dropdown(table: &Table, dimension: Dimension) -> String {
    let id = control_id(dimension);
    let options: String = table
        .distinct_values(dimension)
        .iter()
        .map(|value| {
            let value = escape_html(value);
            format!("        <option value=\"{value}\">{value}</option>\n")
        })
        .collect();

    format!(
        r#"  <div class="filter">
    <label for="{id}-dropdown">{label}:</label>
    <div class="hint" id="{id}-hint" data-placeholder="{placeholder}">{placeholder}</div>
    <select id="{id}-dropdown" data-dimension="{id}" multiple title="{placeholder}">
{options}    </select>
    <button type="button" data-clear="{id}">Clear</button>
  </div>
"#,
        id = id,
        label = escape_html(dimension.column()),
        placeholder = placeholder(dimension),
        options = options,
    )
}

/// Render the full page for `table`
pub fn render_page(table: &Table, page: &PageConfig) -> String {
    let filters: String = Dimension::ALL.iter().map(|&d| dropdown(table, d)).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{plotly}"></script>
<style>
  body {{ font-family: sans-serif; margin: 0 16px; }}
  .filter {{ width: 30%; display: inline-block; padding: 10px; vertical-align: top; }}
  .filter select {{ width: 100%; min-height: 8em; }}
  .hint {{ color: #777; font-size: 0.9em; margin: 4px 0; }}
  #scatter-3d {{ height: 80vh; }}
</style>
</head>
<body>
<h1>{heading}</h1>
<div id="filters">
{filters}</div>
<div id="scatter-3d"></div>
<script>
  const selects = document.querySelectorAll("select[data-dimension]");

  function updateHint(s) {{
    const hint = document.getElementById(s.dataset.dimension + "-hint");
    const values = Array.from(s.selectedOptions, (o) => o.value);
    hint.textContent = values.length ? values.join(", ") : hint.dataset.placeholder;
  }}

  function currentSelection() {{
    const body = {{}};
    selects.forEach((s) => {{
      const values = Array.from(s.selectedOptions, (o) => o.value);
      body[s.dataset.dimension] = values.length ? values : null;
    }});
    return body;
  }}

  async function refresh() {{
    const resp = await fetch("/api/figure", {{
      method: "POST",
      headers: {{ "Content-Type": "application/json" }},
      body: JSON.stringify(currentSelection()),
    }});
    selects.forEach(updateHint);
    if (!resp.ok) return;
    const fig = await resp.json();
    Plotly.react("scatter-3d", fig.data, fig.layout);
  }}

  selects.forEach((s) => s.addEventListener("change", refresh));
  document.querySelectorAll("button[data-clear]").forEach((b) => {{
    b.addEventListener("click", () => {{
      const s = document.getElementById(b.dataset.clear + "-dropdown");
      Array.from(s.options).forEach((o) => (o.selected = false));
      refresh();
    }});
  }});
  refresh();
</script>
</body>
</html>
"#,
        title = escape_html(&page.title),
        heading = escape_html(&page.heading),
        plotly = PLOTLY_JS,
        filters = filters,
    )
}
