//! Sunburst figure and dashboard page.
//!
//! The server only builds the plotly figure JSON; plotly.js draws it in the
//! browser. The page is self-contained apart from the plotly.js script tag.

use crate::schema::WheelNode;
use serde::Serialize;
use std::collections::HashSet;

const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Degrees the wheel is turned so January starts at the top.
pub const WHEEL_ROTATION: i32 = 90;

/// Parallel arrays extracted from the merged nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SunburstSeries {
    pub ids: Vec<String>,
    pub labels: Vec<String>,
    pub parents: Vec<String>,
    pub values: Vec<f64>,
    pub categories: Vec<String>,
    pub descriptions: Vec<String>,
}

impl SunburstSeries {
    pub fn from_nodes(nodes: &[WheelNode]) -> Self {
        let mut series = Self::default();
        for node in nodes {
            series.ids.push(node.id.clone());
            series.labels.push(node.label.clone());
            series.parents.push(node.parent.clone());
            series.values.push(node.value);
            series.categories.push(node.category.clone());
            series
                .descriptions
                .push(node.description.clone().unwrap_or_default());
        }
        series
    }
}

/// Plotly figure: `{"data": [trace], "layout": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct SunburstFigure {
    pub data: Vec<SunburstTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct SunburstTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub ids: Vec<String>,
    pub labels: Vec<String>,
    pub parents: Vec<String>,
    pub values: Vec<f64>,
    /// Parent value is what is left over after its children.
    pub branchvalues: &'static str,
    pub rotation: i32,
    pub customdata: Vec<String>,
    pub hovertext: Vec<String>,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub margin: Margin,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
    pub b: u32,
}

impl SunburstFigure {
    pub fn new(series: SunburstSeries, title: &str) -> Self {
        Self {
            data: vec![SunburstTrace {
                trace_type: "sunburst",
                ids: series.ids,
                labels: series.labels,
                parents: series.parents,
                values: series.values,
                branchvalues: "remainder",
                rotation: WHEEL_ROTATION,
                customdata: series.categories,
                hovertext: series.descriptions,
                hovertemplate: "<b>%{label}</b><br>%{customdata}<br>%{hovertext}<extra></extra>",
            }],
            layout: Layout {
                title: Title {
                    text: title.to_string(),
                },
                margin: Margin {
                    t: 60,
                    l: 0,
                    r: 0,
                    b: 0,
                },
            },
        }
    }

    pub fn from_nodes(nodes: &[WheelNode], title: &str) -> Self {
        Self::new(SunburstSeries::from_nodes(nodes), title)
    }
}

/// Everything the dashboard page shows.
pub struct Dashboard<'a> {
    pub title: &'a str,
    pub figure: &'a SunburstFigure,
    pub categories: &'a [String],
    pub selected: &'a HashSet<String>,
    pub edit_url: &'a str,
}

/// Render the dashboard as a standalone HTML page.
pub fn render_dashboard(dashboard: &Dashboard<'_>) -> anyhow::Result<String> {
    let figure_json = script_safe_json(&serde_json::to_string(dashboard.figure)?);

    let options: String = dashboard
        .categories
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = html_escape(c),
                selected = if dashboard.selected.contains(c) {
                    " selected"
                } else {
                    ""
                },
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="sv">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>{css}</style>
</head>
<body>
    <main>
        <label for="categories">Select Categories:</label>
        <select id="categories" multiple size="{size}">
            {options}
        </select>
        <div id="chart"></div>
        <p>You can view and edit the data in this Google Sheet: <a href="{edit_url}" target="_blank" rel="noopener">Edit Google Sheet</a></p>
    </main>
    <script>
const initialFigure = {figure};
{js}
    </script>
</body>
</html>"#,
        title = html_escape(dashboard.title),
        plotly = PLOTLY_JS_URL,
        css = inline_css(),
        size = dashboard.categories.len().clamp(1, 8),
        options = options,
        edit_url = html_escape(dashboard.edit_url),
        figure = figure_json,
        js = inline_javascript(),
    ))
}

fn inline_css() -> &'static str {
    r#"
        body { font-family: system-ui, sans-serif; margin: 0; padding: 1rem 2rem; }
        main { max-width: 1100px; margin: 0 auto; }
        label { display: block; font-weight: 600; margin-bottom: 0.25rem; }
        select { min-width: 16rem; }
        #chart { width: 100%; height: 80vh; }
    "#
}

fn inline_javascript() -> &'static str {
    r#"
const config = { responsive: true };
Plotly.newPlot('chart', initialFigure.data, initialFigure.layout, config);

document.getElementById('categories').addEventListener('change', async (event) => {
    const categories = Array.from(event.target.selectedOptions).map((o) => o.value);
    const resp = await fetch('/api/chart', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ categories }),
    });
    if (!resp.ok) {
        console.error('Failed to refresh chart', resp.status, await resp.text());
        return;
    }
    const figure = await resp.json();
    Plotly.react('chart', figure.data, figure.layout, config);
    const params = new URLSearchParams();
    params.append('select', '1');
    categories.forEach((c) => params.append('categories', c));
    const url = new URL(window.location);
    url.search = params.toString();
    window.history.replaceState(null, '', url);
});
"#
}

/// Keep embedded JSON from closing the surrounding `<script>` element.
fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, parent: &str, value: f64, category: &str) -> WheelNode {
        WheelNode {
            id: id.to_string(),
            label: format!("{} label", id),
            parent: parent.to_string(),
            value,
            description: None,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_series_keeps_order() {
        let nodes = vec![node("Q1", "", 3.0, ""), node("Jan", "Q1", 1.0, "X")];
        let series = SunburstSeries::from_nodes(&nodes);
        assert_eq!(series.ids, vec!["Q1", "Jan"]);
        assert_eq!(series.parents, vec!["", "Q1"]);
        assert_eq!(series.values, vec![3.0, 1.0]);
        assert_eq!(series.categories, vec!["", "X"]);
        assert_eq!(series.labels[1], "Jan label");
    }

    #[test]
    fn test_figure_json_shape() {
        let figure = SunburstFigure::from_nodes(&[node("Jan", "", 9.0, "")], "Årshjul");
        let json = serde_json::to_value(&figure).unwrap();
        let trace = &json["data"][0];
        assert_eq!(trace["type"], "sunburst");
        assert_eq!(trace["rotation"], 90);
        assert_eq!(trace["ids"][0], "Jan");
        assert_eq!(trace["values"][0], 9.0);
        assert_eq!(json["layout"]["title"]["text"], "Årshjul");
    }

    #[test]
    fn test_dashboard_marks_selected_options() {
        let figure = SunburstFigure::from_nodes(&[], "Wheel");
        let categories = vec!["Event".to_string(), "Intern".to_string()];
        let selected: HashSet<String> = ["Event".to_string()].into_iter().collect();
        let html = render_dashboard(&Dashboard {
            title: "Wheel",
            figure: &figure,
            categories: &categories,
            selected: &selected,
            edit_url: "https://example.com/edit?a=1&b=2",
        })
        .unwrap();

        assert!(html.contains(r#"<option value="Event" selected>Event</option>"#));
        assert!(html.contains(r#"<option value="Intern">Intern</option>"#));
        assert!(html.contains("Select Categories:"));
        assert!(html.contains(r#"href="https://example.com/edit?a=1&amp;b=2""#));
    }

    #[test]
    fn test_dashboard_escapes_script_breakout() {
        let figure = SunburstFigure::from_nodes(&[node("</script><b>", "", 1.0, "")], "Wheel");
        let html = render_dashboard(&Dashboard {
            title: "Wheel",
            figure: &figure,
            categories: &[],
            selected: &HashSet::new(),
            edit_url: "#",
        })
        .unwrap();
        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r"<\/script><b>"));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
