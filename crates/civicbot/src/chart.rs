//! Module body and chart JS for a published answer.
//!
//! The body is static HTML (question, data table, SQL). The JS carries the
//! chart configuration the model chose and asks the module runtime to draw
//! it into the body's chart container.

use askama::Template;
use serde_json::json;

use civicbot_core::{ChartSelectResponse, ChartType};

use crate::error::Result;

/// Element id the chart is drawn into.
pub const CHART_CONTAINER: &str = "civicbot-chart";

#[derive(Template)]
#[template(path = "module_body.html")]
struct ModuleBody<'a> {
    question: &'a str,
    table: &'a str,
    sql: &'a str,
}

/// HTML body for a module: the question, the result table, and the SQL behind it.
pub fn render_body(question: &str, sql: &str, table: &str) -> Result<String> {
    let body = ModuleBody {
        question,
        table,
        sql,
    };
    Ok(body.render()?)
}

/// JS that draws the selected chart.
pub fn render_js(chart: &ChartSelectResponse) -> String {
    let chart_type = match chart.chart_type() {
        ChartType::Unknown => {
            tracing::warn!(chart = %chart.chart, "Unrecognized chart type, drawing a bar chart");
            ChartType::Bar
        }
        known => known,
    };

    let config = json!({
        "type": chart_type.to_string(),
        "title": chart.title,
        "valueIsCurrency": chart.value_is_currency,
        "data": chart
            .data
            .iter()
            .map(|d| json!({ "name": d.name, "value": d.value }))
            .collect::<Vec<_>>(),
    });

    // "</" inside an inline script would end the script element.
    let config = config.to_string().replace("</", "<\\/");
    format!("const chartConfig = {config};\nmodule.renderChart(\"#{CHART_CONTAINER}\", chartConfig);")
}
