//! Charts for the cash flow page.
//!
//! - **Daily Balance Chart**: the running balance at the end of each day
//! - **Daily Flow Chart**: income, debit expenses and credit card spending per day
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title, VisualMap, VisualMapPiece},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{accounting::DailyTotals, html::HeadElement};

/// The URL of the ECharts library the chart scripts need.
pub(super) const ECHARTS_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js";

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct CashFlowChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for the charts.
pub(super) fn charts_view(charts: &[CashFlowChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for the charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[CashFlowChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Day of month labels for the x-axis, e.g. "1", "2", ... "31".
fn day_labels(series: &[DailyTotals]) -> Vec<String> {
    series.iter().map(|day| day.date.day().to_string()).collect()
}

// ECharts only understands floating point numbers.
fn to_chart_values(amounts: impl Iterator<Item = Decimal>) -> Vec<f64> {
    amounts
        .map(|amount| amount.to_f64().unwrap_or_default())
        .collect()
}

pub(super) fn balance_chart(series: &[DailyTotals], balances: &[Decimal]) -> Chart {
    Chart::new()
        .title(Title::new().text("Balance").subtext("At the end of each day"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(day_labels(series)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .visual_map(VisualMap::new().show(false).pieces(vec![
            VisualMapPiece::new().lt(0).color("red"),
            VisualMapPiece::new().gte(0).color("green"),
        ]))
        .series(
            Line::new()
                .name("Balance")
                .data(to_chart_values(balances.iter().copied())),
        )
}

pub(super) fn daily_flow_chart(series: &[DailyTotals]) -> Chart {
    let flows: [(&str, Vec<f64>); 3] = [
        (
            "Income",
            to_chart_values(series.iter().map(|day| day.income)),
        ),
        (
            "Expenses",
            to_chart_values(series.iter().map(|day| day.debit_expense)),
        ),
        (
            "Credit card",
            to_chart_values(series.iter().map(|day| day.credit_expense)),
        ),
    ];

    let mut chart = Chart::new()
        .title(
            Title::new()
                .text("Daily Flow")
                .subtext("Income and spending per day")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(day_labels(series)),
        )
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        );

    for (name, data) in flows {
        chart = chart.series(
            bar::Bar::new()
                .name(name)
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(data),
        );
    }

    chart
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
