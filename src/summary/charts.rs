//! The donut chart of expenses by category.
//!
//! The chart is an ECharts configuration serialised to JSON and initialised by
//! an inline script once the page has loaded.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Color, JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, summary::aggregation::CategoryExpense};

/// The HTML element ID of the category chart.
pub const CATEGORY_CHART_ID: &str = "category-chart";

/// The script files the chart needs, followed by the script that draws it.
pub fn chart_head_elements(expenses: &[CategoryExpense]) -> Vec<HeadElement> {
    vec![
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        chart_script(CATEGORY_CHART_ID, &category_chart(expenses)),
    ]
}

/// The container the chart is drawn into, or a message when there is nothing to draw.
pub fn chart_container(expenses: &[CategoryExpense]) -> Markup {
    html!(
        @if expenses.is_empty() {
            p class="py-8 text-center text-gray-500 dark:text-gray-400"
            {
                "No expenses for this period."
            }
        } @else {
            div
                id=(CATEGORY_CHART_ID)
                class="min-h-[320px] w-full rounded dark:bg-gray-100"
            {}
        }
    )
}

/// A donut chart with one slice per category, coloured with the category's palette colour.
pub fn category_chart(expenses: &[CategoryExpense]) -> Chart {
    let colors: Vec<Color> = expenses
        .iter()
        .map(|expense| Color::from(expense.color))
        .collect();
    let data: Vec<(f64, &str)> = expenses
        .iter()
        .map(|expense| (expense.amount, expense.name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Expenses by category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("0%"))
        .color(colors)
        .series(
            Pie::new()
                .name("Expenses")
                .radius(vec!["45%", "70%"])
                .data(data),
        )
}

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

/// JavaScript that draws `chart` into the element `id` and follows the
/// browser's dark mode setting.
fn chart_script(id: &str, chart: &Chart) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
            const chartDom = document.getElementById("{id}");
            if (!chartDom) {{
                return;
            }}
            const chart = echarts.init(chartDom);
            chart.setOption({chart});

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }};
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}
