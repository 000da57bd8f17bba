use crate::error::ValidationError;
use crate::models::{ScenarioInput, SimulationResult};
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// 报告元数据
#[derive(Debug, Clone)]
pub struct ReportMetadata {
    pub recipient: String,
    pub generated_at: DateTime<Utc>,
}

/// 校验收件人邮箱 (调用方在渲染前执行)
pub fn validate_recipient(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// 下载文件名: 空白替换为 '-'
pub fn report_file_name(scenario_name: &str) -> String {
    let slug = scenario_name.split_whitespace().collect::<Vec<_>>().join("-");
    format!("roi-report-{}.html", slug)
}

/// HTML 报告渲染器
///
/// 只做展示格式化 (千分位、货币符号、单位)，不再做任何舍入
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        input: &ScenarioInput,
        result: &SimulationResult,
        meta: &ReportMetadata,
    ) -> Result<String, ValidationError> {
        input.validate()?;
        result.validate()?;

        let m = &input.metrics;
        let name = html_escape::encode_text(&input.scenario_name);
        let recipient = html_escape::encode_text(&meta.recipient);

        let mut html = String::with_capacity(8 * 1024);
        // 写入 String 不会失败
        let _ = write!(
            html,
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>ROI Simulation Report - {name}</title>
<style>{css}</style>
</head>
<body>
<div class="container">
<div class="header">
<h1>ROI Simulation Report</h1>
<p>{name}</p>
<p class="generated">Generated on {generated}</p>
</div>
<div class="content">
"#,
            name = name,
            css = REPORT_CSS,
            generated = meta.generated_at.format("%Y-%m-%d %H:%M UTC"),
        );

        html.push_str("<div class=\"section\">\n<h2>Key Results</h2>\n<div class=\"metric-grid\">\n");
        push_metric(&mut html, "metric highlight", "Monthly Savings", &format_currency(result.monthly_savings));
        push_metric(&mut html, "metric highlight", "Payback Period", &format_months(result.payback_months));
        push_metric(&mut html, "metric highlight", "ROI", &format_percent(result.roi_percentage));
        html.push_str("</div>\n<div class=\"metric-grid\">\n");
        push_metric(
            &mut html,
            "metric",
            &format!("Net Savings ({}mo)", format_number(m.time_horizon_months)),
            &format_currency(result.net_savings),
        );
        push_metric(&mut html, "metric", "Cumulative Savings", &format_currency(result.cumulative_savings));
        html.push_str("</div>\n</div>\n");

        html.push_str("<div class=\"section\">\n<h2>Cost Breakdown</h2>\n");
        push_row(&mut html, "Manual Labor Cost (Monthly)", &format_currency(result.labor_cost_manual));
        push_row(&mut html, "Automation Cost (Monthly)", &format_currency(result.auto_cost));
        push_row(&mut html, "Error Savings (Monthly)", &format_currency(result.error_savings));
        html.push_str("</div>\n");

        html.push_str("<div class=\"section\">\n<h2>Input Parameters</h2>\n");
        push_row(&mut html, "Scenario Name", &name);
        push_row(&mut html, "Monthly Invoice Volume", &format_number(m.monthly_invoice_volume));
        push_row(&mut html, "AP Staff Count", &format_number(m.num_ap_staff));
        push_row(&mut html, "Avg Hours per Invoice", &format_number(m.avg_hours_per_invoice));
        push_row(&mut html, "Hourly Wage", &format_money(m.hourly_wage));
        push_row(&mut html, "Manual Error Rate", &format!("{}%", format_number(m.error_rate_manual)));
        push_row(&mut html, "Error Cost", &format_money(m.error_cost));
        push_row(&mut html, "Time Horizon", &format!("{} months", format_number(m.time_horizon_months)));
        push_row(&mut html, "Implementation Cost", &format_money(m.one_time_implementation_cost));
        html.push_str("</div>\n</div>\n");

        let _ = write!(
            html,
            r#"<div class="footer">
<p>Report prepared for: {recipient}</p>
<p>&copy; {year} Invoicing ROI Simulator</p>
</div>
</div>
</body>
</html>
"#,
            recipient = recipient,
            year = meta.generated_at.year(),
        );

        Ok(html)
    }
}

fn push_metric(html: &mut String, class: &str, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<div class=\"{}\"><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>",
        class, label, value
    );
}

fn push_row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<div class=\"data-row\"><span class=\"data-label\">{}</span><span class=\"data-value\">{}</span></div>",
        label, value
    );
}

/// 千分位分组，保留数值原有的小数位
pub fn format_number(value: f64) -> String {
    signed(value, group_thousands(&value.abs().to_string()))
}

/// 结果金额: 至少两位小数，只补零不截断
pub fn format_currency(value: f64) -> String {
    signed(value, format!("${}", group_thousands(&pad_cents(&value.abs().to_string()))))
}

/// 输入金额: 原样显示
pub fn format_money(value: f64) -> String {
    signed(value, format!("${}", group_thousands(&value.abs().to_string())))
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", format_number(v)),
        None => "n/a".to_string(),
    }
}

pub fn format_months(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{} months", format_number(v)),
        None => "n/a".to_string(),
    }
}

fn pad_cents(digits: &str) -> String {
    match digits.split_once('.') {
        Some((_, frac)) if frac.len() >= 2 => digits.to_string(),
        Some(_) => format!("{}0", digits),
        None => format!("{}.00", digits),
    }
}

fn signed(value: f64, body: String) -> String {
    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(digits.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

const REPORT_CSS: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #1e293b; background: #f8fafc; padding: 40px 20px; }
.container { max-width: 800px; margin: 0 auto; background: white; border-radius: 12px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); overflow: hidden; }
.header { background: linear-gradient(135deg, #2563eb 0%, #1e40af 100%); color: white; padding: 40px; text-align: center; }
.header h1 { font-size: 32px; margin-bottom: 8px; }
.header .generated { font-size: 14px; margin-top: 8px; opacity: 0.9; }
.content { padding: 40px; }
.section { margin-bottom: 32px; }
.section h2 { font-size: 20px; margin-bottom: 16px; padding-bottom: 8px; border-bottom: 2px solid #e2e8f0; }
.metric-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin-bottom: 24px; }
.metric { background: #f1f5f9; padding: 20px; border-radius: 8px; }
.metric-label { font-size: 14px; color: #64748b; margin-bottom: 4px; }
.metric-value { font-size: 24px; font-weight: 600; }
.highlight { background: linear-gradient(135deg, #10b981 0%, #059669 100%); color: white; }
.highlight .metric-label { color: rgba(255,255,255,0.8); }
.data-row { display: flex; justify-content: space-between; padding: 12px 0; border-bottom: 1px solid #e2e8f0; }
.data-label { color: #64748b; }
.data-value { font-weight: 500; }
.footer { background: #f8fafc; padding: 24px 40px; text-align: center; color: #64748b; font-size: 14px; }
"#;
