//! Chart page rendering
//!
//! Renders a self-contained HTML page with inline styling, the series data embedded
//! as script literals and Chart.js (loaded from a CDN) driving the interactive chart.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;
use crate::errors::ChartError;
use crate::models::observation::SamplingHour;
use crate::series::{FlatSeries, HourSeries, HourlySeries, YearlySeries};

const CHART_JS_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

const TITLE: &str = "杭州天气温度记录";

/// Renders the per-year chart page, with year and range filters
///
/// # Arguments
///
/// * 'series' - per-year series over the canonical year
/// * 'generated_at' - timestamp shown as generation time
pub fn render_yearly_page(series: &YearlySeries, generated_at: NaiveDateTime) -> Result<String, ChartError> {
    let years = series.years.keys().map(|y| year_key(*y)).collect::<Vec<String>>();
    let latest_year = series.latest_year().map(year_key).unwrap_or_default();

    let data = format!(
        r#"const labels = {labels};
const years = {years};
const latestYear = {latest_year};
const baseYear = {base_year};
const tempByYear = {temperature};
const humByYear = {humidity};
const weatherByYear = {weather};"#,
        labels = script_literal(&series.labels())?,
        years = script_literal(&years)?,
        latest_year = script_literal(&latest_year)?,
        base_year = series.base_year,
        temperature = script_literal(&by_year(series, |hs| &hs.temperature))?,
        humidity = script_literal(&by_year(series, |hs| &hs.humidity))?,
        weather = script_literal(&by_year(series, |hs| &hs.weather))?,
    );

    let controls = format!(
        "{}\n{}\n{}",
        render_year_chips(&years, &latest_year),
        range_filter(),
        mode_toolbar(),
    );

    Ok(render_document(
        render_header(&series.temperature_counts(), generated_at),
        controls,
        data,
        yearly_javascript(),
    ))
}

/// Renders the chart page with all dates on one axis
///
/// # Arguments
///
/// * 'series' - flat series over the observed dates
/// * 'generated_at' - timestamp shown as generation time
pub fn render_flat_page(series: &FlatSeries, generated_at: NaiveDateTime) -> Result<String, ChartError> {
    let data = format!(
        r#"const labels = {labels};
const tempByHour = {temperature};
const humByHour = {humidity};
const weatherByHour = {weather};"#,
        labels = script_literal(&series.labels())?,
        temperature = script_literal(&by_hour(&series.hours, |hs| &hs.temperature))?,
        humidity = script_literal(&by_hour(&series.hours, |hs| &hs.humidity))?,
        weather = script_literal(&by_hour(&series.hours, |hs| &hs.weather))?,
    );

    Ok(render_document(
        render_header(&series.temperature_counts(), generated_at),
        mode_toolbar().to_string(),
        data,
        flat_javascript(),
    ))
}

/// Writes a rendered page to disk, replacing any existing file
///
/// # Arguments
///
/// * 'path' - output file path
/// * 'html' - the rendered page
pub fn write_page(path: &Path, html: &str) -> Result<(), ChartError> {
    fs::write(path, html).map_err(|e| ChartError::Write(path.to_path_buf(), e))?;
    info!("chart written to {}", path.display());

    Ok(())
}

fn year_key(year: i32) -> String {
    format!("{:04}", year)
}

fn by_hour<'a, T: Serialize>(hourly: &'a HourlySeries, pick: impl Fn(&'a HourSeries) -> &'a T) -> BTreeMap<&'static str, &'a T> {
    hourly.iter().map(|(h, hs)| (h.key(), pick(hs))).collect()
}

fn by_year<'a, T: Serialize>(
    series: &'a YearlySeries,
    pick: impl Fn(&'a HourSeries) -> &'a T + Copy,
) -> BTreeMap<String, BTreeMap<&'static str, &'a T>> {
    series.years.iter().map(|(y, hourly)| (year_key(*y), by_hour(hourly, pick))).collect()
}

/// Serializes a value as a javascript literal safe to place inside a script element
fn script_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, ChartError> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn render_document(header: String, controls: String, data: String, script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="preconnect" href="https://fonts.googleapis.com" />
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin />
  <link href="https://fonts.googleapis.com/css2?family=IBM+Plex+Sans:wght@300;400;600&family=ZCOOL+XiaoWei&display=swap" rel="stylesheet" />
  <script src="{chart_js}"></script>
  <style>{css}</style>
</head>
<body>
  <div class="card">
    {header}
    {controls}
    <div class="chart-wrap">
      <canvas id="weatherChart"></canvas>
    </div>
  </div>
  <script>
{data}
{common}
{script}
  </script>
</body>
</html>
"#,
        title = TITLE,
        chart_js = CHART_JS_URL,
        css = inline_css(),
        header = header,
        controls = controls,
        data = data,
        common = common_javascript(),
        script = script,
    )
}

fn render_header(counts: &BTreeMap<SamplingHour, usize>, generated_at: NaiveDateTime) -> String {
    let records = SamplingHour::ALL
        .iter()
        .map(|h| format!("<span>{} 记录 {} 条</span>", h, counts.get(h).copied().unwrap_or(0)))
        .collect::<Vec<String>>()
        .join("\n        ");

    format!(
        r#"<header>
      <h1>{title}</h1>
      <div class="meta">
        <span>更新于: {generated_at}</span>
        {records}
      </div>
    </header>"#,
        title = TITLE,
        generated_at = generated_at.format("%Y-%m-%d %H:%M"),
        records = records,
    )
}

fn render_year_chips(years: &[String], latest_year: &str) -> String {
    let chips = years
        .iter()
        .map(|y| {
            let checked = if y == latest_year { " checked" } else { "" };
            format!(r#"<label class="year-chip"><input type="checkbox" value="{y}"{checked}><span>{y}</span></label>"#)
        })
        .collect::<Vec<String>>()
        .join("\n      ");

    format!(
        r#"<div class="year-filter">
      <span>年份</span>
      {chips}
    </div>"#
    )
}

fn range_filter() -> &'static str {
    r#"<div class="range-filter">
      <button class="tab is-active" data-range="full">全年</button>
      <button class="tab" data-range="first-half">上半年</button>
      <button class="tab" data-range="second-half">下半年</button>
      <button class="tab" data-range="last-3-months">最近 3 个月</button>
    </div>"#
}

fn mode_toolbar() -> &'static str {
    r#"<div class="toolbar">
      <button class="tab is-active" data-mode="temperature">温度</button>
      <button class="tab" data-mode="humidity">湿度</button>
    </div>"#
}

fn inline_css() -> &'static str {
    r#"
    :root {
      --bg-start: #f6f0e7;
      --bg-end: #d7e6f2;
      --card-bg: rgba(255, 255, 255, 0.85);
      --text-main: #1b1f23;
      --text-muted: #5a6670;
      --line-6: #f06b42;
      --line-12: #2b7bb9;
      --line-20: #3a9c6f;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      font-family: "IBM Plex Sans", system-ui, sans-serif;
      color: var(--text-main);
      background: radial-gradient(circle at top left, #fff7eb, transparent 40%),
                  radial-gradient(circle at top right, #e1f0ff, transparent 45%),
                  linear-gradient(135deg, var(--bg-start), var(--bg-end));
      min-height: 100vh;
      display: flex;
      align-items: center;
      justify-content: center;
      padding: 32px 20px;
    }

    .card {
      width: min(1100px, 100%);
      background: var(--card-bg);
      border-radius: 24px;
      box-shadow: 0 24px 60px rgba(36, 44, 60, 0.18);
      padding: 28px 32px 36px;
      backdrop-filter: blur(12px);
      animation: rise 0.7s ease-out;
    }

    @keyframes rise {
      from { opacity: 0; transform: translateY(18px); }
      to { opacity: 1; transform: translateY(0); }
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: baseline;
      justify-content: space-between;
      gap: 16px;
      margin-bottom: 18px;
    }

    h1 {
      margin: 0;
      font-family: "ZCOOL XiaoWei", serif;
      font-weight: 400;
      font-size: clamp(28px, 3.2vw, 40px);
      letter-spacing: 0.5px;
    }

    .meta {
      font-size: 14px;
      color: var(--text-muted);
      line-height: 1.6;
    }

    .meta span {
      display: inline-block;
      margin-right: 16px;
    }

    .toolbar, .range-filter {
      display: inline-flex;
      gap: 12px;
      padding: 6px;
      border-radius: 999px;
      background: rgba(27, 31, 35, 0.08);
      margin: 8px 12px 18px 0;
    }

    .tab {
      border: none;
      background: transparent;
      color: var(--text-main);
      font-size: 14px;
      padding: 8px 16px;
      border-radius: 999px;
      cursor: pointer;
      transition: all 0.2s ease;
    }

    .tab.is-active {
      background: #1b1f23;
      color: #fff;
      box-shadow: 0 10px 20px rgba(27, 31, 35, 0.2);
    }

    .year-filter {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      gap: 10px;
      font-size: 14px;
      color: var(--text-muted);
      margin: 6px 0 18px;
    }

    .year-chip {
      display: inline-flex;
      align-items: center;
      gap: 8px;
      padding: 6px 14px;
      border-radius: 999px;
      background: rgba(27, 31, 35, 0.08);
      color: var(--text-main);
      cursor: pointer;
      transition: all 0.2s ease;
    }

    .year-chip input {
      appearance: none;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      border: 2px solid #1b1f23;
    }

    .year-chip input:checked {
      background: #1b1f23;
    }

    .chart-wrap {
      position: relative;
      height: 480px;
    }

    canvas {
      width: 100% !important;
      height: 100% !important;
    }

    @media (max-width: 720px) {
      .card { padding: 22px; }
      .chart-wrap { height: 360px; }
    }
"#
}

/// Helpers shared by both page layouts, expects `labels` to be defined
fn common_javascript() -> &'static str {
    r#"
const hours = ['6', '12', '20'];
const hourLabels = { '6': '06:00', '12': '12:00', '20': '20:00' };
const rootStyle = getComputedStyle(document.documentElement);
const hourColors = Object.fromEntries(hours.map((h) => [h, rootStyle.getPropertyValue(`--line-${h}`).trim()]));
const noData = '无数据';
const modes = {
  temperature: { yTitle: '温度 (°C)', suffix: '°C' },
  humidity: { yTitle: '湿度 (%)', suffix: '%' },
};
const lineStyle = {
  tension: 0.35,
  pointRadius: 2,
  pointHoverRadius: 5,
  pointHitRadius: 12,
  spanGaps: false,
  fill: false,
  borderWidth: 2,
};

const markActive = (selector, key, value) => {
  document.querySelectorAll(`${selector} .tab`).forEach((tab) => {
    tab.classList.toggle('is-active', tab.dataset[key] === value);
  });
};

const describeSlot = (humidity, weather) => {
  const humText = humidity === null || humidity === undefined ? noData : `${humidity}%`;
  return ` 湿度: ${humText}  天气: ${weather || '未知'}`;
};

const createChart = (datasets, tooltipTitle, afterLabel) => {
  const chart = new Chart(document.getElementById('weatherChart'), {
    type: 'line',
    data: { labels: [...labels], datasets },
    options: {
      maintainAspectRatio: false,
      interaction: { mode: 'nearest', intersect: true },
      scales: {
        y: {
          title: { display: true, text: modes.temperature.yTitle },
          grid: { color: 'rgba(120, 130, 140, 0.18)' },
          ticks: {
            callback(value) {
              return this.chart.$mode === 'humidity' ? `${value}%` : value;
            },
          },
        },
        x: { grid: { display: false } },
      },
      plugins: {
        legend: { position: 'top', labels: { usePointStyle: true, pointStyle: 'circle' } },
        tooltip: {
          callbacks: {
            title: (items) => (items.length ? tooltipTitle(items[0]) : ''),
            label: (context) => {
              const value = context.parsed.y ?? noData;
              return ` ${context.dataset.label}: ${value}${modes[context.chart.$mode].suffix}`;
            },
            afterLabel,
          },
        },
      },
      animation: { duration: 1200, easing: 'easeOutQuart' },
    },
  });
  chart.$mode = 'temperature';
  return chart;
};
"#
}

fn yearly_javascript() -> &'static str {
    r#"
const dashStyles = [[0, 0], [8, 5], [2, 3], [12, 6, 2, 6]];
const labelMonths = labels.map((label) => Number(label.split('-')[0]));
const labelDays = labels.map((label) => Number(label.split('-')[1]));
const selectedYears = new Set(latestYear ? [latestYear] : []);
let currentMode = 'temperature';
let currentRange = 'full';
let visible = labels.map((_, idx) => idx);

const dayOfYear = (year, month, day) => {
  const date = new Date(year, month - 1, day);
  const start = new Date(year, 0, 1);
  return Math.floor((date - start) / 86400000) + 1;
};

const labelDayOfYear = labels.map((_, idx) => dayOfYear(baseYear, labelMonths[idx], labelDays[idx]));

const pickIndices = (keep) => labels.map((_, idx) => idx).filter(keep);

const rangeIndices = (range) => {
  switch (range) {
    case 'first-half':
      return pickIndices((idx) => labelMonths[idx] <= 6);
    case 'second-half':
      return pickIndices((idx) => labelMonths[idx] >= 7);
    case 'last-3-months': {
      const today = new Date();
      const start = new Date(today);
      start.setMonth(start.getMonth() - 3);
      const endDoy = dayOfYear(baseYear, today.getMonth() + 1, today.getDate());
      const startDoy = dayOfYear(baseYear, start.getMonth() + 1, start.getDate());
      if (startDoy <= endDoy) {
        return pickIndices((idx) => labelDayOfYear[idx] >= startDoy && labelDayOfYear[idx] <= endDoy);
      }
      return pickIndices((idx) => labelDayOfYear[idx] >= startDoy || labelDayOfYear[idx] <= endDoy);
    }
    default:
      return pickIndices(() => true);
  }
};

const buildDatasets = () => {
  const source = currentMode === 'humidity' ? humByYear : tempByYear;
  return years
    .filter((year) => selectedYears.has(year))
    .flatMap((year, yearIndex) => hours.map((hour) => {
      const full = source?.[year]?.[hour] ?? [];
      return {
        ...lineStyle,
        label: `${hourLabels[hour]} · ${year}`,
        data: visible.map((idx) => full[idx] ?? null),
        borderColor: hourColors[hour],
        backgroundColor: hourColors[hour],
        borderDash: dashStyles[yearIndex % dashStyles.length],
        _year: year,
        _hour: hour,
      };
    }));
};

const chart = createChart(
  [],
  (item) => (item.dataset._year ? `${item.dataset._year}-${item.label}` : item.label),
  (context) => {
    const idx = visible[context.dataIndex] ?? context.dataIndex;
    const { _year: year, _hour: hour } = context.dataset;
    return describeSlot(humByYear?.[year]?.[hour]?.[idx], weatherByYear?.[year]?.[hour]?.[idx]);
  },
);

const refresh = () => {
  visible = rangeIndices(currentRange);
  chart.$mode = currentMode;
  chart.data.labels = visible.map((idx) => labels[idx]);
  chart.data.datasets = buildDatasets();
  chart.options.scales.y.title.text = modes[currentMode].yTitle;
  chart.update();
  markActive('.toolbar', 'mode', currentMode);
  markActive('.range-filter', 'range', currentRange);
};

document.querySelectorAll('.toolbar .tab').forEach((tab) => {
  tab.addEventListener('click', () => {
    currentMode = tab.dataset.mode;
    refresh();
  });
});

document.querySelectorAll('.range-filter .tab').forEach((tab) => {
  tab.addEventListener('click', () => {
    currentRange = tab.dataset.range;
    refresh();
  });
});

document.querySelectorAll('.year-chip input').forEach((input) => {
  input.addEventListener('change', () => {
    if (input.checked) {
      selectedYears.add(input.value);
    } else {
      selectedYears.delete(input.value);
    }
    refresh();
  });
});

refresh();
"#
}

fn flat_javascript() -> &'static str {
    r#"
let currentMode = 'temperature';

const buildDatasets = () => {
  const source = currentMode === 'humidity' ? humByHour : tempByHour;
  return hours.map((hour) => ({
    ...lineStyle,
    label: hourLabels[hour],
    data: source?.[hour] ?? [],
    borderColor: hourColors[hour],
    backgroundColor: hourColors[hour],
    _hour: hour,
  }));
};

const chart = createChart(
  buildDatasets(),
  (item) => item.label,
  (context) => {
    const hour = context.dataset._hour;
    return describeSlot(humByHour?.[hour]?.[context.dataIndex], weatherByHour?.[hour]?.[context.dataIndex]);
  },
);

document.querySelectorAll('.toolbar .tab').forEach((tab) => {
  tab.addEventListener('click', () => {
    currentMode = tab.dataset.mode;
    chart.$mode = currentMode;
    chart.data.datasets = buildDatasets();
    chart.options.scales.y.title.text = modes[currentMode].yTitle;
    chart.update();
    markActive('.toolbar', 'mode', currentMode);
  });
});
"#
}
