//! SVG chart artifacts for health and comparison analyses
//!
//! Charts are plain SVG documents assembled as strings, so they open in any
//! browser without extra tooling. Every statistic drawn here comes from
//! `stats`/`compare`; this module only lays things out.

use crate::compare::ComparisonReport;
use crate::observation::{GroupKey, Observation};
use crate::percentile::SortedSamples;
use crate::stats::Aggregation;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const COLOR_A: &str = "#1f77b4";
const COLOR_B: &str = "#ff7f0e";

/// Chart path for a health log: the extension is replaced by `suffix`
///
/// `results/exp1_health.log` + `_analysis.svg` -> `results/exp1_health_analysis.svg`
pub fn health_chart_path(log_file: &Path, suffix: &str) -> PathBuf {
    let stem = log_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    log_file.with_file_name(format!("{stem}{suffix}"))
}

/// Chart path for a comparison: `name` inside the first run's directory
pub fn comparison_chart_path(first_log: &Path, name: &str) -> PathBuf {
    match first_log.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

/// Linear mapping from a data range onto a pixel range
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
    from: f64,
    to: f64,
}

impl Scale {
    fn new(min: f64, max: f64, from: f64, to: f64) -> Self {
        let (min, max) = if max > min {
            (min, max)
        } else {
            (min - 1.0, min + 1.0)
        };
        Self { min, max, from, to }
    }

    fn map(&self, v: f64) -> f64 {
        self.from + (v - self.min) / (self.max - self.min) * (self.to - self.from)
    }
}

/// Plot area of one panel with its axes
struct Plot {
    area: Rect,
    x: Scale,
    y: Scale,
}

impl Plot {
    fn px(&self, v: f64) -> f64 {
        self.x.map(v)
    }

    fn py(&self, v: f64) -> f64 {
        self.y.map(v)
    }
}

/// SVG document under construction
struct SvgChart {
    width: u32,
    height: u32,
    body: String,
}

impl SvgChart {
    fn new(width: u32, height: u32, title: &str) -> Self {
        let mut chart = Self {
            width,
            height,
            body: String::new(),
        };
        chart.text(width as f64 / 2.0, 32.0, title, 22, "middle");
        chart
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    fn text(&mut self, x: f64, y: f64, content: &str, size: u32, anchor: &str) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x:.1}" y="{y:.1}" font-size="{size}" text-anchor="{anchor}">{}</text>"#,
            Self::escape(content)
        );
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        let _ = writeln!(
            self.body,
            r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" stroke="{stroke}"/>"#
        );
    }

    fn rect(&mut self, r: Rect, fill: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{fill}" fill-opacity="{opacity}" stroke="{fill}"/>"#,
            r.x,
            r.y,
            r.w.max(0.0),
            r.h.max(0.0)
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        let _ = writeln!(
            self.body,
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r}" fill="{fill}" fill-opacity="{opacity}"/>"#
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &str) {
        if points.len() < 2 {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{x:.1},{y:.1}"))
            .collect();
        let _ = writeln!(
            self.body,
            r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-opacity="0.7"/>"#,
            coords.join(" ")
        );
    }

    /// Grid cell `(row, col)` of a `rows x cols` layout below the title
    fn cell(&self, rows: usize, cols: usize, row: usize, col: usize) -> Rect {
        let top = 50.0;
        let w = self.width as f64 / cols as f64;
        let h = (self.height as f64 - top) / rows as f64;
        Rect {
            x: col as f64 * w,
            y: top + row as f64 * h,
            w,
            h,
        }
    }

    /// Frame, title, axis labels and y ticks for one panel
    fn panel(
        &mut self,
        cell: Rect,
        title: &str,
        x_label: &str,
        y_label: &str,
        x_range: (f64, f64),
        y_range: (f64, f64),
    ) -> Plot {
        let area = Rect {
            x: cell.x + 70.0,
            y: cell.y + 35.0,
            w: cell.w - 95.0,
            h: cell.h - 90.0,
        };
        self.text(cell.x + cell.w / 2.0, cell.y + 22.0, title, 15, "middle");
        self.rect(area, "#ffffff", 1.0);
        self.line(area.x, area.y + area.h, area.x + area.w, area.y + area.h, "#333333");
        self.line(area.x, area.y, area.x, area.y + area.h, "#333333");
        self.text(area.x + area.w / 2.0, area.y + area.h + 40.0, x_label, 12, "middle");
        self.text(cell.x + 14.0, area.y - 10.0, y_label, 12, "start");

        let plot = Plot {
            area,
            x: Scale::new(x_range.0, x_range.1, area.x, area.x + area.w),
            y: Scale::new(y_range.0, y_range.1, area.y + area.h, area.y),
        };

        for i in 0..=4 {
            let v = plot.y.min + (plot.y.max - plot.y.min) * i as f64 / 4.0;
            let y = plot.py(v);
            self.line(area.x - 4.0, y, area.x + area.w, y, "#e0e0e0");
            self.text(area.x - 8.0, y + 4.0, &format!("{v:.1}"), 10, "end");
        }
        plot
    }

    fn legend(&mut self, plot: &Plot, entries: &[(String, &str)]) {
        for (i, (label, color)) in entries.iter().enumerate() {
            let x = plot.area.x + plot.area.w - 150.0;
            let y = plot.area.y + 14.0 + i as f64 * 16.0;
            self.rect(
                Rect {
                    x,
                    y: y - 9.0,
                    w: 10.0,
                    h: 10.0,
                },
                color,
                0.8,
            );
            self.text(x + 14.0, y, label, 11, "start");
        }
    }

    /// Category labels under the x axis, one per slot
    fn categories(&mut self, plot: &Plot, labels: &[String]) {
        for (i, label) in labels.iter().enumerate() {
            let x = plot.px(i as f64 + 0.5);
            self.text(x, plot.area.y + plot.area.h + 16.0, label, 11, "middle");
        }
    }

    /// Bars for several series per category slot, side by side
    fn grouped_bars(&mut self, plot: &Plot, series: &[(&[f64], &str)], opacity: f64) {
        let n = series.len().max(1) as f64;
        let slot = plot.px(1.0) - plot.px(0.0);
        let bar = slot * 0.7 / n;
        let base = plot.py(plot.y.min.max(0.0));
        for (s, (values, color)) in series.iter().enumerate() {
            for (i, &v) in values.iter().enumerate() {
                let x = plot.px(i as f64) + slot * 0.15 + bar * s as f64;
                let top = plot.py(v);
                self.rect(
                    Rect {
                        x,
                        y: top.min(base),
                        w: bar,
                        h: (base - top).abs(),
                    },
                    color,
                    opacity,
                );
            }
        }
    }

    /// Min/max whiskers, p25..p75 box and median line
    fn box_plot(&mut self, plot: &Plot, slot: usize, samples: &SortedSamples, color: &str) {
        let (Some(min), Some(max)) = (samples.min(), samples.max()) else {
            return;
        };
        let q1 = samples.percentile(25.0).unwrap_or(min);
        let median = samples.median().unwrap_or(min);
        let q3 = samples.percentile(75.0).unwrap_or(max);

        let center = plot.px(slot as f64 + 0.5);
        let half = (plot.px(1.0) - plot.px(0.0)) * 0.25;
        self.line(center, plot.py(min), center, plot.py(q1), "#333333");
        self.line(center, plot.py(q3), center, plot.py(max), "#333333");
        self.line(center - half / 2.0, plot.py(min), center + half / 2.0, plot.py(min), "#333333");
        self.line(center - half / 2.0, plot.py(max), center + half / 2.0, plot.py(max), "#333333");
        self.rect(
            Rect {
                x: center - half,
                y: plot.py(q3),
                w: half * 2.0,
                h: plot.py(q1) - plot.py(q3),
            },
            color,
            0.5,
        );
        self.line(center - half, plot.py(median), center + half, plot.py(median), "#d62728");
    }

    /// One bar in category slot `i`
    fn grouped_bars_at(&mut self, plot: &Plot, i: usize, value: f64, color: &str) {
        let slot = plot.px(1.0) - plot.px(0.0);
        let base = plot.py(0.0);
        let top = plot.py(value);
        self.rect(
            Rect {
                x: plot.px(i as f64) + slot * 0.15,
                y: top.min(base),
                w: slot * 0.7,
                h: (base - top).abs(),
            },
            color,
            0.7,
        );
    }

    /// Response time against request order (by timestamp)
    fn request_scatter(&mut self, cell: Rect, title: &str, observations: &[Observation], color: &str) {
        let mut ordered: Vec<&Observation> = observations
            .iter()
            .filter(|o| o.latency_ms.is_some())
            .collect();
        ordered.sort_by_key(|o| o.timestamp_ms);
        let max = ordered
            .iter()
            .filter_map(|o| o.latency_ms)
            .fold(0.0, f64::max);

        let plot = self.panel(
            cell,
            title,
            "Request Number",
            "Response Time (ms)",
            (0.0, ordered.len().max(1) as f64),
            (0.0, headroom(max)),
        );
        for (n, obs) in ordered.iter().enumerate() {
            if let Some(latency) = obs.latency_ms {
                self.circle(plot.px(n as f64), plot.py(latency), 1.8, color, 0.5);
            }
        }
    }

    fn finish(self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
                "\n",
                r##"<rect width="100%" height="100%" fill="#f5f5f5"/>"##,
                "\n{body}</svg>\n"
            ),
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

/// Upper bound for a value axis: the largest value plus headroom, at least 1
fn headroom(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn successful_latencies(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .filter(|o| o.is_success())
        .filter_map(|o| o.latency_ms)
        .collect()
}

/// Four-panel health chart: RTT over time, RTT distribution, success rate
/// and average RTT per backend
///
/// `log_name` is shown after the fixed "Health Check Analysis:" heading.
pub fn health_chart(
    log_name: &str,
    observations: &[Observation],
    agg: &Aggregation,
    width: u32,
    height: u32,
) -> String {
    let mut chart = SvgChart::new(width, height, &format!("Health Check Analysis: {log_name}"));

    let mut series: BTreeMap<&GroupKey, Vec<(f64, f64)>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.is_success()) {
        if let Some(latency) = obs.latency_ms {
            series
                .entry(&obs.group_key)
                .or_default()
                .push((obs.elapsed_sec, latency));
        }
    }
    for points in series.values_mut() {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let max_rtt = agg.groups.iter().map(|g| g.latency.max).fold(0.0, f64::max);
    let labels: Vec<String> = agg.keys().map(GroupKey::short_label).collect();
    let slots = labels.len().max(1) as f64;

    // RTT over time
    let cell = chart.cell(2, 2, 0, 0);
    let plot = chart.panel(
        cell,
        "RTT Over Time",
        "Time (seconds)",
        "RTT (ms)",
        (0.0, agg.global.duration_sec.max(1.0)),
        (0.0, headroom(max_rtt)),
    );
    let mut legend = Vec::new();
    for (i, (key, points)) in series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let mapped: Vec<(f64, f64)> = points
            .iter()
            .map(|&(t, v)| (plot.px(t), plot.py(v)))
            .collect();
        chart.polyline(&mapped, color);
        for &(x, y) in &mapped {
            chart.circle(x, y, 2.5, color, 0.7);
        }
        legend.push((format!("Backend {key}"), color));
    }
    chart.legend(&plot, &legend);

    // RTT distribution
    let cell = chart.cell(2, 2, 0, 1);
    let plot = chart.panel(
        cell,
        "RTT Distribution by Backend",
        "Backend",
        "RTT (ms)",
        (0.0, slots),
        (0.0, headroom(max_rtt)),
    );
    for (slot, key) in agg.keys().enumerate() {
        let latencies: Vec<f64> = series
            .get(key)
            .map(|points| points.iter().map(|&(_, v)| v).collect())
            .unwrap_or_default();
        chart.box_plot(&plot, slot, &SortedSamples::new(&latencies), COLOR_A);
    }
    chart.categories(&plot, &labels);

    // Success rate
    let cell = chart.cell(2, 2, 1, 0);
    let plot = chart.panel(
        cell,
        "Health Check Success Rate by Backend",
        "Backend",
        "Success Rate (%)",
        (0.0, slots),
        (0.0, 105.0),
    );
    for (i, group) in agg.groups.iter().enumerate() {
        let color = if group.success_rate >= 100.0 {
            "green"
        } else if group.success_rate > 90.0 {
            "orange"
        } else {
            "red"
        };
        chart.grouped_bars_at(&plot, i, group.success_rate, color);
    }
    chart.categories(&plot, &labels);

    // Average RTT
    let means: Vec<f64> = agg.groups.iter().map(|g| g.latency.mean).collect();
    let cell = chart.cell(2, 2, 1, 1);
    let plot = chart.panel(
        cell,
        "Average RTT by Backend",
        "Backend",
        "Average RTT (ms)",
        (0.0, slots),
        (0.0, headroom(means.iter().copied().fold(0.0, f64::max))),
    );
    chart.grouped_bars(&plot, &[(means.as_slice(), "skyblue")], 0.7);
    chart.categories(&plot, &labels);

    chart.finish()
}

/// Six-panel comparison chart: shared histogram, backend distribution,
/// response-time box plots, per-run scatter and headline metrics
pub fn comparison_chart(
    report: &ComparisonReport,
    run_a: &[Observation],
    run_b: &[Observation],
    width: u32,
    height: u32,
) -> String {
    let label_a = report.run_a.label.as_str();
    let label_b = report.run_b.label.as_str();
    let mut chart = SvgChart::new(
        width,
        height,
        &format!("Algorithm Comparison: {label_a} vs {label_b}"),
    );
    let legend = [(label_a.to_string(), COLOR_A), (label_b.to_string(), COLOR_B)];

    // Response time distribution
    let hist = &report.histogram;
    let counts_a: Vec<f64> = hist.counts_a.iter().map(|&c| c as f64).collect();
    let counts_b: Vec<f64> = hist.counts_b.iter().map(|&c| c as f64).collect();
    let peak = counts_a.iter().chain(&counts_b).copied().fold(0.0, f64::max);
    let cell = chart.cell(2, 3, 0, 0);
    let plot = chart.panel(
        cell,
        "Response Time Distribution",
        "Response Time (ms)",
        "Frequency",
        (0.0, hist.bins().max(1) as f64),
        (0.0, headroom(peak)),
    );
    chart.grouped_bars(
        &plot,
        &[(counts_a.as_slice(), COLOR_A), (counts_b.as_slice(), COLOR_B)],
        0.7,
    );
    if let (Some(first), Some(last)) = (hist.edges.first(), hist.edges.last()) {
        let y = plot.area.y + plot.area.h + 16.0;
        chart.text(plot.area.x, y, &format!("{first:.1}"), 10, "start");
        chart.text(plot.area.x + plot.area.w, y, &format!("{last:.1}"), 10, "end");
    }
    chart.legend(&plot, &legend);

    // Request distribution across backends
    let share_a: Vec<f64> = report.groups.iter().map(|g| g.count_a as f64).collect();
    let share_b: Vec<f64> = report.groups.iter().map(|g| g.count_b as f64).collect();
    let labels: Vec<String> = report
        .groups
        .iter()
        .map(|g| g.group_key.short_label())
        .collect();
    let peak = share_a.iter().chain(&share_b).copied().fold(0.0, f64::max);
    let cell = chart.cell(2, 3, 0, 1);
    let plot = chart.panel(
        cell,
        "Request Distribution Across Backends",
        "Backend",
        "Number of Requests",
        (0.0, labels.len().max(1) as f64),
        (0.0, headroom(peak)),
    );
    chart.grouped_bars(
        &plot,
        &[(share_a.as_slice(), COLOR_A), (share_b.as_slice(), COLOR_B)],
        0.7,
    );
    chart.categories(&plot, &labels);
    chart.legend(&plot, &legend);

    // Response time box plots
    let samples_a = SortedSamples::new(&successful_latencies(run_a));
    let samples_b = SortedSamples::new(&successful_latencies(run_b));
    let top = samples_a
        .max()
        .unwrap_or(0.0)
        .max(samples_b.max().unwrap_or(0.0));
    let cell = chart.cell(2, 3, 0, 2);
    let plot = chart.panel(
        cell,
        "Response Time Comparison",
        "Algorithm",
        "Response Time (ms)",
        (0.0, 2.0),
        (0.0, headroom(top)),
    );
    chart.box_plot(&plot, 0, &samples_a, COLOR_A);
    chart.box_plot(&plot, 1, &samples_b, COLOR_B);
    chart.categories(&plot, &[label_a.to_string(), label_b.to_string()]);

    // Per-run response time over requests
    let cell = chart.cell(2, 3, 1, 0);
    chart.request_scatter(
        cell,
        &format!("{label_a}: Response Time Over Requests"),
        run_a,
        COLOR_A,
    );
    let cell = chart.cell(2, 3, 1, 1);
    chart.request_scatter(
        cell,
        &format!("{label_b}: Response Time Over Requests"),
        run_b,
        COLOR_B,
    );

    // Headline metrics
    let la = &report.run_a.latency;
    let lb = &report.run_b.latency;
    let metrics_a = [la.mean, la.median, la.p95, la.p99];
    let metrics_b = [lb.mean, lb.median, lb.p95, lb.p99];
    let peak = metrics_a.iter().chain(&metrics_b).copied().fold(0.0, f64::max);
    let cell = chart.cell(2, 3, 1, 2);
    let plot = chart.panel(
        cell,
        "Response Time Metrics Comparison",
        "Metric",
        "Response Time (ms)",
        (0.0, 4.0),
        (0.0, headroom(peak)),
    );
    chart.grouped_bars(
        &plot,
        &[(metrics_a.as_slice(), COLOR_A), (metrics_b.as_slice(), COLOR_B)],
        0.7,
    );
    chart.categories(
        &plot,
        &["Mean", "Median", "P95", "P99"].map(String::from),
    );
    chart.legend(&plot, &legend);

    chart.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::observation::ProbeStatus;
    use crate::stats::aggregate;

    #[test]
    fn test_health_chart_path_replaces_extension() {
        assert_eq!(
            health_chart_path(Path::new("results_lb/exp1_rr_c8_health.log"), "_analysis.svg"),
            PathBuf::from("results_lb/exp1_rr_c8_health_analysis.svg")
        );
        assert_eq!(
            health_chart_path(Path::new("health"), "_analysis.svg"),
            PathBuf::from("health_analysis.svg")
        );
    }

    #[test]
    fn test_comparison_chart_path_uses_first_directory() {
        assert_eq!(
            comparison_chart_path(Path::new("results_lb/rr.log"), "algorithm_comparison.svg"),
            PathBuf::from("results_lb/algorithm_comparison.svg")
        );
        assert_eq!(
            comparison_chart_path(Path::new("rr.log"), "algorithm_comparison.svg"),
            PathBuf::from("algorithm_comparison.svg")
        );
    }

    #[test]
    fn test_health_chart_is_svg() {
        let rows = vec![
            Observation::probe(0, 1, 8081, ProbeStatus::Success, Some(10.0)),
            Observation::probe(1000, 1, 8081, ProbeStatus::Success, Some(12.0)),
            Observation::probe(1000, 2, 8082, ProbeStatus::Failure, None),
        ];
        let agg = aggregate(&rows);
        let svg = health_chart("exp<1>.log", &rows, &agg, 1400, 1000);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("RTT Over Time"));
        assert!(svg.contains("Health Check Success Rate by Backend"));
        assert!(svg.contains(">Health Check Analysis: exp&lt;1&gt;.log</text>"));
        assert_eq!(svg.matches("Health Check Analysis:").count(), 1);
        assert!(svg.contains("B2"));
    }

    #[test]
    fn test_health_chart_empty_dataset() {
        let agg = aggregate(&[]);
        let svg = health_chart("empty.log", &[], &agg, 800, 600);
        assert!(svg.contains("Average RTT by Backend"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_comparison_chart_panels() {
        let a = vec![
            Observation::request(0, 1, 10.0),
            Observation::request(10, 2, 14.0),
        ];
        let b = vec![Observation::request(0, 2, 8.0)];
        let report = compare(&a, &b, "Round Robin", "Least Response Time");
        let svg = comparison_chart(&report, &a, &b, 1800, 1000);

        assert!(svg.contains("Algorithm Comparison: Round Robin vs Least Response Time"));
        assert!(svg.contains("Response Time Distribution"));
        assert!(svg.contains("Request Distribution Across Backends"));
        assert!(svg.contains("Round Robin: Response Time Over Requests"));
        assert!(svg.contains("Response Time Metrics Comparison"));
        assert!(!svg.contains("NaN"));
    }
}
