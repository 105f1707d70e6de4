//! Plain-text charts for a classified run.
//!
//! Pure presentation: every function only reads the analysis it is given.

use rainfall_core::{
    Analysis, DateRange, IntensityCounts, RainEvent, RainIntensity, SkippedWindow,
    report::{heat_map, monthly_breakdown, monthly_rain_days},
};

/// Widest bar, in characters.
const BAR_WIDTH: usize = 40;
const LIGHT_BLOCK: char = '▒';
const HEAVY_BLOCK: char = '█';

/// Everything printed after a successful run.
pub fn report(analysis: &Analysis) -> String {
    let classification = &analysis.classification;
    let mut sections = vec![
        header(analysis),
        monthly_rain_days_chart(classification.dates()),
        intensity_chart(classification.counts()),
    ];

    if let Some(chart) = monthly_types_chart(&classification.events) {
        sections.push(chart);
    }
    sections.push(heat_map_chart(&classification.events, analysis.request.range));

    sections.join("\n\n")
}

fn header(analysis: &Analysis) -> String {
    let request = &analysis.request;
    let mut lines = vec![
        format!("Rainfall at {} from {}", request.location, request.range),
        format!(
            "{} observation rows, {} rain days",
            analysis.rows,
            analysis.classification.events.len()
        ),
    ];

    if !analysis.skipped.is_empty() {
        lines.push(skipped_windows(&analysis.skipped));
    }

    lines.join("\n")
}

/// One line per window that contributed no data, with the reason.
pub fn skipped_windows(skipped: &[SkippedWindow]) -> String {
    let mut lines = vec![format!("{} window(s) skipped:", skipped.len())];
    lines.extend(skipped.iter().map(|s| format!("  {}: {}", s.window, s.reason)));
    lines.join("\n")
}

pub fn monthly_rain_days_chart(dates: &[chrono::NaiveDate]) -> String {
    let months = monthly_rain_days(dates);
    let max = months.values().copied().max().unwrap_or(0);

    let mut lines = vec!["Monthly Rainy Days".to_string()];
    if months.is_empty() {
        lines.push("  (no rain days)".to_string());
    }
    for (month, count) in &months {
        lines.push(format!("  {month} │{} {count}", bar(HEAVY_BLOCK, *count, max)));
    }

    lines.join("\n")
}

pub fn intensity_chart(counts: &IntensityCounts) -> String {
    let max = counts.iter().map(|(_, n)| n).max().unwrap_or(0);
    let label_width = label_width();

    let mut lines = vec!["Rain Intensity Distribution".to_string()];
    for (intensity, count) in counts.iter() {
        lines.push(format!(
            "  {:<label_width$} │{} {count}",
            intensity.label(),
            bar(block_for(intensity), count, max),
        ));
    }

    lines.join("\n")
}

/// Stacked light / moderate-heavy bars per month; `None` without rain days.
pub fn monthly_types_chart(events: &[RainEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }

    let months = monthly_breakdown(events);
    let max = months.values().map(IntensityCounts::total).max().unwrap_or(0);

    let mut lines = vec![
        "Monthly Rain Type Distribution".to_string(),
        format!(
            "  {LIGHT_BLOCK} {}   {HEAVY_BLOCK} {}",
            RainIntensity::Light.label(),
            RainIntensity::ModerateHeavy.label()
        ),
    ];
    for (month, counts) in &months {
        let light = counts.get(RainIntensity::Light);
        let heavy = counts.get(RainIntensity::ModerateHeavy);
        let stacked = format!(
            "{}{}",
            bar(LIGHT_BLOCK, light, max),
            bar(HEAVY_BLOCK, heavy, max)
        );
        lines.push(format!("  {month} │{stacked} {light}+{heavy}"));
    }

    Some(lines.join("\n"))
}

/// Month × day grid: 0 none, 1 light, 2 moderate/heavy, blank outside the range.
pub fn heat_map_chart(events: &[RainEvent], range: DateRange) -> String {
    let days: String = (1..=31).map(|d| format!("{d:>3}")).collect();
    let mut lines = vec![
        "Rain Type Heat Map (0=None, 1=Light, 2=Mod/Heavy)".to_string(),
        format!("  {:<7}{days}", "Month"),
    ];

    for row in heat_map(events, range) {
        let cells: String = row
            .days
            .iter()
            .map(|cell| match cell {
                Some(level) => format!("{level:>3}"),
                None => "   ".to_string(),
            })
            .collect();
        lines.push(format!("  {}{}", row.month, cells).trim_end().to_string());
    }

    lines.join("\n")
}

fn bar(block: char, value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max);
    std::iter::repeat_n(block, len).collect()
}

fn block_for(intensity: RainIntensity) -> char {
    match intensity {
        RainIntensity::Light => LIGHT_BLOCK,
        RainIntensity::ModerateHeavy => HEAVY_BLOCK,
    }
}

fn label_width() -> usize {
    RainIntensity::all().iter().map(|i| i.label().len()).max().unwrap_or(0)
}
