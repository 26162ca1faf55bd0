use crate::ingest::Point;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Unicode sparkline of the last `width` scores.
pub fn sparkline(points: &[Point], width: usize) -> String {
    let tail = &points[points.len().saturating_sub(width)..];
    let Some(min) = tail.iter().map(|p| p.score).min() else {
        return String::new();
    };
    let max = tail.iter().map(|p| p.score).max().unwrap_or(min);
    let span = max as f64 - min as f64;

    tail.iter()
        .map(|p| {
            if span == 0.0 {
                BARS[0]
            } else {
                let ratio = (p.score as f64 - min as f64) / span;
                let level = (ratio * (BARS.len() - 1) as f64).round() as usize;
                BARS[level.min(BARS.len() - 1)]
            }
        })
        .collect()
}
