use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const WAVE: Color = Color::Rgb(0, 255, 127);
const CURSOR: Color = Color::Yellow;

// draw the peak overview as mirrored bars around the centre row,
// with a playhead column at `progress` (0.0 - 1.0) when the track has a duration
pub fn draw_waveform(frame: &mut Frame, area: Rect, peaks: &[f32], progress: Option<f64>) {
    let lines = waveform_lines(peaks, area.width as usize, area.height as usize, progress);
    frame.render_widget(Paragraph::new(lines), area);
}

pub fn waveform_lines(
    peaks: &[f32],
    width: usize,
    height: usize,
    progress: Option<f64>,
) -> Vec<Line<'static>> {
    let columns = column_peaks(peaks, width);
    let cursor = progress.and_then(|p| cursor_column(p, width));
    let centre = height.saturating_sub(1) as f32 / 2.0;

    (0..height)
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..width)
                .map(|col| {
                    let peak = columns.get(col).copied().unwrap_or(0.0);
                    let half = peak * height as f32 / 2.0;
                    let lit = peak > 0.0 && (row as f32 - centre).abs() <= half.max(0.5);
                    match (cursor == Some(col), lit) {
                        (true, _) => Span::styled("│", Style::default().fg(CURSOR)),
                        (false, true) => Span::styled("█", Style::default().fg(WAVE)),
                        (false, false) => Span::raw(" "),
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

// squeeze/stretch the stored peaks to the terminal width, keeping the loudest
pub fn column_peaks(peaks: &[f32], width: usize) -> Vec<f32> {
    if peaks.is_empty() || width == 0 {
        return Vec::new();
    }
    let n = peaks.len();
    (0..width)
        .map(|x| {
            let lo = (x * n / width).min(n - 1);
            let hi = ((x + 1) * n / width).clamp(lo + 1, n);
            peaks[lo..hi].iter().fold(0.0f32, |m, p| m.max(*p))
        })
        .collect()
}

pub fn cursor_column(progress: f64, width: usize) -> Option<usize> {
    if width == 0 || !progress.is_finite() {
        return None;
    }
    let col = (progress.clamp(0.0, 1.0) * width as f64) as usize;
    Some(col.min(width - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peaks_are_folded_to_the_loudest_per_column() {
        let peaks = [0.1, 0.9, 0.2, 0.4, 1.0, 0.0];
        assert_eq!(column_peaks(&peaks, 3), vec![0.9, 0.4, 1.0]);
        // wider than the data: columns repeat their source peak
        assert_eq!(column_peaks(&[0.5, 1.0], 4), vec![0.5, 0.5, 1.0, 1.0]);
        assert!(column_peaks(&[], 10).is_empty());
    }

    #[test]
    fn cursor_lands_inside_the_pane() {
        assert_eq!(cursor_column(0.0, 80), Some(0));
        assert_eq!(cursor_column(0.5, 80), Some(40));
        assert_eq!(cursor_column(1.0, 80), Some(79));
        assert_eq!(cursor_column(f64::NAN, 80), None);
        assert_eq!(cursor_column(0.5, 0), None);
    }

    #[test]
    fn full_scale_column_fills_every_row() {
        let lines = waveform_lines(&[1.0, 0.0], 2, 5, None);
        assert_eq!(lines.len(), 5);
        for line in &lines {
            assert_eq!(line.spans[0].content, "█");
            assert_eq!(line.spans[1].content, " ");
        }
    }

    #[test]
    fn cursor_column_overrides_the_bars() {
        let lines = waveform_lines(&[1.0; 4], 4, 3, Some(0.5));
        for line in &lines {
            assert_eq!(line.spans[2].content, "│");
            assert_eq!(line.spans[2].style.fg, Some(CURSOR));
        }
    }
}
