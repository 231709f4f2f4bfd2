//! Bar chart widget for ratatui

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Widget},
};

/// One column per data point; the focused column is drawn in `focus_style`.
/// Missing values leave an empty column.
pub struct BarChart<'a> {
    values: &'a [Option<f64>],
    focused: Option<usize>,
    style: Style,
    focus_style: Style,
    block: Option<Block<'a>>,
}

impl<'a> BarChart<'a> {
    pub fn new(values: &'a [Option<f64>]) -> Self {
        Self {
            values,
            focused: None,
            style: Style::default(),
            focus_style: Style::default(),
            block: None,
        }
    }

    pub fn focused(mut self, index: Option<usize>) -> Self {
        self.focused = index;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn focus_style(mut self, style: Style) -> Self {
        self.focus_style = style;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Column range `[start, end)` for point `i` when `n` points share `width`
    fn columns(i: usize, n: usize, width: usize) -> (usize, usize) {
        let start = i * width / n;
        let end = ((i + 1) * width / n).max(start + 1).min(width);
        (start, end)
    }

    fn render_bars(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.values.is_empty() {
            return;
        }

        let present = self.values.iter().flatten().copied();
        let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() {
            return;
        }

        let width = area.width as usize;
        let height = area.height as usize;
        // More points than columns: later points share columns with earlier ones
        let n = self.values.len();

        for (i, value) in self.values.iter().enumerate() {
            let Some(value) = value else {
                continue;
            };

            // Lowest value still gets one row so every point is visible
            let level = if max > min { (value - min) / (max - min) } else { 0.5 };
            let rows = 1 + (level * (height - 1) as f64).round() as usize;

            let style = if self.focused == Some(i) {
                self.focus_style
            } else {
                self.style
            };

            let (start, end) = Self::columns(i, n, width);
            // Leave a one-column gap when bars are wide enough
            let end = if end - start > 2 { end - 1 } else { end };

            for col in start..end {
                let x = area.x + col as u16;
                for row in 0..rows.min(height) {
                    let y = area.y + area.height - 1 - row as u16;
                    buf.set_string(x, y, "█", style);
                }
            }
        }
    }
}

impl Widget for BarChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        self.render_bars(inner_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn column_height(buf: &Buffer, x: u16, height: u16) -> usize {
        (0..height).filter(|&y| buf[(x, y)].symbol() == "█").count()
    }

    #[test]
    fn test_empty_chart() {
        let chart = BarChart::new(&[]);
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        chart.render(area, &mut buf);
        assert!(buf.content.iter().all(|c| c.symbol() == " "));
    }

    #[test]
    fn test_bar_heights_follow_values() {
        let values = vec![Some(0.0), Some(5.0), Some(10.0)];
        let area = Rect::new(0, 0, 3, 5);
        let mut buf = Buffer::empty(area);
        BarChart::new(&values).render(area, &mut buf);

        assert_eq!(column_height(&buf, 0, 5), 1);
        assert_eq!(column_height(&buf, 1, 5), 3);
        assert_eq!(column_height(&buf, 2, 5), 5);
    }

    #[test]
    fn test_missing_value_leaves_gap() {
        let values = vec![Some(1.0), None, Some(2.0)];
        let area = Rect::new(0, 0, 3, 4);
        let mut buf = Buffer::empty(area);
        BarChart::new(&values).render(area, &mut buf);

        assert_eq!(column_height(&buf, 1, 4), 0);
        assert!(column_height(&buf, 2, 4) > 0);
    }

    #[test]
    fn test_focused_bar_highlighted() {
        let values = vec![Some(1.0), Some(2.0)];
        let area = Rect::new(0, 0, 2, 3);
        let mut buf = Buffer::empty(area);
        BarChart::new(&values)
            .style(Style::default().fg(Color::Blue))
            .focus_style(Style::default().fg(Color::Yellow))
            .focused(Some(1))
            .render(area, &mut buf);

        assert_eq!(buf[(0, 2)].fg, Color::Blue);
        assert_eq!(buf[(1, 2)].fg, Color::Yellow);
    }

    #[test]
    fn test_chart_with_block() {
        let values = vec![Some(3.0); 4];
        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        BarChart::new(&values)
            .block(Block::default().title("Test"))
            .render(area, &mut buf);
        assert!(buf.content.iter().any(|c| c.symbol() == "█"));
    }
}
