//! Fixed grid for stacking charts vertically on a page.
//!
//! All values are millimetres, measured from the top-left corner of the page.

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where a chart lands: 1-based page number and 0-based vertical slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub slot: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    /// Vertical space between two charts
    pub gutter: f64,
    pub per_page: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::a4_three_up()
    }
}

impl GridLayout {
    /// A4 portrait, 5 mm margins, three full-width charts per page
    pub const fn a4_three_up() -> Self {
        Self {
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
            margin: 5.0,
            gutter: 5.0,
            per_page: 3,
        }
    }

    pub fn chart_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    pub fn chart_height(&self) -> f64 {
        let gutters = self.per_page.saturating_sub(1) as f64 * self.gutter;
        (self.page_height - 2.0 * self.margin - gutters) / self.per_page as f64
    }

    /// Pages needed for `charts` consecutive charts
    pub fn page_count(&self, charts: usize) -> usize {
        charts.div_ceil(self.per_page)
    }

    /// Placement of the chart at 1-based `index`. Index 0 is treated as 1.
    pub fn placement(&self, index: usize) -> Placement {
        let position = index.max(1) - 1;
        let slot = position % self.per_page;
        let height = self.chart_height();
        Placement {
            page: position / self.per_page + 1,
            slot,
            rect: Rect {
                x: self.margin,
                y: self.margin + slot as f64 * (height + self.gutter),
                width: self.chart_width(),
                height,
            },
        }
    }
}
