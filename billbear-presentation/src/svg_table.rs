use std::{borrow::Cow, fmt::Write};

const FONT_SIZE: u32 = 14;
const CAPTION_FONT_SIZE: u32 = 16;
const NOTE_FONT_SIZE: u32 = 12;
const CELL_PADDING: u32 = 10;
const LINE_HEIGHT: u32 = FONT_SIZE + CELL_PADDING * 2;
const HEADER_BG: &str = "#2c5282";
const HEADER_TEXT: &str = "#ffffff";
const ROW_BG_EVEN: &str = "#f7fafc";
const ROW_BG_ODD: &str = "#edf2f7";
const FOOTER_BG: &str = "#e2e8f0";
const ROW_TEXT: &str = "#1a202c";
const BORDER_COLOR: &str = "#cbd5e0";
const FONT_FAMILY: &str = "Noto Sans, Noto Sans CJK JP, sans-serif";
const CHAR_WIDTH: f32 = 8.5;

type Cells<'a> = Vec<Cow<'a, str>>;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy)]
enum RowStyle {
    Header,
    Body(usize),
    Footer,
}

/// Builds a striped SVG table with an optional caption and totals row.
#[derive(Default)]
pub struct SvgTableBuilder<'a> {
    caption: Option<Cow<'a, str>>,
    headers: Cells<'a>,
    rows: Vec<Cells<'a>>,
    footer: Option<Cells<'a>>,
    note: Option<Cow<'a, str>>,
    alignments: Vec<Alignment>,
}

impl<'a> SvgTableBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caption(mut self, caption: impl Into<Cow<'a, str>>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn alignments(mut self, alignments: &[Alignment]) -> Self {
        self.alignments = alignments.to_vec();
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn row<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    /// Emphasized last row, typically totals.
    pub fn footer<I, S>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'a, str>>,
    {
        self.footer = Some(row.into_iter().map(Into::into).collect());
        self
    }

    /// Small print below the table.
    pub fn note(mut self, note: impl Into<Cow<'a, str>>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<u32> = self
            .headers
            .iter()
            .map(|h| estimate_text_width(h))
            .collect();
        for row in self.rows.iter().chain(self.footer.iter()) {
            for (width, cell) in col_widths.iter_mut().zip(row) {
                *width = (*width).max(estimate_text_width(cell));
            }
        }

        let table_width: u32 =
            col_widths.iter().sum::<u32>() + (col_count as u32 + 1) * CELL_PADDING;
        let caption_height = if self.caption.is_some() {
            CAPTION_FONT_SIZE + CELL_PADDING * 2
        } else {
            0
        };
        let total_width = [&self.caption, &self.note]
            .into_iter()
            .flatten()
            .map(|text| estimate_text_width(text))
            .fold(table_width, u32::max);
        let row_count = 1 + self.rows.len() as u32 + u32::from(self.footer.is_some());
        let table_height = LINE_HEIGHT * row_count + 2;
        let note_height = if self.note.is_some() { LINE_HEIGHT } else { 0 };
        let total_height = caption_height + table_height + note_height;

        let mut svg = String::with_capacity(4096);
        let _ = writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{total_height}" viewBox="0 0 {total_width} {total_height}">"#
        );
        let _ = writeln!(
            &mut svg,
            r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
        );
        let _ = writeln!(
            &mut svg,
            r##"<rect width="{total_width}" height="{total_height}" fill="#ffffff" />"##
        );

        if let Some(caption) = &self.caption {
            let _ = writeln!(
                &mut svg,
                r#"<text x="{CELL_PADDING}" y="{}" fill="{ROW_TEXT}" font-size="{CAPTION_FONT_SIZE}" font-weight="bold">{}</text>"#,
                CELL_PADDING + CAPTION_FONT_SIZE - 2,
                escape_xml(caption)
            );
        }

        let _ = writeln!(
            &mut svg,
            r#"<rect x="0" y="{caption_height}" width="{table_width}" height="{table_height}" fill="{BORDER_COLOR}" rx="4" />"#
        );

        let layout = RowLayout {
            widths: &col_widths,
            alignments: &self.alignments,
            inner_width: table_width - 2,
        };
        let mut y = caption_height + 1;
        layout.write(&mut svg, y, &self.headers, RowStyle::Header);
        for (idx, row) in self.rows.iter().enumerate() {
            y += LINE_HEIGHT;
            layout.write(&mut svg, y, row, RowStyle::Body(idx));
        }
        if let Some(footer) = &self.footer {
            y += LINE_HEIGHT;
            layout.write(&mut svg, y, footer, RowStyle::Footer);
        }

        if let Some(note) = &self.note {
            let _ = writeln!(
                &mut svg,
                r#"<text x="{CELL_PADDING}" y="{}" fill="{ROW_TEXT}" font-size="{NOTE_FONT_SIZE}">{}</text>"#,
                caption_height + table_height + LINE_HEIGHT / 2 + NOTE_FONT_SIZE / 2,
                escape_xml(note)
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

struct RowLayout<'w> {
    widths: &'w [u32],
    alignments: &'w [Alignment],
    inner_width: u32,
}

impl RowLayout<'_> {
    fn write(&self, svg: &mut String, y: u32, cells: &[Cow<'_, str>], style: RowStyle) {
        let (bg, fg, weight) = match style {
            RowStyle::Header => (HEADER_BG, HEADER_TEXT, "bold"),
            RowStyle::Body(idx) if idx % 2 == 0 => (ROW_BG_EVEN, ROW_TEXT, "normal"),
            RowStyle::Body(_) => (ROW_BG_ODD, ROW_TEXT, "normal"),
            RowStyle::Footer => (FOOTER_BG, ROW_TEXT, "bold"),
        };
        let _ = writeln!(
            svg,
            r#"<rect x="1" y="{y}" width="{}" height="{LINE_HEIGHT}" fill="{bg}" />"#,
            self.inner_width
        );

        let baseline = y + LINE_HEIGHT / 2 + FONT_SIZE / 2 - 2;
        let mut x = CELL_PADDING;
        for (idx, (cell, width)) in cells.iter().zip(self.widths).enumerate() {
            let alignment = self.alignments.get(idx).copied().unwrap_or_default();
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{baseline}" fill="{fg}" font-weight="{weight}" text-anchor="{}">{}</text>"#,
                compute_text_x(x, *width, alignment),
                alignment_anchor(alignment),
                escape_xml(cell)
            );
            x += width + CELL_PADDING;
        }
    }
}

fn estimate_text_width(text: &str) -> u32 {
    let width = text
        .chars()
        .map(|c| {
            if c.is_ascii() {
                CHAR_WIDTH
            } else {
                CHAR_WIDTH * 2.0
            }
        })
        .sum::<f32>();
    (width.ceil() as u32).max(20) + CELL_PADDING * 2
}

fn compute_text_x(cell_x: u32, cell_width: u32, alignment: Alignment) -> u32 {
    match alignment {
        Alignment::Left => cell_x,
        Alignment::Center => cell_x + cell_width / 2,
        Alignment::Right => cell_x + cell_width,
    }
}

fn alignment_anchor(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Left => "start",
        Alignment::Center => "middle",
        Alignment::Right => "end",
    }
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Stacks tables produced by [`SvgTableBuilder`] into one SVG, centered.
pub fn combine_svgs_vertically(svgs: &[&str]) -> Option<String> {
    const SPACING: u32 = 20;

    if svgs.is_empty() {
        return None;
    }

    let parts = svgs
        .iter()
        .map(|svg| {
            Some((
                extract_svg_dimension(svg, "width")?,
                extract_svg_dimension(svg, "height")?,
                extract_svg_body(svg)?,
            ))
        })
        .collect::<Option<Vec<_>>>()?;

    let max_width = parts.iter().map(|(width, _, _)| *width).max().unwrap_or(0);
    let total_height = parts.iter().map(|(_, height, _)| *height).sum::<u32>()
        + SPACING * (parts.len() as u32 - 1);

    let capacity = svgs.iter().map(|s| s.len()).sum::<usize>() + 512 + parts.len() * 64;
    let mut combined = String::with_capacity(capacity);
    let _ = writeln!(
        &mut combined,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{max_width}" height="{total_height}" viewBox="0 0 {max_width} {total_height}">"#
    );
    let _ = writeln!(
        &mut combined,
        r#"<style>text {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}px; }}</style>"#
    );
    let _ = writeln!(
        &mut combined,
        r##"<rect width="{max_width}" height="{total_height}" fill="#ffffff" />"##
    );

    let mut y_offset = 0u32;
    for (width, height, body) in parts {
        let x_offset = (max_width - width) / 2;
        let _ = writeln!(
            &mut combined,
            r#"<g transform="translate({x_offset}, {y_offset})">"#
        );
        combined.push_str(body);
        combined.push_str("</g>\n");
        y_offset += height + SPACING;
    }

    combined.push_str("</svg>");
    Some(combined)
}

fn extract_svg_dimension(svg: &str, attr: &str) -> Option<u32> {
    let pattern = format!("{attr}=\"");
    let start = svg.find(&pattern)? + pattern.len();
    let end = svg[start..].find('"')? + start;
    svg[start..end].parse().ok()
}

/// Inner markup of an `<svg>` element, minus its leading style block.
fn extract_svg_body(svg: &str) -> Option<&str> {
    const STYLE_TAG_CLOSE: &str = "</style>";

    let start = svg.find('>')? + 1;
    let end = svg.rfind("</svg>")?;
    let content = &svg[start..end];
    match content.find(STYLE_TAG_CLOSE) {
        Some(style_end) => Some(&content[style_end + STYLE_TAG_CLOSE.len()..]),
        None => Some(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn renders_headers_rows_and_footer() {
        let svg = SvgTableBuilder::new()
            .caption("UD ROTIGHAR")
            .alignments(&[Alignment::Left, Alignment::Right])
            .headers(["Participant", "Total"])
            .row(["Asha", "₹749.50"])
            .row(["Ravi", "₹749.50"])
            .footer(["Total", "₹1,499.00"])
            .build();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        for text in ["UD ROTIGHAR", "Asha", "Ravi", "₹749.50", "₹1,499.00"] {
            assert!(svg.contains(text), "missing {text}");
        }
        assert_eq!(svg.matches(FOOTER_BG).count(), 1);
        assert!(svg.contains(r#"text-anchor="end""#));
    }

    #[rstest]
    fn empty_headers_render_nothing() {
        assert!(SvgTableBuilder::new().row(["orphan"]).build().is_empty());
    }

    #[rstest]
    fn height_grows_with_caption_and_footer() {
        let plain = SvgTableBuilder::new().headers(["A"]).row(["1"]).build();
        let decorated = SvgTableBuilder::new()
            .caption("Receipt")
            .headers(["A"])
            .row(["1"])
            .footer(["1"])
            .build();

        let plain_height = extract_svg_dimension(&plain, "height").expect("height");
        let decorated_height = extract_svg_dimension(&decorated, "height").expect("height");
        assert_eq!(
            decorated_height - plain_height,
            LINE_HEIGHT + CAPTION_FONT_SIZE + CELL_PADDING * 2
        );
    }

    #[rstest]
    fn note_is_written_below_the_table() {
        let plain = SvgTableBuilder::new().headers(["A"]).row(["1"]).build();
        let noted = SvgTableBuilder::new()
            .headers(["A"])
            .row(["1"])
            .note("* rounded <separately>")
            .build();

        assert!(noted.contains("* rounded &lt;separately&gt;"));
        let plain_height = extract_svg_dimension(&plain, "height").expect("height");
        let noted_height = extract_svg_dimension(&noted, "height").expect("height");
        assert_eq!(noted_height - plain_height, LINE_HEIGHT);
    }

    #[rstest]
    #[case::escapes_all("<test & 'value'>", "&lt;test &amp; &#39;value&#39;&gt;")]
    #[case::keeps_plain("Kaju Paneer (A)", "Kaju Paneer (A)")]
    fn escapes_xml(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escape_xml(input), expected);
    }

    #[rstest]
    fn combines_tables_vertically() {
        let svg1 = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><text>First</text></svg>"#;
        let svg2 = r#"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60"><style>x</style><text>Second</text></svg>"#;

        let combined = combine_svgs_vertically(&[svg1, svg2]).expect("combined svg");

        assert!(combined.contains("First"));
        assert!(combined.contains("Second"));
        assert!(!combined.contains("<style>x</style>"));
        assert!(combined.contains("width=\"120\""));
        assert!(combined.contains("height=\"130\""));
        assert!(combine_svgs_vertically(&[]).is_none());
    }
}
