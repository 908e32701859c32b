//! Page and popup rendering for the demo host
//!
//! The page is laid out as a flat list of text rows; the row assigned
//! to each element doubles as its layout offset, which is what anchor
//! scrolling targets. A hit map records which node was painted where so
//! mouse input can be routed back into the controller.

use super::Frame;
use crate::page::{Document, NodeId, Selector};
use crate::popup::{markers, PopupController};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

/// Map from painted screen rectangles to page nodes, in paint order.
/// Later entries sit on top of earlier ones.
#[derive(Debug, Default)]
pub struct HitMap {
    entries: Vec<(Rect, NodeId)>,
}

impl HitMap {
    fn push(&mut self, rect: Rect, node: NodeId) {
        self.entries.push((rect, node));
    }

    /// Topmost node under the given screen position.
    pub fn hit(&self, column: u16, row: u16) -> Option<NodeId> {
        self.entries
            .iter()
            .rev()
            .find(|(rect, _)| {
                column >= rect.x
                    && column < rect.x + rect.width
                    && row >= rect.y
                    && row < rect.y + rect.height
            })
            .map(|&(_, node)| node)
    }
}

/// One rendered row and the node it belongs to.
struct PageLine {
    line: Line<'static>,
    node: NodeId,
}

/// Render the page, the active popup (if any) and the status bar.
/// Returns the hit map for this frame.
pub fn render(
    frame: &mut Frame<'_>,
    doc: &mut Document,
    controller: &PopupController,
    status: Option<&str>,
) -> HitMap {
    let mut hits = HitMap::default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(frame.size());

    render_page(frame, chunks[0], doc, &mut hits);
    if let Some(modal) = controller.active() {
        render_popup(frame, chunks[0], doc, modal, &mut hits);
    }
    render_status(frame, chunks[1], status);

    hits
}

fn render_page(frame: &mut Frame<'_>, area: Rect, doc: &mut Document, hits: &mut HitMap) {
    let width = area.width.saturating_sub(4).max(20) as usize;
    let lines = layout_page(doc, width);

    let total = lines.len() as u16;
    let max_scroll = total.saturating_sub(area.height);
    let scroll = doc.scroll_top().min(max_scroll);
    doc.set_scroll_top(scroll);

    let visible: Vec<Line<'static>> = lines
        .iter()
        .skip(scroll as usize)
        .take(area.height as usize)
        .map(|page_line| page_line.line.clone())
        .collect();
    frame.render_widget(Paragraph::new(visible), area);

    for (row, page_line) in lines
        .iter()
        .skip(scroll as usize)
        .take(area.height as usize)
        .enumerate()
    {
        let rect = Rect {
            x: area.x,
            y: area.y + row as u16,
            width: area.width,
            height: 1,
        };
        hits.push(rect, page_line.node);
    }
}

/// Flatten the page into rows, skipping popup overlays, and record each
/// element's row as its layout offset.
fn layout_page(doc: &mut Document, width: usize) -> Vec<PageLine> {
    let mut lines = Vec::new();
    let top_level: Vec<NodeId> = doc.children(doc.body()).to_vec();

    for section in top_level {
        if doc.element(section).has_class(markers::OVERLAY_CLASS) {
            continue;
        }
        layout_block(doc, section, width, &mut lines);
        lines.push(PageLine {
            line: Line::default(),
            node: section,
        });
    }
    lines
}

fn layout_block(doc: &mut Document, node: NodeId, width: usize, lines: &mut Vec<PageLine>) {
    doc.element_mut(node).set_offset_top(lines.len() as u16);
    let tag = doc.element(node).tag().to_string();
    let text = doc.element(node).text().unwrap_or("").to_string();
    let focused = doc.active_element() == Some(node);

    match tag.as_str() {
        "h1" => lines.push(PageLine {
            line: heading_line(&text, width, Style::default().add_modifier(Modifier::BOLD)),
            node,
        }),
        "h2" | "h3" => lines.push(PageLine {
            line: heading_line(
                &text,
                width,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            node,
        }),
        "p" => {
            for wrapped in textwrap::wrap(&text, width) {
                lines.push(PageLine {
                    line: Line::from(format!("  {wrapped}")),
                    node,
                });
            }
        }
        "button" | "a" => lines.push(PageLine {
            line: interactive_line(&tag, &text, width, focused),
            node,
        }),
        _ => {
            let children: Vec<NodeId> = doc.children(node).to_vec();
            for child in children {
                layout_block(doc, child, width, lines);
            }
        }
    }
}

fn heading_line(text: &str, width: usize, style: Style) -> Line<'static> {
    Line::from(Span::styled(clip(text, width), style))
}

fn interactive_line(tag: &str, text: &str, width: usize, focused: bool) -> Line<'static> {
    let label = match tag {
        "button" => format!("[ {} ]", clip(text, width.saturating_sub(4))),
        _ => format!("<{}>", clip(text, width.saturating_sub(2))),
    };
    let style = if focused {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    Line::from(vec![Span::raw("  "), Span::styled(label, style)])
}

/// Clip text to a display width, appending an ellipsis when truncated.
fn clip(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.width() + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('~');
    out
}

fn render_popup(
    frame: &mut Frame<'_>,
    area: Rect,
    doc: &mut Document,
    modal: NodeId,
    hits: &mut HitMap,
) {
    // Dim the page; the whole backdrop belongs to the overlay in the
    // hit map, so presses on it close the popup.
    frame.render_widget(
        Block::default().style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
    if let Some(overlay) = doc.closest(modal, &Selector::class(markers::OVERLAY_CLASS)) {
        hits.push(area, overlay);
    }

    let max_width = area.width.saturating_sub(4).max(1);
    let width = (area.width * 3 / 5).clamp(24.min(max_width), max_width);
    let inner_width = width.saturating_sub(4) as usize;

    let (title, content) = layout_modal(doc, modal, inner_width);
    let height = (content.len() as u16 + 2).min(area.height.saturating_sub(2).max(3));
    let rect = centered(area, width, height);

    frame.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.unwrap_or_default())
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);
    hits.push(rect, modal);

    let visible: Vec<Line<'static>> = content
        .iter()
        .take(inner.height as usize)
        .map(|page_line| page_line.line.clone())
        .collect();
    frame.render_widget(Paragraph::new(visible), inner);

    for (row, page_line) in content.iter().take(inner.height as usize).enumerate() {
        let rect = Rect {
            x: inner.x,
            y: inner.y + row as u16,
            width: inner.width,
            height: 1,
        };
        hits.push(rect, page_line.node);
    }
}

/// Lay out a modal's children: the first heading becomes the frame
/// title, the rest become content rows.
fn layout_modal(
    doc: &Document,
    modal: NodeId,
    width: usize,
) -> (Option<String>, Vec<PageLine>) {
    let mut title = None;
    let mut lines = Vec::new();

    for &child in doc.children(modal) {
        let element = doc.element(child);
        let text = element.text().unwrap_or("").to_string();
        match element.tag() {
            "h1" | "h2" | "h3" if title.is_none() => {
                title = Some(format!(" {} ", clip(&text, width)));
            }
            "p" => {
                for wrapped in textwrap::wrap(&text, width) {
                    lines.push(PageLine {
                        line: Line::from(format!(" {wrapped}")),
                        node: child,
                    });
                }
                lines.push(PageLine {
                    line: Line::default(),
                    node: child,
                });
            }
            "button" | "a" => {
                let focused = doc.active_element() == Some(child);
                lines.push(PageLine {
                    line: interactive_line(element.tag(), &text, width, focused),
                    node: child,
                });
            }
            _ => {}
        }
    }

    (title, lines)
}

fn render_status(frame: &mut Frame<'_>, area: Rect, status: Option<&str>) {
    let hints = "Tab: focus  Enter: activate  Esc: close  q: quit";
    let line = Line::from(vec![
        Span::styled(
            status.unwrap_or("").to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
