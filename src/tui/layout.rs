//! Tabbed layout.
//!
//! ```text
//! ┌─[^1 Banks*]─[^2 Simple]─[^3 README]─[^4 WWISER]─┐
//! │ Filter: event (f)   Load all (a)   Detail (h)     │  ← bank tab only
//! ├───────────────────────────────────────────────────┤
//! │  (node tree, or the text of the active view)      │
//! ├───────────────────────────────────────────────────┤
//! │ [loaded] [in flight: 2] No nodes found            │
//! └───────────────────────────────────────────────────┘
//! ```

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::node::fragment;
use crate::view::{View, ViewId};

use super::app::{TuiApp, HIDE_DETAIL_PANEL};
use super::surface::ModalKind;

/// Draw the full TUI layout.
pub fn draw(f: &mut Frame, app: &mut TuiApp) {
    let tools_height = if app.active_view().has_node_tree() { 1 } else { 0 };
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // tab bar
            Constraint::Length(tools_height), // bank tools
            Constraint::Min(3),               // content area
            Constraint::Length(1),            // status bar
        ])
        .split(f.area());

    draw_tab_bar(f, app, outer[0]);
    if tools_height > 0 {
        draw_tools(f, app, outer[1]);
    }

    app.viewport_height = outer[2].height.saturating_sub(2);
    match app.active_view() {
        ViewId::BankList => draw_bank(f, app, outer[2]),
        other => draw_text_view(f, app, other, outer[2]),
    }

    draw_status(f, app, outer[3]);
    draw_modal(f, app);
}

fn draw_tab_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
    let registry = app.viewer.registry();
    let spans: Vec<Span> = ViewId::ALL
        .iter()
        .enumerate()
        .flat_map(|(i, id)| {
            let is_active = registry.is_active(*id);
            let style = if is_active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let loaded = if registry.view(*id).is_loaded() { "*" } else { "" };
            vec![
                Span::raw(" "),
                Span::styled(format!("[^{} {}{loaded}]", i + 1, id.title()), style),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_tools(f: &mut Frame, app: &TuiApp, area: Rect) {
    let filter = app.viewer.filter().unwrap_or("(all)");
    let detail = if app.viewer.registry().bank().panel_hidden(HIDE_DETAIL_PANEL) {
        "hidden"
    } else {
        "shown"
    };
    let key = Style::default().fg(Color::Yellow);
    let line = Line::from(vec![
        Span::raw(" Filter: "),
        Span::styled(filter.to_string(), Style::default().fg(Color::Cyan)),
        Span::styled(" (f)", key),
        Span::raw("   Load all"),
        Span::styled(" (a)", key),
        Span::raw(format!("   Detail: {detail}")),
        Span::styled(" (h)", key),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_bank(f: &mut Frame, app: &mut TuiApp, area: Rect) {
    let bank = app.viewer.registry().bank();
    let block = Block::default()
        .title(format!(" Banks ({} nodes) ", bank.nodes.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if !bank.is_loaded() {
        f.render_widget(placeholder_text(bank).block(block), area);
        return;
    }
    if bank.nodes.is_empty() {
        let text = bank
            .content()
            .map(|c| fragment::to_text(c.as_str()))
            .unwrap_or_default();
        let para = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0));
        f.render_widget(para, area);
        return;
    }

    app.refresh_tree();
    match tui_tree_widget::Tree::new(&app.tree_items) {
        Ok(tree) => {
            let tree = tree
                .block(block)
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            f.render_stateful_widget(tree, area, &mut app.tree_state);
        }
        Err(_) => {
            let para = Paragraph::new("Error building node tree").block(block);
            f.render_widget(para, area);
        }
    }
}

fn draw_text_view(f: &mut Frame, app: &TuiApp, id: ViewId, area: Rect) {
    let view = app.viewer.registry().view(id);
    let block = Block::default()
        .title(format!(" {} ", id.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let para = match view.content() {
        Some(content) => Paragraph::new(fragment::to_text(content.as_str())),
        None => placeholder_text(view),
    };
    f.render_widget(
        para.block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.scroll, 0)),
        area,
    );
}

fn placeholder_text(view: &View) -> Paragraph<'static> {
    let msg = if view.is_pending() {
        "Loading..."
    } else {
        "Not loaded."
    };
    Paragraph::new(Span::styled(msg, Style::default().fg(Color::DarkGray)))
}

fn draw_status(f: &mut Frame, app: &TuiApp, area: Rect) {
    let view = app.viewer.registry().view(app.active_view());
    let state = if view.is_loaded() {
        Span::styled("loaded", Style::default().fg(Color::Green))
    } else if view.is_pending() {
        Span::styled("loading...", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("empty", Style::default().fg(Color::DarkGray))
    };
    let size = view
        .content()
        .map(|c| payload_size(c.as_str().len()))
        .unwrap_or_else(|| "-".into());

    let mut spans = vec![
        Span::styled(" [", Style::default().fg(Color::DarkGray)),
        state,
        Span::styled("]", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(format!("[{size}]"), Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("[in flight: {}]", app.viewer.in_flight()),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("  "),
    ];
    if let Some(notice) = app.viewer.surface().notice() {
        spans.push(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::styled(
            "^1-4/Tab:Tabs  \u{2191}\u{2193}:Move  Enter:Toggle  q:Quit",
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_modal(f: &mut Frame, app: &TuiApp) {
    let Some(modal) = app.viewer.surface().current_modal() else {
        return;
    };
    let (title, hint, color) = match modal.kind {
        ModalKind::Alert => (" Error ", "any key to continue", Color::Red),
        ModalKind::Confirm => (" Confirm ", "y: continue   n: cancel", Color::Yellow),
    };

    let area = centered_rect(60, 7, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));
    let lines = vec![
        Line::from(modal.message.clone()),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// Payload size for the status bar.
fn payload_size(bytes: usize) -> String {
    match bytes {
        b if b >= 1 << 20 => format!("{:.1} MB", b as f64 / (1u64 << 20) as f64),
        b if b >= 1 << 10 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{b} B"),
    }
}

/// A `width` x `height` rect centered in `outer` (clamped to fit).
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let w = width.min(outer.width);
    let h = height.min(outer.height);
    Rect::new(
        outer.x + (outer.width - w) / 2,
        outer.y + (outer.height - h) / 2,
        w,
        h,
    )
}
