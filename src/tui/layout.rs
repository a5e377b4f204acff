//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Table, TableState};

use super::app::App;
use super::style;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let rows = app.report.lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),        // header
            Constraint::Length(rows + 3), // table
            Constraint::Min(rows + 2),    // bar chart
            Constraint::Length(5),        // summary
            Constraint::Length(1),        // footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_chart(frame, app, chunks[2]);
    render_summary(frame, app, chunks[3]);
    render_footer(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![Span::styled(
        " SMART POWER ANALYTICS ",
        Style::default()
            .fg(style::HEADER_FG)
            .bg(style::HEADER_BG)
            .add_modifier(Modifier::BOLD),
    )]);
    frame.render_widget(Paragraph::new(header), area);
}

/// Appliance / quantity / energy table with the selected row highlighted.
fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .report
        .lines
        .iter()
        .map(|l| {
            Row::new(vec![
                l.name.clone(),
                l.quantity.to_string(),
                format!("{:.2}", l.share),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ],
    )
    .header(
        Row::new(vec!["Appliance", "Quantity", "Energy (kWh)"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" Allocation "))
    .row_highlight_style(Style::default().bg(style::SELECTED_BG));

    let mut state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Horizontal bar chart of energy share per line.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let threshold = app.report.high_usage_threshold;
    let bars: Vec<Bar> = app
        .report
        .lines
        .iter()
        .map(|l| {
            let color = if l.share > threshold {
                style::BAR_HIGH
            } else {
                style::BAR_COLOR
            };
            Bar::default()
                .value(style::bar_value(l.share))
                .text_value(format!("{:.2}", l.share))
                .label(Line::from(l.name.clone()))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Power Usage by Appliance "),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

/// Total reading, cost estimate, and saving tips.
fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let r = &app.report;
    let mut lines = vec![
        Line::from(format!("Total EB reading used: {:.2} kWh", r.total_energy)),
        Line::from(format!(
            "Estimated monthly cost: {}{:.2}",
            r.currency, r.monthly_cost
        )),
    ];
    lines.extend(
        r.tips
            .iter()
            .map(|t| Line::from(Span::styled(t.clone(), Style::default().fg(style::TIP_FG)))),
    );

    let panel =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Summary "));
    frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let help = Line::from(Span::styled(
        " ↑/↓ select │ Home/End jump │ q quit ",
        Style::default().fg(style::FOOTER_FG),
    ));
    frame.render_widget(Paragraph::new(help), area);
}
