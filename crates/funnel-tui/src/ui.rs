//! Rendering of the search screen

use funnel_core::item::{SalesFunnelItem, StatusTone, format_currency};
use funnel_core::lists::SalesFunnelList;
use funnel_core::view::{ListTab, SearchPhase, SearchState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use crate::app::{App, active_tab_index, tabs_visible};

pub fn draw(frame: &mut Frame, app: &App, state: &SearchState) {
    let show_tabs = tabs_visible(state);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),                              // Title
            Constraint::Length(3),                              // Search bar
            Constraint::Length(if show_tabs { 3 } else { 0 }), // List tabs
            Constraint::Min(5),                                 // Results
            Constraint::Length(1),                              // Key help
        ])
        .split(frame.area());

    let title = Paragraph::new(app.title.as_str())
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(title, chunks[0]);

    render_search_bar(frame, app, state, chunks[1]);
    if show_tabs {
        render_tabs(frame, state, chunks[2]);
    }
    render_results(frame, app, state, chunks[3]);

    let help = Paragraph::new(
        "Enter: Search | Esc: Clear | Ctrl-F: Field | ←/→: Lists | ↑/↓: Scroll | Ctrl-C: Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn render_search_bar(frame: &mut Frame, app: &App, state: &SearchState, area: Rect) {
    let input = if state.query.is_empty() {
        Span::styled(app.placeholder.as_str(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.query.as_str())
    };

    let status = if state.is_loading { " Searching… " } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Search · {} ", state.search_field.label()))
        .title_bottom(Line::from(status).right_aligned());

    frame.render_widget(Paragraph::new(Line::from(input)).block(block), area);

    let cursor_x = area.x + 1 + state.query.chars().count() as u16;
    frame.set_cursor_position((cursor_x.min(area.right().saturating_sub(2)), area.y + 1));
}

fn render_tabs(frame: &mut Frame, state: &SearchState, area: Rect) {
    let titles: Vec<Line> = state
        .tabs()
        .into_iter()
        .map(|tab| Line::from(format!("{} ({})", tab.label(), state.count_for(tab))))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Lists"))
        .select(active_tab_index(state))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, area);
}

fn render_results(frame: &mut Frame, app: &App, state: &SearchState, area: Rect) {
    let filtered = state.filtered_results();

    let lines: Vec<Line> = match state.phase() {
        SearchPhase::Searching => vec![
            Line::from(""),
            Line::from("Searching across all Sales Funnel lists...").centered(),
        ],
        SearchPhase::Error => vec![
            Line::from(""),
            Line::styled(
                format!("⚠ {}", state.error_message.as_deref().unwrap_or_default()),
                Style::default().fg(Color::Red),
            )
            .centered(),
        ],
        SearchPhase::Idle => vec![
            Line::from(""),
            Line::styled(
                "Search the Sales Funnel",
                Style::default().add_modifier(Modifier::BOLD),
            )
            .centered(),
            Line::from(format!(
                "Search across {} lists by project name, owner, city, estimator, status, and more",
                SalesFunnelList::ALL.len()
            ))
            .centered(),
        ],
        _ if filtered.is_empty() => vec![
            Line::from(""),
            Line::styled(
                format!("No results for \"{}\"", state.query),
                Style::default().add_modifier(Modifier::BOLD),
            )
            .centered(),
            Line::from("Try a different keyword or change the search field").centered(),
        ],
        _ => {
            let mut lines = vec![
                Line::styled(state.summary(), Style::default().fg(Color::Gray)),
                Line::from(""),
            ];
            for item in &filtered {
                lines.extend(card_lines(item));
            }
            lines
        }
    };

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(match state.active_tab {
            ListTab::All => "Results".to_string(),
            ListTab::List(list) => format!("Results · {}", list),
        }))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(body, area);
}

fn card_lines(item: &SalesFunnelItem) -> Vec<Line<'static>> {
    let mut header = vec![Span::styled(
        item.headline().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if !item.status.is_empty() {
        header.push(Span::raw("  "));
        header.push(Span::styled(
            format!("[{}]", item.status),
            Style::default().fg(tone_color(item.status_tone())),
        ));
    }

    let (r, g, b) = item.source_list.badge_rgb();
    let mut sub = vec![Span::styled(
        format!(" {} ", item.source_list),
        Style::default().fg(Color::White).bg(Color::Rgb(r, g, b)),
    )];
    if !item.bid2win_id.is_empty() {
        sub.push(Span::styled(
            format!("  ID: {}", item.bid2win_id),
            Style::default().fg(Color::Gray),
        ));
    }

    let mut lines = vec![Line::from(header), Line::from(sub)];

    let location = item.location();
    let fields = [
        ("Owner", item.owner.as_str()),
        ("Estimator", item.estimator.as_str()),
        ("Business Area", item.business_area.as_str()),
        ("Segment", item.segment.as_str()),
        ("Location", location.as_str()),
        ("Bid Date", item.bid_date.as_str()),
        ("Award Date", item.award_date.as_str()),
        ("Prime/Sub", item.prime_or_sub.as_str()),
        ("Plant", item.plant.as_str()),
        ("Low Bidder", item.low_bidder_name.as_str()),
        ("PIS Status", item.pis_status.as_str()),
    ];
    for (label, value) in fields.into_iter().filter(|(_, v)| !v.is_empty()) {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value.to_string()),
        ]));
    }

    let value = format_currency(item.estimated_value);
    if !value.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("  Estimated Value ", Style::default().fg(Color::DarkGray)),
            Span::styled(value, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        ]));
    }

    lines.push(Line::styled(
        format!("  {}", item.item_url),
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
    ));
    lines.push(Line::from(""));
    lines
}

fn tone_color(tone: StatusTone) -> Color {
    match tone {
        StatusTone::Won => Color::Green,
        StatusTone::Lost => Color::Red,
        StatusTone::Pending => Color::Yellow,
        StatusTone::Cancelled => Color::DarkGray,
        StatusTone::Default => Color::Gray,
    }
}
