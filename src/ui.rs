use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap};

use marmalade::view::{Countdown, Dashboard, format_countdown, format_hashrate};
use marmalade::{Clock, SnapshotStore};

use crate::app::{App, PaneFocus};

pub fn draw<S: SnapshotStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>) {
    let dash = app.dashboard();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3), Constraint::Length(8)])
        .split(f.size());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    draw_mining(f, left_chunks[0], app, &dash);
    draw_factories(f, left_chunks[1], app, &dash);
    draw_daily(f, right_chunks[0], app, &dash);
    draw_achievements(f, right_chunks[1], app, &dash);
    draw_ticker(f, chunks[1], &dash);
    draw_footer(f, chunks[2], app);
}

fn draw_mining<S, C>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>, dash: &Dashboard) {
    let block = pane_block("Mining", app.focus == PaneFocus::Mining);
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);
    let segments = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let ratio = (f64::from(dash.progress_percent) / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().title("Marmalade"))
        .ratio(ratio)
        .gauge_style(
            Style::default()
                .fg(Color::LightYellow)
                .bg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .label(format!("{}%", dash.progress_percent));
    f.render_widget(gauge, segments[0]);

    let (status, status_color) = match dash.countdown {
        Countdown::Ready => ("Press C or Enter to collect".to_string(), Color::LightGreen),
        Countdown::Remaining { .. } => (
            format!("Next batch in {}", format_countdown(dash.countdown)),
            Color::Gray,
        ),
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("Hashrate ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_hashrate(dash.hashrate),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  |  Efficiency "),
            Span::styled(
                format!("{}%", dash.efficiency_percent),
                Style::default().fg(Color::LightCyan),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format_countdown(dash.countdown),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(status, Style::default().fg(status_color)),
        ]),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(paragraph, segments[1]);
}

fn draw_factories<S, C>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>, dash: &Dashboard) {
    let block = pane_block("Factories", app.focus == PaneFocus::Factories);
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled("Total boost ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("+{:.1} H/s", dash.total_boost),
            Style::default().fg(Color::LightGreen),
        ),
        Span::raw("  |  Balance "),
        Span::styled(
            format!("{} MARM", dash.balance),
            Style::default().fg(Color::LightCyan),
        ),
    ])]);
    let segments = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);
    f.render_widget(header, segments[0]);

    let items: Vec<ListItem> = dash
        .upgrades
        .iter()
        .map(|row| {
            let content = Line::from(vec![
                Span::styled(
                    format!("{:>2}×", row.count),
                    Style::default().fg(if row.count > 0 {
                        Color::LightGreen
                    } else {
                        Color::DarkGray
                    }),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<15}", row.label),
                    Style::default().fg(Color::White),
                ),
                Span::raw("  next:"),
                Span::styled(
                    format!(" {:.0} MARM", row.cost),
                    Style::default().fg(if row.affordable {
                        Color::LightCyan
                    } else {
                        Color::Red
                    }),
                ),
            ]);
            ListItem::new(vec![content])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::NONE))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default();
    state.select(Some(app.selected_upgrade));
    f.render_stateful_widget(list, segments[1], &mut state);
}

fn draw_daily<S, C>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>, dash: &Dashboard) {
    let block = pane_block("Daily Bonus", app.focus == PaneFocus::Daily);
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let mut calendar = Vec::new();
    for (idx, claimed) in dash.claimed_slots.iter().enumerate() {
        let slot = idx as u8 + 1;
        let mut style = if *claimed {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if slot == dash.today_slot {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        let mark = if *claimed { '✓' } else { '·' };
        calendar.push(Span::styled(format!(" {}{} ", slot, mark), style));
    }

    let claim_line = if dash.daily_claimable {
        Line::from(vec![
            Span::styled("Claim today: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("+{} MARM", dash.next_daily_grant),
                Style::default().fg(Color::LightCyan),
            ),
            Span::raw("  [D]"),
        ])
    } else {
        Line::from(Span::styled(
            "Already claimed",
            Style::default().fg(Color::DarkGray),
        ))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Streak ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} days", dash.streak),
                Style::default().fg(Color::Yellow),
            ),
        ]),
        Line::from(calendar),
        Line::from(""),
        claim_line,
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(paragraph, inner);
}

fn draw_achievements<S, C>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>, dash: &Dashboard) {
    let block = pane_block("Achievements", app.focus == PaneFocus::Achievements);
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let items: Vec<ListItem> = dash
        .achievements
        .iter()
        .map(|row| {
            let (mark, color) = if row.achieved {
                ("★", Color::Yellow)
            } else {
                ("☆", Color::DarkGray)
            };
            let title = Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::styled(row.label, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(row.detail.clone(), Style::default().fg(Color::LightCyan)),
            ]);
            let description = Line::from(Span::styled(
                format!("  {}", row.description),
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
            ));
            ListItem::new(vec![title, description])
        })
        .collect();

    f.render_widget(List::new(items), inner);
}

fn draw_ticker(f: &mut Frame<'_>, area: Rect, dash: &Dashboard) {
    let block = Block::default()
        .title("Ticker")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let spans = vec![
        Span::styled(
            format!("Balance {} MARM", dash.balance),
            Style::default().fg(Color::LightGreen),
        ),
        Span::raw("  |  "),
        Span::styled(
            format_hashrate(dash.hashrate),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Mining {}%", dash.progress_percent),
            Style::default().fg(Color::LightCyan),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);
    f.render_widget(paragraph, inner);
}

fn draw_footer<S, C>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Ops & Feed")
        .border_style(Style::default().fg(Color::Gray));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let instruction_lines = vec![
        Line::from("Tab cycle focus | Q quit"),
        Line::from("C collect | D claim daily bonus"),
        Line::from("Mining: Enter collect"),
        Line::from("Factories: ↑↓ select  Enter purchase"),
        Line::from("Daily: Enter claim"),
    ];
    let instruction = Paragraph::new(instruction_lines).wrap(Wrap { trim: true });
    f.render_widget(instruction, columns[0]);

    let mut message_lines: Vec<Line> = Vec::new();
    for msg in app.messages.iter() {
        message_lines.push(Line::from(Span::raw(msg.clone())));
    }
    if message_lines.is_empty() {
        message_lines.push(Line::from(Span::styled(
            "The mine hums quietly...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let feed = Paragraph::new(message_lines).wrap(Wrap { trim: true });
    f.render_widget(feed, columns[1]);
}

fn pane_block<'a>(title: &'a str, focused: bool) -> Block<'a> {
    let border_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Block::default()
        .title(Span::styled(title, Style::default().fg(Color::White)))
        .borders(Borders::ALL)
        .border_style(border_style)
}
