//! Rendering for the quest TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Render the whole frame.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(5),    // story
            Constraint::Length(3), // stats
            Constraint::Length(6), // choices
            Constraint::Length(1), // status line
        ])
        .split(area);

    render_title(f, app, chunks[0]);
    render_story(f, app, chunks[1]);
    render_stats(f, app, chunks[2]);
    render_choices(f, app, chunks[3]);
    render_status(f, app, chunks[4]);

    if app.show_help {
        render_help(f, app, area);
    }
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Fantasy Adventure Quest",
        app.theme.title_style(),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style()),
    );
    f.render_widget(title, area);
}

fn render_story(f: &mut Frame, app: &App, area: Rect) {
    let story = match &app.scene {
        Some(scene) => scene.story.clone(),
        None => "The tale is being written...".to_string(),
    };

    let paragraph = Paragraph::new(story)
        .style(app.theme.story_style())
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style())
                .title(" Story "),
        );
    f.render_widget(paragraph, area);
}

fn render_stats(f: &mut Frame, app: &App, area: Rect) {
    let player = &app.player;
    let inventory = if player.inventory.is_empty() {
        "none".to_string()
    } else {
        player.inventory.join(", ")
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" Health: {}", player.health),
            app.theme.health_style(player.health),
        ),
        Span::raw("   "),
        Span::styled(format!("Gold: {}", player.gold), app.theme.gold_style()),
        Span::raw("   "),
        Span::raw(format!("Step: {}/{}", player.step, app.max_steps)),
        Span::raw("   "),
        Span::styled(format!("Inventory: {inventory}"), app.theme.system_style()),
    ]);

    let stats = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style())
            .title(" Adventurer "),
    );
    f.render_widget(stats, area);
}

fn render_choices(f: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match &app.scene {
        Some(scene) if scene.is_terminal() => {
            lines.push(Line::from(Span::styled(
                "The story has ended.",
                app.theme.story_style(),
            )));
            lines.push(Line::from(Span::styled(
                "Press 'r' to play again, 'q' to quit.",
                app.theme.system_style(),
            )));
        }
        Some(scene) => {
            for (i, choice) in scene.choices.iter().enumerate().take(3) {
                let style = if app.generating {
                    app.theme.system_style()
                } else {
                    app.theme.choice_style()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!(" {}. ", i + 1), app.theme.choice_key_style()),
                    Span::styled(choice.clone(), style),
                ]));
            }
        }
        None => {}
    }

    let choices = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style())
            .title(" Choices "),
    );
    f.render_widget(choices, area);
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(loading) = app.loading_line() {
        Line::from(Span::styled(loading, app.theme.loading_style()))
    } else if let Some(status) = app.status_message() {
        Line::from(Span::styled(status.to_string(), app.theme.system_style()))
    } else {
        Line::from(Span::styled(
            "Press 1-3 to choose, '?' for help",
            app.theme.system_style(),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from("  1-3       choose an option"),
        Line::from("  r         play again (after the end)"),
        Line::from("  j/k       scroll the story"),
        Line::from("  g         jump to the top"),
        Line::from("  ?         toggle this help"),
        Line::from("  q / Esc   quit"),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.theme.border_style())
            .title(" Help "),
    );
    f.render_widget(help, popup);
}

/// Helper to build a centered rect using percentages of the given area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
