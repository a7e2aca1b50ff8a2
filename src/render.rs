use crate::config::Settings;
use crate::input::Scene;
use crate::model::{Mood, PetState};
use crate::weather::WeatherCache;
use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
};

/// Everything the renderer needs for one frame, read-only.
pub(crate) struct View<'a> {
    pub(crate) scene: Scene,
    pub(crate) pet: &'a PetState,
    pub(crate) settings: &'a Settings,
    pub(crate) weather: &'a WeatherCache,
    pub(crate) speech: Option<&'a str>,
    pub(crate) frame_index: usize,
    pub(crate) bgm_volume: f32,
}

pub(crate) fn draw(f: &mut Frame, view: &View) {
    let area = f.size();
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(vec![
            Span::styled(
                format!(" {} ", view.settings.pet_name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("({}) ", view.settings.location_name),
                Style::default().fg(Color::Cyan),
            ),
        ]))
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(outer, area);

    let inner = area.inner(Margin {
        horizontal: 1,
        vertical: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(inner);

    render_status(f, rows[0], view);
    match view.scene {
        Scene::Main => render_main(f, rows[1], view),
        Scene::FeedMenu => render_menu(f, rows[1], "Feed", &view.settings.foods),
        Scene::PlayMenu => render_menu(f, rows[1], "Play", &view.settings.plays),
        Scene::Weather => render_forecast(f, rows[1], view),
        Scene::Help => render_help(f, rows[1]),
    }
    render_footer(f, rows[2], view);
}

fn render_status(f: &mut Frame, area: Rect, view: &View) {
    let mut spans = Vec::new();
    if view.settings.enable_weather {
        spans.push(Span::raw(view.weather.summarize()));
        spans.push(Span::styled(
            "  (w for details)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    if view.settings.enable_audio {
        spans.push(Span::styled(
            format!("   🔊 {}%", (view.bgm_volume * 100.0).round() as i32),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn render_main(f: &mut Frame, area: Rect, view: &View) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(area);

    render_meters(f, cols[0], view);
    render_sprite(f, cols[1], view);
}

fn render_meters(f: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().borders(Borders::ALL).title("Needs");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let stats = &view.pet.stats;
    let meter = |label: &str, value: f32, color: Color| {
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(f64::from(value.clamp(0.0, 100.0)) / 100.0)
            .label(format!("{label} {value:.0}/100"))
    };
    f.render_widget(meter("Hunger", stats.satiation, Color::Yellow), slots[0]);
    f.render_widget(meter("Energy", stats.energy, Color::Cyan), slots[1]);
    f.render_widget(meter("Happy", stats.happiness, Color::Magenta), slots[2]);

    let mood_line = Paragraph::new(Line::from(vec![
        Span::raw("Mood: "),
        Span::styled(
            view.pet.mood.label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(mood_line, slots[3]);
}

fn render_sprite(f: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if let Some(text) = view.speech {
        lines.push(Line::from(Span::styled(
            format!("💬 {text}"),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::from(""));

    let art = current_frame(view.pet.display_mood(), view.frame_index);
    for row in art.lines() {
        lines.push(Line::from(row.to_string()));
    }

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(p, inner);
}

fn render_menu(
    f: &mut Frame,
    area: Rect,
    title: &str,
    entries: &std::collections::BTreeMap<String, f32>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{title} (1-{}, Esc to cancel)", entries.len()));
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, gain))| {
            Line::from(vec![
                Span::styled(
                    format!("{}. ", i + 1),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{name} (+{gain:.0})")),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_forecast(f: &mut Frame, area: Rect, view: &View) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("📍 {} — 7-Day Forecast", view.settings.location_name));

    let Some(cur) = &view.weather.current else {
        f.render_widget(
            Paragraph::new("No weather data yet.")
                .style(Style::default().fg(Color::Yellow))
                .block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(format!(
            "{}° | Feels like: {}°",
            cur.temperature.round() as i64,
            cur.feels_like.round() as i64
        )),
        Line::from(format!(
            "{} Humidity: {:.0}%   Fetched: {}",
            crate::weather::code_emoji(cur.weather_code, cur.is_day),
            cur.humidity,
            cur.fetched_at.format("%H:%M")
        )),
    ]);
    f.render_widget(header, chunks[0]);

    let rows: Vec<Row> = view
        .weather
        .forecast
        .iter()
        .enumerate()
        .map(|(i, d)| {
            Row::new(vec![
                Cell::from(d.day_label(i)),
                Cell::from(crate::weather::code_emoji(d.weather_code, true)),
                Cell::from(format!("{:.0}%", d.precipitation_chance)),
                Cell::from(format!(
                    "{}° ━━ {}°",
                    d.temp_min.round() as i64,
                    d.temp_max.round() as i64
                )),
                Cell::from(crate::weather::code_description(d.weather_code)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Day", "", "PoP", "Temp", "Summary"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .column_spacing(1);
    f.render_widget(table, chunks[1]);
}

fn render_help(f: &mut Frame, area: Rect) {
    let body = "Keep your pet fed, rested and happy.\n\
Needs decay slowly; low hunger or energy drains happiness.\n\n\
f  feed (pick a food)\n\
p  play (pick an activity)\n\
s  sleep (full energy restore)\n\
t  pat / tickle\n\
w  weather forecast\n\
+/-  volume\n\
q  quit (state is saved)\n\n\
Esc closes any menu.";
    f.render_widget(
        Paragraph::new(body).block(Block::default().borders(Borders::ALL).title("How to play")),
        area,
    );
}

fn render_footer(f: &mut Frame, area: Rect, view: &View) {
    let hint = match view.scene {
        Scene::Main => "f feed  p play  s sleep  t pat  w weather  h help  +/- volume  q quit",
        Scene::FeedMenu | Scene::PlayMenu => "1-9 choose  Esc back  q quit",
        Scene::Weather | Scene::Help => "Esc back  q quit",
    };
    f.render_widget(
        Paragraph::new(hint).block(Block::default().borders(Borders::ALL).title("Keys")),
        area,
    );
}

/* -----------------------------
   Sprite frames
------------------------------ */

/// Two-frame ASCII loops per display mood. `frames_for` is exhaustive;
/// an empty set (none today) would fall back to the normal frames.
fn frames_for(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Normal => &[
            "  /\\_/\\\n ( o.o )\n  > ^ <",
            "  /\\_/\\\n ( o.- )\n  > ^ <",
        ],
        Mood::Happy => &[
            "  /\\_/\\\n ( ^.^ )\n  > ^ <",
            "  /\\_/\\\n ( ^o^ )\n  > ~ <",
        ],
        Mood::Love => &[
            "  /\\_/\\\n ( ♥.♥ )\n  > ^ <",
            "  /\\_/\\\n ( ♥w♥ )\n  > ~ <",
        ],
        Mood::Angry => &[
            "  /\\_/\\\n ( >.< )\n  > ^ <",
            "  /\\_/\\\n ( >_< )\n  > ^ <",
        ],
        Mood::Upset => &[
            "  /\\_/\\\n ( ;_; )\n  > ^ <",
            "  /\\_/\\\n ( T_T )\n  > ^ <",
        ],
        Mood::Excited => &[
            "  /\\_/\\\n ( O.O )\n  >>^<<",
            "  /\\_/\\\n ( O.O )!\n <<^>> ",
        ],
        Mood::MostAngry => &[
            "  /\\_/\\\n ( `A' )\n  > # <",
            "  /\\_/\\\n ( `A' )#\n  > # <",
        ],
    }
}

fn current_frame(mood: Mood, index: usize) -> &'static str {
    let frames = frames_for(mood);
    let frames = if frames.is_empty() {
        frames_for(Mood::Normal)
    } else {
        frames
    };
    frames[index % frames.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mood_has_frames() {
        for mood in [
            Mood::Normal,
            Mood::Happy,
            Mood::Love,
            Mood::Angry,
            Mood::Upset,
            Mood::Excited,
            Mood::MostAngry,
        ] {
            assert!(!frames_for(mood).is_empty());
        }
    }

    #[test]
    fn frame_index_wraps() {
        assert_eq!(current_frame(Mood::Normal, 0), current_frame(Mood::Normal, 2));
        assert_ne!(current_frame(Mood::Normal, 0), current_frame(Mood::Normal, 1));
    }
}
