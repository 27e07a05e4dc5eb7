use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        Block, Borders, Clear, Paragraph, Wrap,
        canvas::{Canvas, Points},
    },
};

use ecoleta_core::{
    model::{Alert, Item, Position},
    screen::{DetailScreen, Marker, PointsScreen, ScreenPhase},
};

use crate::app::{App, HomeField, Page, PointsFocus};

/// Half-width of the visible map in degrees.
const MAP_SPAN: f64 = 0.024;
const TOGGLE_WIDTH: u16 = 18;
const BRAND_GREEN: Color = Color::Rgb(52, 203, 121);

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("ecoleta – find recycling collection points")
        .block(Block::default().borders(Borders::ALL).title("Ecoleta"));
    frame.render_widget(header, *header_area);

    match app.page() {
        Page::Home => draw_home(frame, app, *content_area),
        Page::Points => {
            if let Some(points) = &app.points {
                draw_points(frame, app, points.screen(), *content_area);
            }
        }
        Page::Detail => {
            if let Some(detail) = &app.detail {
                draw_detail(frame, detail.screen(), *content_area);
            }
        }
    }

    draw_status(frame, app, *status_area);
}

fn draw_status(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let nav_hint = match app.page() {
        Page::Home => "Type UF and city · Tab switch field · Enter search · Esc/Ctrl-C quit",
        Page::Points => {
            "Tab items/markers · ←/→ move · Space/Enter toggle or open · r reload · Esc back · q quit"
        }
        Page::Detail => "Esc/←/b back to map · q/Ctrl-C quit",
    };

    let error = match app.page() {
        Page::Home => app.home_error.as_deref(),
        Page::Points => app
            .points
            .as_ref()
            .and_then(|points| points.screen().last_error()),
        Page::Detail => None,
    };

    let status_text = if app.is_busy() {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = error {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };

    let status_style = if error.is_some() {
        Style::default().fg(Color::Red)
    } else if app.is_busy() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, area);
}

fn draw_home(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let [intro_area, uf_area, city_area, _rest] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::from("Your marketplace for waste collection.").bold(),
        Line::from("We help people find collection points efficiently.").fg(Color::Gray),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area);

    let fields = [
        (HomeField::Uf, "State (UF)", app.uf_input.as_str(), uf_area),
        (HomeField::City, "City", app.city_input.as_str(), city_area),
    ];
    for (field, title, value, field_area) in fields {
        let border_style = if app.home_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
        frame.render_widget(input, field_area);
    }
}

fn draw_points(frame: &mut Frame<'_>, app: &App, screen: &PointsScreen, area: Rect) {
    let [intro_area, map_area, items_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(6),
        Constraint::Length(5),
    ])
    .areas(area);

    let intro = Paragraph::new(vec![
        Line::from("Welcome.").bold(),
        Line::from("Find a collection point on the map.").fg(Color::Gray),
    ]);
    frame.render_widget(intro, intro_area);

    match screen.initial_position() {
        Some(center) => draw_map(frame, app, screen, center, map_area),
        None => draw_map_loading(frame, screen, map_area),
    }

    draw_items_row(frame, app, screen, items_area);

    if let Some(alert) = screen.alert() {
        draw_alert(frame, alert, area);
    }
}

fn draw_map_loading(frame: &mut Frame<'_>, screen: &PointsScreen, area: Rect) {
    let route = screen.route();
    let mut lines = vec![Line::from(""), Line::from("Loading map…").fg(Color::DarkGray)];
    if screen.alert().is_some() || screen.phase() == ScreenPhase::Ready {
        lines.push(Line::from("The map appears once your location is known.").fg(Color::DarkGray));
    }

    let loading = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Map · {} / {}", route.city, route.uf)),
    );
    frame.render_widget(loading, area);
}

fn draw_map(
    frame: &mut Frame<'_>,
    app: &App,
    screen: &PointsScreen,
    center: Position,
    area: Rect,
) {
    let route = screen.route();
    let markers: Vec<Marker<'_>> = screen.markers().collect();
    let focused = (app.points_focus == PointsFocus::Markers).then_some(app.marker_index);

    let focused_caption = focused
        .and_then(|index| markers.get(index))
        .map_or_else(
            || format!("{} points", markers.len()),
            |marker| format!("▶ {} · Enter for details", marker.label),
        );

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Map · {} / {}", route.city, route.uf))
                .title_bottom(focused_caption),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds([center.longitude - MAP_SPAN, center.longitude + MAP_SPAN])
        .y_bounds([center.latitude - MAP_SPAN, center.latitude + MAP_SPAN])
        .paint(move |ctx| {
            ctx.draw(&Points {
                coords: &[(center.longitude, center.latitude)],
                color: Color::Blue,
            });
            for (index, marker) in markers.iter().enumerate() {
                let color = if focused == Some(index) {
                    Color::Yellow
                } else {
                    BRAND_GREEN
                };
                let (x, y) = (marker.position.longitude, marker.position.latitude);
                ctx.draw(&Points {
                    coords: &[(x, y)],
                    color,
                });
                ctx.print(x, y, Line::styled(format!("● {}", marker.label), color));
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_items_row(frame: &mut Frame<'_>, app: &App, screen: &PointsScreen, area: Rect) {
    let items = screen.items();
    let block = Block::default()
        .borders(Borders::TOP)
        .title("Items (Space to toggle)");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if items.is_empty() {
        let placeholder = if screen.items_error().is_some() {
            Paragraph::new("Items unavailable · press r to retry").fg(Color::Red)
        } else {
            Paragraph::new("Loading items…").fg(Color::DarkGray)
        };
        frame.render_widget(placeholder, inner);
        return;
    }

    // Keep the cursor visible by scrolling the row.
    let visible = usize::from((inner.width / TOGGLE_WIDTH).max(1));
    let first = app.item_index.saturating_sub(visible - 1);
    let shown: Vec<(usize, &Item)> = items.iter().enumerate().skip(first).take(visible).collect();

    let cells = Layout::horizontal(vec![Constraint::Length(TOGGLE_WIDTH); shown.len()]).split(inner);
    for ((index, item), cell) in shown.into_iter().zip(cells.iter()) {
        let is_cursor = app.points_focus == PointsFocus::Items && index == app.item_index;
        draw_item_toggle(frame, item, screen.is_selected(item.id), is_cursor, *cell);
    }
}

fn draw_item_toggle(frame: &mut Frame<'_>, item: &Item, selected: bool, is_cursor: bool, area: Rect) {
    let mut border_style = if selected {
        Style::default().fg(BRAND_GREEN).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if is_cursor {
        border_style = border_style.add_modifier(Modifier::REVERSED);
    }

    let toggle = Paragraph::new(vec![
        Line::from(icon_label(&item.image_url)).fg(Color::DarkGray),
        Line::from(item.title.as_str()),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(toggle, area);
}

/// File stem of an icon URL, e.g. `lampadas` for `.../lampadas.svg`.
fn icon_label(url: &str) -> &str {
    let file = url.rsplit('/').next().unwrap_or(url);
    file.split('.').next().unwrap_or(file)
}

fn draw_alert(frame: &mut Frame<'_>, alert: &Alert, area: Rect) {
    let popup_area = centered_rect(50, 30, area);

    let text = vec![
        Line::from(alert.message.as_str()),
        Line::from(""),
        Line::from("Enter/Esc: OK").fg(Color::DarkGray),
    ];
    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(alert.title.as_str())
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

fn draw_detail(frame: &mut Frame<'_>, screen: &DetailScreen, area: Rect) {
    let title = format!("Collection point #{} (Esc/←/b to go back)", screen.point_id());
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(error) = screen.error() {
        let paragraph = Paragraph::new(format!("Could not load the point: {error}"))
            .style(Style::default().fg(Color::Red))
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let Some(detail) = screen.detail() else {
        let paragraph = Paragraph::new("Loading point…")
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    };

    let point = &detail.point;
    let accepted: Vec<&str> = detail.items.iter().map(|item| item.title.as_str()).collect();
    let label = Style::default().add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(point.name.as_str()).style(label.fg(BRAND_GREEN)),
        Line::from(accepted.join(", ")).fg(Color::Gray),
        Line::from(""),
        Line::from(vec![Span::styled("Address  ", label), Span::raw(format!("{}, {}", point.city, point.uf))]),
        Line::from(vec![Span::styled("E-mail   ", label), Span::raw(point.email.as_str())]),
        Line::from(vec![Span::styled("WhatsApp ", label), Span::raw(point.whatsapp.as_str())]),
        Line::from(vec![Span::styled("Image    ", label), Span::raw(point.image_url.as_str())]),
        Line::from(vec![
            Span::styled("Location ", label),
            Span::raw(Position::new(point.latitude, point.longitude).to_string()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
