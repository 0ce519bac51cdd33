use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{
    pos2, vec2, Align2, Color32, CornerRadius, FontId, Rect, RichText, ScrollArea, Sense, Ui,
};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, heat_color, ColorMap};
use crate::data::aggregate::{self, CrossTab, HotLocation};
use crate::data::model::MONTH_TICKS;
use crate::state::{AnalysisMode, AppState};

// ---------------------------------------------------------------------------
// Central panel – section title + active chart
// ---------------------------------------------------------------------------

/// Render the section title and the chart for the active analysis mode.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    ui.heading(state.mode.title());
    ui.separator();

    match state.mode {
        AnalysisMode::Overview => overview(ui, state),
        AnalysisMode::ListingsByMonth => listings_by_month(ui, state),
        AnalysisMode::ListingsByPurpose => listings_by_purpose(ui, state),
        AnalysisMode::ListingsByCity => listings_by_city(ui, state),
        AnalysisMode::TopLocations => top_locations(ui, state),
        AnalysisMode::PriceByPurpose => price_by_purpose(ui, state),
        AnalysisMode::PriceByCity => price_by_city(ui, state),
        AnalysisMode::HotLocations => hot_locations(ui, state),
        AnalysisMode::PriceTrend => price_trend(ui, state),
    }
}

/// Shown whenever a filter combination yields zero rows.
fn empty_notice(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("No listings match the current selection.");
    });
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, state: &AppState) {
    let stats = aggregate::overview(&state.dataset);
    ui.columns(4, |cols| {
        metric_card(&mut cols[0], "Total Listings 📋", stats.total_listings);
        metric_card(&mut cols[1], "Property Types 🏘", stats.property_types);
        metric_card(&mut cols[2], "Cities 🏙", stats.cities);
        metric_card(&mut cols[3], "Locations 📍", stats.locations);
    });
    ui.add_space(8.0);
    ui.strong("Locations Across the Country");

    let points = aggregate::geo_points(&state.dataset);
    if points.is_empty() {
        empty_notice(ui);
        return;
    }

    let color_map = ColorMap::new(&state.dataset.cities);
    let mut by_city: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &points {
        by_city
            .entry(p.city.as_str())
            .or_default()
            .push([p.longitude, p.latitude]);
    }

    Plot::new("geo_scatter")
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for (city, pts) in by_city {
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .name(city)
                        .color(color_map.color_for(city))
                        .radius(1.5),
                );
            }
        });
}

fn metric_card(ui: &mut Ui, label: &str, value: usize) {
    eframe::egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(label);
            ui.label(
                RichText::new(group_digits(value as u64))
                    .size(26.0)
                    .strong(),
            );
        });
    });
}

// ---------------------------------------------------------------------------
// Listing counts
// ---------------------------------------------------------------------------

fn listings_by_month(ui: &mut Ui, state: &AppState) {
    if let Some(month) = state.selected_month {
        let rows = aggregate::listings_by_type_in_month(&state.dataset, month);
        if rows.is_empty() {
            empty_notice(ui);
            return;
        }
        category_bars(ui, "month_type_bars", &rows, "Listings");
    } else {
        let rows = aggregate::listings_per_month(&state.dataset);
        if rows.is_empty() {
            empty_notice(ui);
            return;
        }
        let points: Vec<[f64; 2]> = rows.iter().map(|&(m, n)| [m as f64, n as f64]).collect();
        Plot::new("month_trend")
            .x_axis_label("Month")
            .y_axis_label("Listings")
            .x_axis_formatter(month_tick_formatter)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .name("Listings")
                        .width(2.0),
                );
            });
    }
}

fn listings_by_purpose(ui: &mut Ui, state: &AppState) {
    let rows: Vec<(String, u64)> = match state.breakdown_purpose {
        Some(purpose) => aggregate::listings_by_type_for_purpose(&state.dataset, purpose),
        None => aggregate::listings_by_purpose(&state.dataset)
            .into_iter()
            .map(|(p, n)| (p.to_string(), n))
            .collect(),
    };
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    category_bars(ui, "purpose_bars", &rows, "Listings");
}

fn listings_by_city(ui: &mut Ui, state: &AppState) {
    if state.city_trend {
        let crosstab = aggregate::city_type_crosstab(&state.dataset);
        crosstab_heatmap(ui, &crosstab);
    } else {
        let rows = aggregate::listings_by_city(&state.dataset);
        if rows.is_empty() {
            empty_notice(ui);
            return;
        }
        category_bars(ui, "city_bars", &rows, "Listings");
    }
}

fn top_locations(ui: &mut Ui, state: &AppState) {
    let rows = aggregate::top_locations(&state.dataset, state.top_city.as_deref());
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let rows: Vec<(String, f64)> = rows
        .into_iter()
        .map(|(label, n)| (label, n as f64))
        .collect();
    ranking_bars(ui, "top_location_bars", &rows, "Listings");
}

// ---------------------------------------------------------------------------
// Price charts
// ---------------------------------------------------------------------------

fn price_by_purpose(ui: &mut Ui, state: &AppState) {
    let rows = aggregate::mean_price_by_type_and_bedrooms(&state.dataset, state.price_purpose);
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }

    let mut by_type: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for ((property_type, bedrooms), price) in rows {
        by_type
            .entry(property_type)
            .or_default()
            .push([bedrooms as f64, price]);
    }

    let color_map = ColorMap::new(&state.dataset.property_types);
    Plot::new("price_by_purpose")
        .legend(Legend::default())
        .x_axis_label("Number of Beds")
        .y_axis_label("Average Price")
        .show(ui, |plot_ui| {
            for (property_type, pts) in by_type {
                let color = color_map.color_for(&property_type);
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .name(&property_type)
                        .color(color)
                        .radius(4.0),
                );
            }
        });
}

fn price_by_city(ui: &mut Ui, state: &AppState) {
    let rows = aggregate::mean_price_by_bedrooms_and_city(
        &state.dataset,
        state.city_price_purpose,
        &state.city_price_type,
    );
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }

    // Keys are sorted (bedrooms, city), so each city's points arrive in
    // bedroom order, ready for a line.
    let mut by_city: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    for ((bedrooms, city), price) in rows {
        by_city.entry(city).or_default().push([bedrooms as f64, price]);
    }

    let color_map = ColorMap::new(&state.dataset.cities);
    Plot::new("price_by_city")
        .legend(Legend::default())
        .x_axis_label("Number of Beds")
        .y_axis_label("Average Price")
        .show(ui, |plot_ui| {
            for (city, pts) in by_city {
                let color = color_map.color_for(&city);
                plot_ui.line(
                    Line::new(PlotPoints::from(pts.clone()))
                        .name(&city)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(Points::new(PlotPoints::from(pts)).color(color).radius(3.0));
            }
        });
}

fn price_trend(ui: &mut Ui, state: &AppState) {
    let rows = aggregate::mean_price_per_month(
        &state.dataset,
        state.trend_purpose,
        &state.trend_type,
        state.trend_bedrooms,
    );
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let points: Vec<[f64; 2]> = rows.iter().map(|&(m, p)| [m as f64, p]).collect();
    Plot::new("price_trend")
        .x_axis_label("Month")
        .y_axis_label("Average Price")
        .x_axis_formatter(month_tick_formatter)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points))
                    .name("Average Price")
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Hot locations
// ---------------------------------------------------------------------------

fn hot_locations(ui: &mut Ui, state: &AppState) {
    if state.hot_top10 {
        let Some(city) = state.hot_city.as_deref() else {
            empty_notice(ui);
            return;
        };
        let rows = aggregate::hot_top_locations_in_city(&state.dataset, city);
        if rows.is_empty() {
            empty_notice(ui);
            return;
        }
        let rows: Vec<(String, f64)> = rows
            .into_iter()
            .map(|h| (h.location, h.average_price))
            .collect();
        ranking_bars(ui, "hot_location_bars", &rows, "Average Price");
    } else {
        let rows = aggregate::hot_location_prices(&state.dataset);
        if rows.is_empty() {
            empty_notice(ui);
            return;
        }
        hot_treemap(ui, &rows);
    }
}

/// Slice-and-dice treemap: cities split the width, locations split each
/// city column. Cells are sized and coloured by average sale price.
fn hot_treemap(ui: &mut Ui, rows: &[HotLocation]) {
    let mut by_city: BTreeMap<&str, Vec<&HotLocation>> = BTreeMap::new();
    for h in rows {
        by_city.entry(h.city.as_str()).or_default().push(h);
    }
    for items in by_city.values_mut() {
        items.sort_by(|a, b| b.average_price.total_cmp(&a.average_price));
    }

    let total: f64 = rows.iter().map(|h| h.average_price).sum();
    if total <= 0.0 {
        empty_notice(ui);
        return;
    }
    let min_price = rows
        .iter()
        .map(|h| h.average_price)
        .fold(f64::INFINITY, f64::min);
    let max_price = rows
        .iter()
        .map(|h| h.average_price)
        .fold(f64::NEG_INFINITY, f64::max);
    let price_span = (max_price - min_price).max(f64::MIN_POSITIVE);

    let size = ui.available_size();
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let header_h = 18.0;
    let text_color = ui.visuals().strong_text_color();

    let mut x = rect.left();
    for (city, items) in by_city {
        let city_sum: f64 = items.iter().map(|h| h.average_price).sum();
        let width = (city_sum / total) as f32 * rect.width();
        let column = Rect::from_min_size(pos2(x, rect.top()), vec2(width, rect.height()));

        if width > 40.0 {
            painter.text(
                pos2(column.center().x, column.top() + header_h * 0.5),
                Align2::CENTER_CENTER,
                city,
                FontId::proportional(13.0),
                text_color,
            );
        }

        let mut y = column.top() + header_h;
        let body_h = column.height() - header_h;
        for h in items {
            let height = (h.average_price / city_sum) as f32 * body_h;
            let cell = Rect::from_min_size(pos2(x, y), vec2(width, height)).shrink(1.0);
            let t = ((h.average_price - min_price) / price_span) as f32;
            painter.rect_filled(cell, CornerRadius::same(2), heat_color(t));
            if cell.width() > 70.0 && cell.height() > 26.0 {
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    format!("{}\n{}", h.location, group_digits(h.average_price as u64)),
                    FontId::proportional(10.0),
                    Color32::WHITE,
                );
            }
            y += height;
        }
        x += width;
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// City × property-type count matrix drawn as a coloured grid.
fn crosstab_heatmap(ui: &mut Ui, crosstab: &CrossTab) {
    if crosstab.cities.is_empty() || crosstab.property_types.is_empty() {
        empty_notice(ui);
        return;
    }
    let max = crosstab.max_count().max(1) as f32;

    let label_w = 120.0;
    let header_h = 22.0;
    let avail = ui.available_size();
    let n_cols = crosstab.property_types.len() as f32;
    let n_rows = crosstab.cities.len() as f32;
    let cell_w = ((avail.x - label_w) / n_cols).max(48.0);
    let cell_h = ((avail.y - header_h) / n_rows).clamp(18.0, 40.0);

    ScrollArea::both().auto_shrink([false, false]).show(ui, |ui: &mut Ui| {
        let size = vec2(label_w + cell_w * n_cols, header_h + cell_h * n_rows);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let origin = response.rect.min;
        let text_color = ui.visuals().text_color();

        for (j, property_type) in crosstab.property_types.iter().enumerate() {
            painter.text(
                pos2(
                    origin.x + label_w + (j as f32 + 0.5) * cell_w,
                    origin.y + header_h * 0.5,
                ),
                Align2::CENTER_CENTER,
                property_type,
                FontId::proportional(12.0),
                text_color,
            );
        }

        for (i, city) in crosstab.cities.iter().enumerate() {
            let y = origin.y + header_h + i as f32 * cell_h;
            painter.text(
                pos2(origin.x + label_w - 6.0, y + cell_h * 0.5),
                Align2::RIGHT_CENTER,
                city,
                FontId::proportional(12.0),
                text_color,
            );
            for (j, &count) in crosstab.counts[i].iter().enumerate() {
                let cell = Rect::from_min_size(
                    pos2(origin.x + label_w + j as f32 * cell_w, y),
                    vec2(cell_w - 1.0, cell_h - 1.0),
                );
                painter.rect_filled(cell, CornerRadius::same(2), heat_color(count as f32 / max));
                if cell_w > 36.0 {
                    painter.text(
                        cell.center(),
                        Align2::CENTER_CENTER,
                        group_digits(count),
                        FontId::proportional(11.0),
                        Color32::WHITE,
                    );
                }
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Bar-chart helpers
// ---------------------------------------------------------------------------

/// Vertical bars over category labels, one palette colour per bar.
fn category_bars(ui: &mut Ui, id: &str, rows: &[(String, u64)], y_label: &str) {
    let labels: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();
    let palette = generate_palette(rows.len());
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new(i as f64, *count as f64)
                .name(label)
                .fill(palette[i])
                .width(0.6)
        })
        .collect();

    Plot::new(id.to_owned())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            index_label(&labels, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Horizontal ranking bars, best at the top.
fn ranking_bars(ui: &mut Ui, id: &str, rows: &[(String, f64)], x_label: &str) {
    let n = rows.len();
    // Plot y grows upward, so rank 0 gets the highest y.
    let labels_bottom_up: Vec<String> =
        rows.iter().rev().map(|(label, _)| label.clone()).collect();
    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new((n - 1 - i) as f64, *value)
                .name(label)
                .fill(Color32::LIGHT_BLUE)
                .width(0.5)
        })
        .collect();

    Plot::new(id.to_owned())
        .x_axis_label(x_label)
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            index_label(&labels_bottom_up, mark.value)
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Label for integer grid marks that land on a category index.
fn index_label(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 0.01 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .cloned()
        .unwrap_or_default()
}

/// Month label for integer grid marks on trend axes.
fn month_tick_formatter(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    let rounded = mark.value.round();
    if (mark.value - rounded).abs() < 0.01 && (1.0..=12.0).contains(&rounded) {
        MONTH_TICKS[rounded as usize - 1].to_string()
    } else {
        String::new()
    }
}

/// Render an integer with thousands separators.
fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_grouping() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1_000), "1,000");
        assert_eq!(group_digits(15_000_000), "15,000,000");
    }

    #[test]
    fn index_labels_only_on_exact_marks() {
        let labels = vec!["House".to_string(), "Flat".to_string()];
        assert_eq!(index_label(&labels, 0.0), "House");
        assert_eq!(index_label(&labels, 1.0), "Flat");
        assert_eq!(index_label(&labels, 0.5), "");
        assert_eq!(index_label(&labels, 2.0), "");
        assert_eq!(index_label(&labels, -1.0), "");
    }

    #[test]
    fn month_ticks_cover_the_year() {
        let range = 0.0..=13.0;
        let mark = |v: f64| GridMark {
            value: v,
            step_size: 1.0,
        };
        assert_eq!(month_tick_formatter(mark(1.0), &range), "Jan");
        assert_eq!(month_tick_formatter(mark(12.0), &range), "Dec");
        assert_eq!(month_tick_formatter(mark(0.0), &range), "");
        assert_eq!(month_tick_formatter(mark(6.5), &range), "");
    }
}
