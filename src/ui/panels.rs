use eframe::egui::{self, ComboBox, ScrollArea, Ui};

use crate::data::aggregate;
use crate::data::model::{month_name, Purpose, MONTH_NAMES};
use crate::state::{AnalysisMode, AppState};

// ---------------------------------------------------------------------------
// Left side panel – analysis selection + per-mode controls
// ---------------------------------------------------------------------------

/// Render the left analysis panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("Explore Analysis");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for mode in AnalysisMode::ALL {
                if ui.radio(state.mode == mode, mode.label()).clicked() {
                    state.mode = mode;
                }
            }

            ui.separator();
            mode_controls(ui, state);
        });
}

/// The active mode's dependent controls (0-3 per mode), with choice domains
/// derived from the loaded data.
fn mode_controls(ui: &mut Ui, state: &mut AppState) {
    match state.mode {
        AnalysisMode::Overview => {}

        AnalysisMode::ListingsByMonth => {
            ui.strong("Month");
            let selected_text = state
                .selected_month
                .map(month_name)
                .unwrap_or("All");
            ComboBox::from_id_salt("month_select")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.selected_month.is_none(), "All")
                        .clicked()
                    {
                        state.selected_month = None;
                    }
                    for (i, name) in MONTH_NAMES.iter().enumerate() {
                        let month = i as u32 + 1;
                        if ui
                            .selectable_label(state.selected_month == Some(month), *name)
                            .clicked()
                        {
                            state.selected_month = Some(month);
                        }
                    }
                });
        }

        AnalysisMode::ListingsByPurpose => {
            ui.strong("Purpose");
            ui.horizontal(|ui: &mut Ui| {
                if ui
                    .radio(state.breakdown_purpose.is_none(), "Both")
                    .clicked()
                {
                    state.breakdown_purpose = None;
                }
                for purpose in Purpose::ALL {
                    if ui
                        .radio(state.breakdown_purpose == Some(purpose), purpose.to_string())
                        .clicked()
                    {
                        state.breakdown_purpose = Some(purpose);
                    }
                }
            });
        }

        AnalysisMode::ListingsByCity => {
            ui.checkbox(&mut state.city_trend, "See trend");
        }

        AnalysisMode::TopLocations => {
            ui.strong("City");
            top_city_combo(ui, state);
        }

        AnalysisMode::PriceByPurpose => {
            ui.strong("Purpose");
            ui.horizontal(|ui: &mut Ui| {
                for purpose in Purpose::ALL {
                    if ui
                        .radio(state.price_purpose == purpose, purpose.to_string())
                        .clicked()
                    {
                        state.price_purpose = purpose;
                    }
                }
            });
        }

        AnalysisMode::PriceByCity => {
            let types = state.dataset.property_types.clone();
            ui.strong("Purpose");
            purpose_combo(ui, "city_price_purpose", &mut state.city_price_purpose);
            ui.strong("Property type");
            property_type_combo(ui, "city_price_type", &types, &mut state.city_price_type);
        }

        AnalysisMode::HotLocations => {
            ui.checkbox(&mut state.hot_top10, "View top 10");
            if state.hot_top10 {
                ui.strong("City");
                let cities = aggregate::hot_cities(&state.dataset);
                if state
                    .hot_city
                    .as_ref()
                    .map_or(true, |c| !cities.contains(c))
                {
                    state.hot_city = cities.first().cloned();
                }
                let selected_text = state.hot_city.clone().unwrap_or_default();
                ComboBox::from_id_salt("hot_city_select")
                    .selected_text(selected_text)
                    .show_ui(ui, |ui: &mut Ui| {
                        for city in &cities {
                            if ui
                                .selectable_label(
                                    state.hot_city.as_deref() == Some(city.as_str()),
                                    city,
                                )
                                .clicked()
                            {
                                state.hot_city = Some(city.clone());
                            }
                        }
                    });
            }
        }

        AnalysisMode::PriceTrend => {
            let types = state.dataset.property_types.clone();
            ui.strong("Purpose");
            if purpose_combo(ui, "trend_purpose", &mut state.trend_purpose) {
                state.clamp_trend_bedrooms();
            }
            ui.strong("Property type");
            if property_type_combo(ui, "trend_type", &types, &mut state.trend_type) {
                state.clamp_trend_bedrooms();
            }
            ui.strong("Bedrooms");
            let choices = state.trend_bedroom_choices();
            ComboBox::from_id_salt("trend_bedrooms")
                .selected_text(state.trend_bedrooms.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for beds in choices {
                        if ui
                            .selectable_label(state.trend_bedrooms == beds, beds.to_string())
                            .clicked()
                        {
                            state.trend_bedrooms = beds;
                        }
                    }
                });
        }
    }
}

/// City dropdown for the top-locations view, with a leading "All" entry.
fn top_city_combo(ui: &mut Ui, state: &mut AppState) {
    let cities = state.dataset.cities.clone();
    let selected_text = state.top_city.clone().unwrap_or_else(|| "All".to_string());
    ComboBox::from_id_salt("top_city_select")
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(state.top_city.is_none(), "All").clicked() {
                state.top_city = None;
            }
            for city in &cities {
                if ui
                    .selectable_label(state.top_city.as_deref() == Some(city.as_str()), city)
                    .clicked()
                {
                    state.top_city = Some(city.clone());
                }
            }
        });
}

/// Purpose dropdown; returns true when the selection changed.
fn purpose_combo(ui: &mut Ui, id: &str, selection: &mut Purpose) -> bool {
    let mut changed = false;
    ComboBox::from_id_salt(id)
        .selected_text(selection.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for purpose in Purpose::ALL {
                if ui
                    .selectable_label(*selection == purpose, purpose.to_string())
                    .clicked()
                    && *selection != purpose
                {
                    *selection = purpose;
                    changed = true;
                }
            }
        });
    changed
}

/// Property-type dropdown; returns true when the selection changed.
fn property_type_combo(ui: &mut Ui, id: &str, types: &[String], selection: &mut String) -> bool {
    let mut changed = false;
    ComboBox::from_id_salt(id)
        .selected_text(selection.clone())
        .show_ui(ui, |ui: &mut Ui| {
            for t in types {
                if ui.selectable_label(selection == t, t).clicked() && selection != t {
                    *selection = t.clone();
                    changed = true;
                }
            }
        });
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top summary bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(egui::RichText::new("Housing Market Dashboard 🏠").strong());
        ui.separator();
        ui.label(format!(
            "{} listings · {} cities · {} property types",
            state.dataset.len(),
            state.dataset.cities.len(),
            state.dataset.property_types.len()
        ));
        ui.separator();
        ui.label(state.mode.label());
    });
}
