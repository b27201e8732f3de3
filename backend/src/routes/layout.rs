//! Declarative page layouts: which controls a page shows, the options they
//! offer, and which output slots they feed.

use serde::Serialize;
use serde_json::Value;

use super::PageId;
use crate::bindings::{BindingResult, Dashboard, InputId, OutputId};
use crate::charts::AxisScale;
use crate::models::{DropdownOption, Feature};
use crate::services::features::ROLLING_WINDOWS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    DateRange,
    DatePicker,
    Dropdown,
    MultiSelect,
    RadioItems,
    Slider,
    TextInput,
    Button,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlDescriptor {
    pub id: &'static str,
    pub kind: ControlKind,
    pub label: &'static str,
    /// Input fired when the control changes; text fields fire nothing and
    /// are read when the submit button is pressed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fires: Option<InputId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DropdownOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ControlDescriptor {
    fn new(id: &'static str, kind: ControlKind, label: &'static str, fires: Option<InputId>) -> Self {
        Self {
            id,
            kind,
            label,
            fires,
            options: Vec::new(),
            default: None,
        }
    }

    fn with_options(mut self, options: Vec<DropdownOption>) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSlot {
    pub id: OutputId,
    pub is_table: bool,
    pub inputs: &'static [InputId],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    pub page: PageId,
    pub title: &'static str,
    pub controls: Vec<ControlDescriptor>,
    pub outputs: Vec<OutputSlot>,
    /// Control state to send with the first event.
    pub defaults: Value,
}

fn values<T: ToString>(items: impl IntoIterator<Item = T>) -> Vec<DropdownOption> {
    items.into_iter().map(|i| DropdownOption::named(i.to_string())).collect()
}

fn scales() -> Vec<DropdownOption> {
    values([AxisScale::Linear, AxisScale::Log])
}

fn controls(page: PageId, dashboard: &Dashboard, defaults: &Value) -> Vec<ControlDescriptor> {
    use ControlKind::*;
    match page {
        PageId::Home => Vec::new(),
        PageId::Artists => vec![ControlDescriptor::new(
            "date_range",
            DateRange,
            "Date range",
            Some(InputId::DateRange),
        )],
        PageId::Features => vec![
            ControlDescriptor::new("x_column", Dropdown, "X axis", Some(InputId::XColumn))
                .with_options(values(Feature::OFFERED)),
            ControlDescriptor::new("x_scale", RadioItems, "X scale", Some(InputId::XScale)).with_options(scales()),
            ControlDescriptor::new("y_column", Dropdown, "Y axis", Some(InputId::YColumn))
                .with_options(values(Feature::OFFERED)),
            ControlDescriptor::new("y_scale", RadioItems, "Y scale", Some(InputId::YScale)).with_options(scales()),
            ControlDescriptor::new("date", DatePicker, "Date", Some(InputId::Date)),
            ControlDescriptor::new("window", RadioItems, "Sliding window", Some(InputId::Window))
                .with_options(values(ROLLING_WINDOWS)),
        ],
        PageId::Genres => {
            let options = defaults
                .get("options")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_else(|| dashboard.repository().country_options());
            vec![
                ControlDescriptor::new("playlist_id", TextInput, "Playlist id", None),
                ControlDescriptor::new("playlist_name", TextInput, "Playlist name", None),
                ControlDescriptor::new("submit", Button, "Add", Some(InputId::Submit)),
                ControlDescriptor::new("date_range", DateRange, "Date range", Some(InputId::DateRange)),
                ControlDescriptor::new("countries", MultiSelect, "Countries", Some(InputId::Countries))
                    .with_options(options),
                ControlDescriptor::new("scaling_factor", Slider, "Scaling factor", Some(InputId::ScalingFactor))
                    .with_options(values(crate::bindings::genres::SCALING_FACTORS)),
                ControlDescriptor::new("close", Button, "Close", Some(InputId::Dismiss)),
            ]
        }
        PageId::Ranking => vec![
            ControlDescriptor::new("date_range", DateRange, "Date range", Some(InputId::DateRange)),
            ControlDescriptor::new("country", Dropdown, "Country", Some(InputId::Country))
                .with_options(dashboard.repository().ranking_options()),
        ],
    }
}

/// Layout of `page` with options and defaults seeded from the current dataset.
pub fn page_layout(dashboard: &Dashboard, page: PageId) -> BindingResult<PageLayout> {
    let defaults = dashboard.default_controls(page)?;
    let mut descriptors = controls(page, dashboard, &defaults);
    for control in descriptors.iter_mut() {
        control.default = match control.kind {
            ControlKind::DateRange => Some(serde_json::json!({
                "start": defaults.get("start_date"),
                "end": defaults.get("end_date"),
            })),
            _ => defaults.get(control.id).cloned(),
        };
    }
    Ok(PageLayout {
        page,
        title: page.title(),
        controls: descriptors,
        outputs: dashboard
            .bindings(page)
            .iter()
            .map(|b| OutputSlot {
                id: b.output,
                is_table: b.output.is_table(),
                inputs: b.inputs,
            })
            .collect(),
        defaults,
    })
}
