//! Artists page: most-charted artist per country over a date range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    control_range, BindingResult, ControlEvent, InputId, OutputBinding, OutputId, OutputPayload,
    ReactivePage, RenderContext,
};
use crate::charts::world_map;
use crate::db::ChartRepository;
use crate::routes::PageId;
use crate::services::{filter_rows, top_artist_per_country, AnalysisResult, CountrySelector, FilterParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistsControls {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const BINDINGS: &[OutputBinding] = &[OutputBinding {
    output: OutputId::WorldMap,
    inputs: &[InputId::DateRange],
}];

#[derive(Debug, Default, Clone, Copy)]
pub struct ArtistsPage;

impl ReactivePage for ArtistsPage {
    type Controls = ArtistsControls;

    fn page(&self) -> PageId {
        PageId::Artists
    }

    fn bindings(&self) -> &'static [OutputBinding] {
        BINDINGS
    }

    fn defaults(&self, repository: &dyn ChartRepository) -> ArtistsControls {
        let span = repository.date_span();
        ArtistsControls {
            start_date: span.map(|(start, _)| start),
            end_date: span.map(|(_, end)| end),
        }
    }

    fn apply(&self, controls: &mut ArtistsControls, event: &ControlEvent) -> BindingResult<Option<InputId>> {
        match event {
            ControlEvent::Initial => Ok(None),
            ControlEvent::DateChanged { start, end } => {
                if start.is_some() {
                    controls.start_date = *start;
                }
                if end.is_some() {
                    controls.end_date = *end;
                }
                Ok(Some(InputId::DateRange))
            }
            other => Err(self.unsupported(other)),
        }
    }

    fn render(
        &self,
        _output: OutputId,
        _input: Option<InputId>,
        controls: &ArtistsControls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>> {
        let range = control_range(controls.start_date, controls.end_date);
        let set = filter_rows(ctx.snapshot.rows(), &FilterParams::new(Some(range), CountrySelector::All));
        let shares = top_artist_per_country(set.iter());
        Ok(Some(OutputPayload::Figure {
            figure: world_map(&shares),
        }))
    }
}
