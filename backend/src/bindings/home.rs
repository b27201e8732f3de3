//! Landing page: a single precomputed genre-space overview.

use serde::{Deserialize, Serialize};

use super::{
    BindingResult, ControlEvent, InputId, OutputBinding, OutputId, OutputPayload, ReactivePage,
    RenderContext,
};
use crate::db::ChartRepository;
use crate::routes::PageId;
use crate::services::AnalysisResult;

/// The landing page has no controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeControls {}

const BINDINGS: &[OutputBinding] = &[OutputBinding {
    output: OutputId::Overview,
    inputs: &[],
}];

#[derive(Debug, Default, Clone, Copy)]
pub struct HomePage;

impl ReactivePage for HomePage {
    type Controls = HomeControls;

    fn page(&self) -> PageId {
        PageId::Home
    }

    fn bindings(&self) -> &'static [OutputBinding] {
        BINDINGS
    }

    fn defaults(&self, _repository: &dyn ChartRepository) -> HomeControls {
        HomeControls {}
    }

    fn apply(&self, _controls: &mut HomeControls, event: &ControlEvent) -> BindingResult<Option<InputId>> {
        match event {
            ControlEvent::Initial => Ok(None),
            other => Err(self.unsupported(other)),
        }
    }

    // Served verbatim; nothing to memoize.
    fn memoize(&self, _output: OutputId) -> bool {
        false
    }

    fn render(
        &self,
        _output: OutputId,
        _input: Option<InputId>,
        _controls: &HomeControls,
        ctx: &RenderContext<'_>,
    ) -> AnalysisResult<Option<OutputPayload>> {
        Ok(Some(OutputPayload::Static {
            figure: (*ctx.repository.overview_figure()).clone(),
        }))
    }
}
