use futures_util::future::try_join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::PrefPopError;
use crate::io::resas::PopulationSource;
use crate::model::aggregate::{aggregate, AggregatedRow};
use crate::model::chart::{build_chart, ChartData};
use crate::model::composition::{Category, PrefCode, Prefecture, PrefectureRecords};

/// Fetch and normalize every prefecture concurrently, keeping `codes` order.
/// The first failure fails the whole batch and nothing partial is returned.
pub async fn fetch_all<S>(source: &S, codes: &[PrefCode]) -> Result<Vec<PrefectureRecords>, PrefPopError>
where
    S: PopulationSource + ?Sized,
{
    try_join_all(codes.iter().map(|&code| async move {
        let records = source.composition(code).await?;
        Ok::<_, PrefPopError>(PrefectureRecords { code, records })
    }))
    .await
}

/// Which prefectures (in selection order) and which category are shown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    codes: Vec<PrefCode>,
    category: Category,
}

impl Selection {
    pub fn codes(&self) -> &[PrefCode] {
        &self.codes
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_selected(&self, code: PrefCode) -> bool {
        self.codes.contains(&code)
    }

    /// Append `code` if absent, remove it otherwise. Returns whether it is
    /// selected afterwards.
    pub fn toggle(&mut self, code: PrefCode) -> bool {
        if let Some(pos) = self.codes.iter().position(|c| *c == code) {
            self.codes.remove(pos);
            false
        } else {
            self.codes.push(code);
            true
        }
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Results were stored and are now what the view shows.
    Applied,
    /// A newer cycle started while this one was in flight; results dropped.
    Superseded,
}

/// Immutable snapshot of what the page displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub prefectures: Vec<Prefecture>,
    pub selection: Selection,
    pub rows: Vec<AggregatedRow>,
    pub chart: ChartData,
    /// Fetch-cycle failure if any, else a prefecture list failure.
    pub error: Option<String>,
}

#[derive(Default)]
struct DashboardState {
    prefectures: Vec<Prefecture>,
    selection: Selection,
    generation: u64,
    records: Vec<PrefectureRecords>,
    /// Last fetch cycle's failure; cleared by the next applied cycle.
    error: Option<String>,
    /// Prefecture list failure; only a successful reload clears it.
    prefectures_error: Option<String>,
}

/// Selection state plus the data of the last applied fetch cycle.
pub struct Dashboard<S> {
    source: S,
    state: Mutex<DashboardState>,
}

impl<S: PopulationSource> Dashboard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub async fn load_prefectures(&self) -> Result<Vec<Prefecture>, PrefPopError> {
        match self.source.prefectures().await {
            Ok(list) => {
                info!(count = list.len(), "prefectures loaded");
                let mut st = self.state.lock().await;
                st.prefectures = list.clone();
                st.prefectures_error = None;
                Ok(list)
            }
            Err(e) => {
                warn!(error = %e, "failed to load prefectures");
                self.state.lock().await.prefectures_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Toggle a prefecture and run a fetch cycle for the new selection.
    pub async fn toggle_prefecture(&self, code: PrefCode) -> Result<CycleOutcome, PrefPopError> {
        {
            let mut st = self.state.lock().await;
            let selected = st.selection.toggle(code);
            debug!(code, selected, "selection changed");
        }
        self.refresh().await
    }

    /// Switch category; cached records are re-aggregated, nothing is fetched.
    pub async fn set_category(&self, category: Category) -> Vec<AggregatedRow> {
        let mut st = self.state.lock().await;
        st.selection.set_category(category);
        aggregate(&st.records, category)
    }

    /// Run one fetch cycle for the current selection. Only the most recently
    /// started cycle may store results or errors.
    pub async fn refresh(&self) -> Result<CycleOutcome, PrefPopError> {
        let (ticket, codes) = {
            let mut st = self.state.lock().await;
            st.generation += 1;
            (st.generation, st.selection.codes().to_vec())
        };

        let fetched = if codes.is_empty() {
            Ok(Vec::new())
        } else {
            fetch_all(&self.source, &codes).await
        };

        let mut st = self.state.lock().await;
        if st.generation != ticket {
            debug!(ticket, current = st.generation, "dropping superseded cycle");
            return Ok(CycleOutcome::Superseded);
        }

        match fetched {
            Ok(records) => {
                info!(ticket, prefectures = records.len(), "cycle applied");
                st.records = records;
                st.error = None;
                Ok(CycleOutcome::Applied)
            }
            Err(e) => {
                warn!(ticket, error = %e, "cycle failed");
                st.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let st = self.state.lock().await;
        let rows = aggregate(&st.records, st.selection.category());
        let chart = build_chart(&rows, &applied_codes(&st), &st.prefectures);
        DashboardView {
            prefectures: st.prefectures.clone(),
            selection: st.selection.clone(),
            rows,
            chart,
            error: st.error.clone().or_else(|| st.prefectures_error.clone()),
        }
    }
}

// Series follow the data actually held, which lags the selection after a
// failed cycle.
fn applied_codes(st: &DashboardState) -> Vec<PrefCode> {
    st.records.iter().map(|r| r.code).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_keeps_insertion_order() {
        let mut s = Selection::default();
        assert!(s.toggle(13));
        assert!(s.toggle(1));
        assert!(s.toggle(27));
        assert!(!s.toggle(1));
        assert_eq!(s.codes(), &[13, 27]);
        assert!(s.toggle(1));
        assert_eq!(s.codes(), &[13, 27, 1]);
        assert!(s.is_selected(27));
        assert_eq!(s.category(), Category::Total);
    }
}
