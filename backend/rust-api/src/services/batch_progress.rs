use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;
use crate::metrics::record_batch_outcome;
use crate::models::progress::UnitProgressView;
use crate::services::catalog::CatalogReader;
use crate::services::progress_store::ProgressStore;
use crate::services::AppState;

/// Answers single and multi-unit progress queries.
///
/// The batch path fans out one lookup per unit, joins against an absolute
/// deadline, and fills every slot that failed or ran late with the default
/// zero-progress view. The response always holds exactly one entry per
/// requested unit id; partial failure is logged, never propagated.
pub struct BatchProgressResolver {
    catalog: Arc<dyn CatalogReader>,
    progress: Arc<ProgressStore>,
}

impl BatchProgressResolver {
    pub fn new(state: &AppState) -> Self {
        Self {
            catalog: state.catalog.clone(),
            progress: state.progress.clone(),
        }
    }

    /// Single-unit read. Unknown units are an error here, unlike on the
    /// batch path where they degrade to the default view.
    pub async fn unit_progress(
        &self,
        student_id: &str,
        unit_id: &str,
    ) -> Result<UnitProgressView, EngineError> {
        let unit = self.catalog.get_unit(unit_id).await?;
        let view = match self.progress.get(student_id, unit_id) {
            Some(progress) => UnitProgressView::from_progress(&progress, unit.total_exercise_count),
            None => {
                let mut view = UnitProgressView::empty(unit_id);
                view.total_exercises = unit.total_exercise_count;
                view
            }
        };
        Ok(view)
    }

    pub async fn batch_progress(
        &self,
        student_id: &str,
        unit_ids: &[String],
        timeout: Duration,
    ) -> HashMap<String, UnitProgressView> {
        let deadline = tokio::time::Instant::now() + timeout;

        let mut seen = HashSet::new();
        let lookups = unit_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .map(|unit_id| {
                let handle = tokio::spawn(lookup_unit(
                    self.catalog.clone(),
                    self.progress.clone(),
                    student_id.to_string(),
                    unit_id.clone(),
                ));
                async move { (unit_id.clone(), tokio::time::timeout_at(deadline, handle).await) }
            });

        let mut results: HashMap<String, UnitProgressView> = HashMap::new();
        for (unit_id, outcome) in futures::future::join_all(lookups).await {
            let view = match outcome {
                Ok(Ok(Ok(view))) => {
                    record_batch_outcome("ok");
                    view
                }
                Ok(Ok(Err(e))) => {
                    tracing::warn!(student_id, unit_id = %unit_id, error = %e,
                        "batch unit lookup failed, using default progress");
                    record_batch_outcome("fallback");
                    UnitProgressView::empty(&unit_id)
                }
                Ok(Err(join_err)) => {
                    tracing::error!(student_id, unit_id = %unit_id, error = %join_err,
                        "batch unit lookup panicked, using default progress");
                    record_batch_outcome("fallback");
                    UnitProgressView::empty(&unit_id)
                }
                Err(_elapsed) => {
                    // Deadline reached: abandon the lookup, never retry it.
                    tracing::warn!(student_id, unit_id = %unit_id,
                        "batch unit lookup timed out, using default progress");
                    record_batch_outcome("fallback");
                    UnitProgressView::empty(&unit_id)
                }
            };
            results.insert(unit_id, view);
        }

        // Completeness contract: one entry per requested id, duplicates and
        // all, regardless of what happened above.
        for unit_id in unit_ids {
            results
                .entry(unit_id.clone())
                .or_insert_with(|| UnitProgressView::empty(unit_id));
        }

        results
    }
}

async fn lookup_unit(
    catalog: Arc<dyn CatalogReader>,
    progress: Arc<ProgressStore>,
    student_id: String,
    unit_id: String,
) -> Result<UnitProgressView, EngineError> {
    match progress.get(&student_id, &unit_id) {
        // No aggregate yet: the default view is the correct answer, no
        // catalog round trip needed.
        None => Ok(UnitProgressView::empty(&unit_id)),
        Some(progress) => {
            let unit = catalog.get_unit(&unit_id).await?;
            Ok(UnitProgressView::from_progress(
                &progress,
                unit.total_exercise_count,
            ))
        }
    }
}
