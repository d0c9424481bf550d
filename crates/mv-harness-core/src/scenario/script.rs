//! Scenario scripts and the checks they are built from.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{ScenarioCase, ScenarioKind};
use crate::compare::{assert_row_count, assert_same_rows, same_rows};
use crate::readiness::{wait_for, Probe, RetryPolicy};
use crate::record::{delete_keys, doubled_scores, RecordGenerator, ScoreKey, ScoreRecord};
use crate::schema::{BASE_TABLE, VIEW_NAME};
use crate::store::ScoreStore;
use crate::{Error, Result};

/// State shared by the steps of one scenario run.
///
/// Tracks what the base table should hold after every write so the
/// context can wait for the view to catch up before the next check.
pub(crate) struct ScriptContext<'a, S: ScoreStore + ?Sized> {
    store: &'a S,
    settle: &'a RetryPolicy,
    keyspace: String,
    expected: BTreeMap<ScoreKey, i32>,
    view_created: bool,
    pub(crate) checks: u32,
}

impl<'a, S: ScoreStore + ?Sized> ScriptContext<'a, S> {
    pub(crate) fn new(store: &'a S, settle: &'a RetryPolicy, keyspace: String) -> Self {
        Self {
            store,
            settle,
            keyspace,
            expected: BTreeMap::new(),
            view_created: false,
            checks: 0,
        }
    }

    async fn create_schema(&mut self) -> Result<()> {
        self.store.create_keyspace(&self.keyspace).await?;
        self.store.use_keyspace(&self.keyspace).await?;
        self.store.create_scores_table().await?;
        debug!("Created {}.{}", self.keyspace, BASE_TABLE);
        Ok(())
    }

    async fn insert(&mut self, records: &[ScoreRecord]) -> Result<()> {
        self.store.insert(records).await?;
        for record in records {
            self.expected.insert(record.key(), record.score);
        }
        self.settle("insert").await;
        Ok(())
    }

    async fn delete(&mut self, records: &[ScoreRecord]) -> Result<()> {
        let keys = delete_keys(records);
        self.store.delete(&keys).await?;
        for key in &keys {
            self.expected.remove(key);
        }
        self.settle("delete").await;
        Ok(())
    }

    async fn create_view(&mut self) -> Result<()> {
        self.store.create_view().await?;
        self.view_created = true;
        debug!("Created view {}.{}", self.keyspace, VIEW_NAME);
        self.settle("view build").await;
        Ok(())
    }

    fn expected_records(&self) -> Vec<ScoreRecord> {
        self.expected
            .iter()
            .map(|(key, score)| ScoreRecord::from_key(key.clone(), *score))
            .collect()
    }

    /// Wait until the base table (and the view, once created) hold exactly the
    /// written records. Gives up quietly at the settle deadline.
    async fn settle(&self, after: &str) {
        let records = self.expected_records();
        let expected = records.as_slice();
        let target = format!("{}.{} after {}", self.keyspace, VIEW_NAME, after);

        let settled = wait_for(&target, self.settle, move |_| async move {
            self.probe(expected).await
        })
        .await;

        if let Err(e) = settled {
            warn!("Proceeding without settle: {}", e);
        }
    }

    async fn probe(&self, expected: &[ScoreRecord]) -> Probe<()> {
        let base = match self.store.base_rows().await {
            Ok(rows) => rows,
            Err(e) => return Probe::Pending(e.to_string()),
        };
        if !same_rows(expected, &base) {
            return Probe::Pending(format!(
                "{} holds {} rows, expected {}",
                BASE_TABLE,
                base.len(),
                expected.len()
            ));
        }

        if self.view_created {
            let view = match self.store.view_rows().await {
                Ok(rows) => rows,
                Err(e) => return Probe::Pending(e.to_string()),
            };
            if !same_rows(expected, &view) {
                return Probe::Pending(format!(
                    "{} holds {} rows, expected {}",
                    VIEW_NAME,
                    view.len(),
                    expected.len()
                ));
            }
        }

        Probe::Ready(())
    }

    fn passed(&mut self, check: &str) {
        self.checks += 1;
        debug!("Check passed: {}", check);
    }

    async fn check_no_views(&mut self, step: &str) -> Result<()> {
        let check = format!("{}: no views", step);
        let views = self.store.views().await?;
        if !views.is_empty() {
            let names: Vec<&str> = views.iter().map(|v| v.view_name.as_str()).collect();
            return Err(Error::consistency(
                check,
                "no views",
                format!("[{}]", names.join(", ")),
            ));
        }
        self.passed(&check);
        Ok(())
    }

    async fn check_single_view(&mut self, step: &str) -> Result<()> {
        let check = format!("{}: view catalog", step);
        let views = self.store.views().await?;
        assert_row_count(&check, 1, views.len())?;

        let view = &views[0];
        if view.view_name != VIEW_NAME || view.base_table_name != BASE_TABLE {
            return Err(Error::consistency(
                check,
                format!("{} on {}", VIEW_NAME, BASE_TABLE),
                format!("{} on {}", view.view_name, view.base_table_name),
            ));
        }
        self.passed(&check);
        Ok(())
    }

    async fn check_base_count(&mut self, step: &str, expected: usize) -> Result<()> {
        let check = format!("{}: {} row count", step, BASE_TABLE);
        let rows = self.store.base_rows().await?;
        assert_row_count(&check, expected, rows.len())?;
        self.passed(&check);
        Ok(())
    }

    async fn check_view_count(&mut self, step: &str, expected: usize) -> Result<()> {
        let check = format!("{}: {} row count", step, VIEW_NAME);
        let rows = self.store.view_rows().await?;
        assert_row_count(&check, expected, rows.len())?;
        self.passed(&check);
        Ok(())
    }

    /// Base table and view both hold exactly `expected`, in any order.
    async fn check_rows(&mut self, step: &str, expected: &[ScoreRecord]) -> Result<()> {
        let check = format!("{}: {} rows", step, BASE_TABLE);
        let base = self.store.base_rows().await?;
        assert_same_rows(&check, expected, &base)?;
        self.passed(&check);

        let check = format!("{}: {} rows", step, VIEW_NAME);
        let view = self.store.view_rows().await?;
        assert_same_rows(&check, expected, &view)?;
        self.passed(&check);
        Ok(())
    }

    /// Schema, initial batch and view: the prefix every scenario shares.
    async fn prepare_view(
        &mut self,
        generator: &mut RecordGenerator,
        initial_size: usize,
    ) -> Result<Vec<ScoreRecord>> {
        self.create_schema().await?;
        self.check_no_views("empty table").await?;
        self.check_base_count("empty table", 0).await?;

        let initial = generator.generate(initial_size);
        self.insert(&initial).await?;
        self.check_base_count("initial insert", initial_size).await?;
        self.check_no_views("initial insert").await?;

        self.create_view().await?;
        Ok(initial)
    }
}

/// Run the script for `case` to completion or the first failed check.
pub(crate) async fn run_script<S: ScoreStore + ?Sized>(
    case: &ScenarioCase,
    ctx: &mut ScriptContext<'_, S>,
    generator: &mut RecordGenerator,
) -> Result<()> {
    let params = case.params;
    match case.kind {
        ScenarioKind::CreateFromTable => {
            ctx.prepare_view(generator, params.initial_size).await?;

            ctx.check_single_view("view created").await?;
            ctx.check_base_count("view created", params.initial_size)
                .await?;
            ctx.check_view_count("view created", params.initial_size)
                .await?;
        }

        ScenarioKind::ReadFromView => {
            let initial = ctx.prepare_view(generator, params.initial_size).await?;
            ctx.check_rows("view created", &initial).await?;

            let additional = generator.generate(params.additional_size);
            ctx.insert(&additional).await?;
            let total = [initial, additional].concat();
            ctx.check_rows("additional insert", &total).await?;
        }

        ScenarioKind::UpdateViewData => {
            let initial = ctx.prepare_view(generator, params.initial_size).await?;

            let updated_initial = doubled_scores(&initial);
            ctx.insert(&updated_initial).await?;
            ctx.check_rows("initial rows updated", &updated_initial)
                .await?;

            let additional = generator.generate(params.additional_size);
            ctx.insert(&additional).await?;
            let updated_additional = doubled_scores(&additional);
            ctx.insert(&updated_additional).await?;
            let updated_total = [updated_initial, updated_additional].concat();
            ctx.check_rows("additional rows updated", &updated_total)
                .await?;

            // scores compound: each row is now four times its original score
            let updated_again = doubled_scores(&updated_total);
            ctx.insert(&updated_again).await?;
            ctx.check_rows("all rows updated", &updated_again).await?;
        }

        ScenarioKind::DeleteViewData => {
            let initial = ctx.prepare_view(generator, params.initial_size).await?;

            let additional = generator.generate(params.additional_size);
            ctx.insert(&additional).await?;
            let total = [initial, additional].concat();
            ctx.check_base_count("additional insert", total.len())
                .await?;
            ctx.check_view_count("additional insert", total.len())
                .await?;

            ctx.delete(&total).await?;
            ctx.check_rows("all rows deleted", &[]).await?;
        }
    }
    Ok(())
}
