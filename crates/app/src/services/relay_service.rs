//! Relay service — handles one inbound relay command end to end.
//!
//! Normalize → resolve things → arbitrate and reconcile → publish and commit
//! → report status. Publishes and the batch commit run concurrently and the
//! invocation completes only when all of them have finished. A failed commit
//! does not undo publishes that already went out.

use futures::future::{join, join_all};
use serde::Serialize;
use tokio::sync::Mutex;

use toxotes_domain::command::{NodeConfig, RawCommand, RelayCommand, Selector};
use toxotes_domain::error::{NotFoundError, ToxotesError};
use toxotes_domain::reconcile::{PublishAction, TopicConvention, reconcile};
use toxotes_domain::status::{DisplayStatus, summarize};
use toxotes_domain::thing::Thing;
use toxotes_domain::time::{self, Timestamp};

use crate::ports::{CommandPublisher, StatusReporter, ThingRepository};

/// What one successful invocation did.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    pub command: RelayCommand,
    /// Unique ids of every resolved thing.
    pub things: Vec<String>,
    /// Unique ids whose command reached the broker.
    pub published: Vec<String>,
    /// Unique ids held back by an open manual window.
    pub held: Vec<String>,
    /// Whether the batch of row updates was committed.
    pub persisted: bool,
    pub status: DisplayStatus,
}

/// Application service running the relay command pipeline.
///
/// Invocations on one service are serialized; the store stays the only
/// arbiter between separate processes.
pub struct RelayService<R, P, S> {
    repo: R,
    publisher: P,
    status: S,
    node: NodeConfig,
    topics: TopicConvention,
    gate: Mutex<()>,
}

impl<R, P, S> RelayService<R, P, S>
where
    R: ThingRepository + Send + Sync,
    P: CommandPublisher + Send + Sync,
    S: StatusReporter + Send + Sync,
{
    /// Create a new service backed by the given ports.
    pub fn new(
        repo: R,
        publisher: P,
        status: S,
        node: NodeConfig,
        topics: TopicConvention,
    ) -> Self {
        Self {
            repo,
            publisher,
            status,
            node,
            topics,
            gate: Mutex::new(()),
        }
    }

    /// Look up every thing addressed by `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`ToxotesError::NotFound`] when nothing matches, or a
    /// persistence error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, selector: &Selector) -> Result<Vec<Thing>, ToxotesError> {
        let things = self.repo.find_by_selector(selector).await?;
        if things.is_empty() {
            return Err(NotFoundError {
                selector: selector.clone(),
            }
            .into());
        }
        Ok(things)
    }

    /// List all things.
    ///
    /// # Errors
    ///
    /// Returns a persistence error propagated from the repository.
    pub async fn list_things(&self) -> Result<Vec<Thing>, ToxotesError> {
        self.repo.get_all().await
    }

    /// Handle a command at the current time.
    ///
    /// # Errors
    ///
    /// See [`handle_at`](Self::handle_at).
    pub async fn handle(&self, raw: RawCommand) -> Result<InvocationReport, ToxotesError> {
        self.handle_at(time::now(), raw).await
    }

    /// Handle a command as if processed at `now`.
    ///
    /// Every outcome updates the status reporter. A failed batch commit is
    /// logged and reported in the status, but still returns `Ok` with
    /// `persisted == false`.
    ///
    /// # Errors
    ///
    /// Returns [`ToxotesError::Validation`] or [`ToxotesError::NotFound`]
    /// before any side effect, [`ToxotesError::Persistence`] when the things
    /// cannot be read, and [`ToxotesError::Publish`] when any publish failed.
    #[tracing::instrument(skip(self, raw))]
    pub async fn handle_at(
        &self,
        now: Timestamp,
        raw: RawCommand,
    ) -> Result<InvocationReport, ToxotesError> {
        let _turn = self.gate.lock().await;
        let result = self.run(now, &raw).await;
        match &result {
            Ok(report) => self.status.report(report.status.clone()),
            Err(err) => self.status.report(DisplayStatus::error(err)),
        }
        result
    }

    async fn run(&self, now: Timestamp, raw: &RawCommand) -> Result<InvocationReport, ToxotesError> {
        let command = RelayCommand::normalize(raw, &self.node).map_err(|err| {
            tracing::warn!(error = %err, "rejected relay command");
            ToxotesError::from(err)
        })?;

        let things = self.resolve(&command.selector).await.inspect_err(|err| {
            if let ToxotesError::NotFound(_) = err {
                tracing::warn!(error = %err, "relay command matched no thing");
            } else {
                tracing::error!(error = ?err, selector = %command.selector, "failed to query things");
            }
        })?;

        let plan = reconcile(now, &command, &things, &self.topics);
        for unique_id in &plan.held {
            tracing::debug!(%unique_id, "automatic command held back by manual window");
        }

        let publishes = join_all(plan.publishes.iter().map(|action| self.publish_one(action)));
        let (outcomes, committed) = join(publishes, self.repo.apply_updates(plan.updates)).await;

        let published: Vec<String> = plan
            .publishes
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| outcome.is_ok())
            .map(|(action, _)| action.unique_id.clone())
            .collect();

        let commit_error = committed.err();
        if let Some(err) = &commit_error {
            if published.is_empty() {
                tracing::error!(error = ?err, selector = %command.selector, "failed to persist thing state");
            } else {
                tracing::error!(
                    error = ?err,
                    unique_ids = ?published,
                    "thing state not persisted after commands were published, stored state is stale until the next command"
                );
            }
        }

        if let Some(err) = outcomes.into_iter().find_map(Result::err) {
            return Err(err);
        }

        let status = match &commit_error {
            Some(err) => DisplayStatus::error(err),
            None => summarize(&command, &things, plan.held.len(), &self.node),
        };

        tracing::info!(
            selector = %command.selector,
            payload = %command.payload,
            manual = command.manual,
            things = things.len(),
            published = published.len(),
            held = plan.held.len(),
            persisted = commit_error.is_none(),
            "relay command applied"
        );

        Ok(InvocationReport {
            things: things.into_iter().map(|t| t.unique_id).collect(),
            published,
            held: plan.held,
            persisted: commit_error.is_none(),
            status,
            command,
        })
    }

    async fn publish_one(&self, action: &PublishAction) -> Result<(), ToxotesError> {
        tracing::debug!(
            topic = %action.topic,
            payload = %action.payload,
            qos = %action.qos,
            retain = action.retain,
            "publishing relay command"
        );
        self.publisher
            .publish(&action.topic, action.payload, action.qos, action.retain)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = ?err,
                    topic = %action.topic,
                    unique_id = %action.unique_id,
                    "failed to publish relay command"
                );
            })
    }
}
