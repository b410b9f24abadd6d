//! # Event Soft-Delete Lifecycle
//!
//! Events move between three states:
//!
//! ```text
//!   ACTIVE --delete--> SOFT_DELETED --restore--> ACTIVE
//!   ACTIVE | SOFT_DELETED --purge--> PURGED (row removed, irreversible)
//! ```
//!
//! Each accepted transition is a single write through [`EventRepository`].
//! Concurrent transitions on the same event are not coordinated; the last
//! write wins.

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::event::Model as EventModel;
use crate::repositories::EventRepository;

/// Lifecycle state of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Active,
    SoftDeleted,
    Purged,
}

impl EventState {
    /// State of a looked-up record; an absent record is purged.
    pub fn of(event: Option<&EventModel>) -> Self {
        match event {
            Some(event) if event.is_deleted => EventState::SoftDeleted,
            Some(_) => EventState::Active,
            None => EventState::Purged,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            EventState::Active => "active",
            EventState::SoftDeleted => "already deleted",
            EventState::Purged => "permanently deleted",
        }
    }
}

/// Requested lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Delete,
    Restore,
    Purge,
}

impl Transition {
    pub fn verb(self) -> &'static str {
        match self {
            Transition::Delete => "delete",
            Transition::Restore => "restore",
            Transition::Purge => "permanently delete",
        }
    }

    fn metric_label(self) -> &'static str {
        match self {
            Transition::Delete => "delete",
            Transition::Restore => "restore",
            Transition::Purge => "purge",
        }
    }

    /// Computes the target state, rejecting transitions that are not legal
    /// from `from`. Pure; performs no I/O.
    pub fn apply(self, event_id: Uuid, from: EventState) -> Result<EventState, LifecycleError> {
        match (self, from) {
            (_, EventState::Purged) => Err(LifecycleError::NotFound { event_id }),
            (Transition::Delete, EventState::Active) => Ok(EventState::SoftDeleted),
            (Transition::Restore, EventState::SoftDeleted) => Ok(EventState::Active),
            (Transition::Purge, EventState::Active | EventState::SoftDeleted) => {
                Ok(EventState::Purged)
            }
            (Transition::Delete, EventState::SoftDeleted)
            | (Transition::Restore, EventState::Active) => Err(LifecycleError::InvalidState {
                event_id,
                current: from,
                transition: self,
            }),
        }
    }
}

/// Errors raised by lifecycle transitions
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("event {event_id} not found")]
    NotFound { event_id: Uuid },
    #[error("cannot {} event {event_id}: it is {}", .transition.verb(), .current.describe())]
    InvalidState {
        event_id: Uuid,
        current: EventState,
        transition: Transition,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LifecycleError {
    fn metric_reason(&self) -> &'static str {
        match self {
            LifecycleError::NotFound { .. } => "not_found",
            LifecycleError::InvalidState { .. } => "invalid_state",
            LifecycleError::Repository(_) => "repository",
        }
    }
}

/// Soft-delete lifecycle manager for events
pub struct EventLifecycle<'a> {
    events: EventRepository<'a>,
}

impl<'a> EventLifecycle<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            events: EventRepository::new(db),
        }
    }

    /// `ACTIVE -> SOFT_DELETED`. Returns the updated record.
    pub async fn delete(&self, event_id: Uuid) -> Result<EventModel, LifecycleError> {
        let event = self.guard(event_id, Transition::Delete).await?;
        let updated = self.events.set_deleted(event, true).await?;
        record_transition(Transition::Delete, event_id);
        Ok(updated)
    }

    /// `SOFT_DELETED -> ACTIVE`. Returns the updated record.
    pub async fn restore(&self, event_id: Uuid) -> Result<EventModel, LifecycleError> {
        let event = self.guard(event_id, Transition::Restore).await?;
        let updated = self.events.set_deleted(event, false).await?;
        record_transition(Transition::Restore, event_id);
        Ok(updated)
    }

    /// Any existing state `-> PURGED`. Returns the record as it was before
    /// removal so callers can clean up attached resources.
    pub async fn permanently_delete(&self, event_id: Uuid) -> Result<EventModel, LifecycleError> {
        let event = self.guard(event_id, Transition::Purge).await?;
        self.events.remove(event.clone()).await?;
        record_transition(Transition::Purge, event_id);
        Ok(event)
    }

    /// Loads the event and checks the transition is legal from its current state.
    async fn guard(
        &self,
        event_id: Uuid,
        transition: Transition,
    ) -> Result<EventModel, LifecycleError> {
        let outcome = match self.events.find_by_id(event_id).await {
            Ok(event) => transition
                .apply(event_id, EventState::of(event.as_ref()))
                // `apply` only succeeds for a present record
                .and_then(|_| event.ok_or(LifecycleError::NotFound { event_id })),
            Err(err) => Err(err.into()),
        };

        if let Err(err) = &outcome {
            counter!(
                "event_lifecycle_rejections_total",
                "transition" => transition.metric_label(),
                "reason" => err.metric_reason()
            )
            .increment(1);
            tracing::debug!(%event_id, transition = transition.metric_label(), error = %err, "Event transition rejected");
        }

        outcome
    }
}

fn record_transition(transition: Transition, event_id: Uuid) {
    counter!(
        "event_lifecycle_transitions_total",
        "transition" => transition.metric_label()
    )
    .increment(1);
    tracing::info!(%event_id, transition = transition.metric_label(), "Event lifecycle transition applied");
}
