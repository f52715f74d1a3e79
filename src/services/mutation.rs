use chrono::{DateTime, Duration, Utc};

use super::EventService;
use crate::error::AppError;
use crate::models::datetime::FORMAT;
use crate::models::event::{
    CreateEvent, Event, EventDraft, EventState, UpdateEventAdmin, UpdateEventUser,
    UserStateAction,
};
use crate::validation::validate_payload;

fn check_lead(event_date: DateTime<Utc>, lead: Duration) -> Result<(), AppError> {
    let earliest = Utc::now() + lead;
    if event_date < earliest {
        tracing::info!(
            "Rejected event date {}, earliest allowed is {}",
            event_date.format(FORMAT),
            earliest.format(FORMAT)
        );
        return Err(AppError::Validation(format!(
            "Event date {} must be at least {} minutes from now",
            event_date.format(FORMAT),
            lead.num_minutes()
        )));
    }
    Ok(())
}

impl EventService {
    pub async fn create_event(&self, user_id: i64, input: CreateEvent) -> Result<Event, AppError> {
        validate_payload("new event", &input)?;
        check_lead(input.event_date, self.rules.min_lead)?;
        self.require_user(user_id).await?;
        self.require_category(input.category).await?;

        let draft = EventDraft {
            title: input.title,
            annotation: input.annotation,
            description: input.description,
            category_id: input.category,
            initiator_id: user_id,
            paid: input.paid,
            location: input.location,
            event_date: input.event_date,
            participant_limit: input.participant_limit,
            request_moderation: input.request_moderation,
            state: EventState::Pending,
            created_on: Utc::now(),
        };
        let event = self.store.create_event(draft).await?;
        tracing::info!("Event {} created by user {user_id}", event.id);
        Ok(event)
    }

    /// Owners edit content only while the event is pending; the only state
    /// change open to them is withdrawing a pending event.
    pub async fn update_owner_event(
        &self,
        user_id: i64,
        event_id: i64,
        input: UpdateEventUser,
    ) -> Result<Event, AppError> {
        validate_payload("event update", &input)?;
        let mut event = self.get_owner_event(user_id, event_id).await?;
        let UpdateEventUser {
            patch,
            state_action,
        } = input;
        if patch.is_empty() && state_action.is_none() {
            return Ok(event);
        }

        if !patch.is_empty() {
            if event.state != EventState::Pending {
                tracing::info!("Rejected edit of event {event_id} in state {}", event.state);
                return Err(AppError::IllegalState(format!(
                    "Only pending events can be changed, event {event_id} is {}",
                    event.state
                )));
            }
            if let Some(event_date) = patch.event_date {
                check_lead(event_date, self.rules.min_lead)?;
            }
            if let Some(category) = patch.category {
                self.require_category(category).await?;
            }
            patch.apply(&mut event);
        }

        if let Some(UserStateAction::CancelReview) = state_action {
            if event.state != EventState::Pending {
                tracing::info!("Rejected owner cancellation of event {event_id} in state {}", event.state);
                return Err(AppError::IllegalState(format!(
                    "Only pending events can be canceled by their owner, event {event_id} is {}",
                    event.state
                )));
            }
            self.transition(&mut event, EventState::Canceled)?;
        }

        let event = self.store.update_event(&event).await?;
        tracing::info!("Event {event_id} updated by user {user_id}");
        Ok(event)
    }

    pub async fn update_admin_event(
        &self,
        event_id: i64,
        input: UpdateEventAdmin,
    ) -> Result<Event, AppError> {
        validate_payload("event moderation", &input)?;
        let mut event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with id={event_id} was not found")))?;
        let UpdateEventAdmin {
            patch,
            state_action,
        } = input;

        if let Some(event_date) = patch.event_date {
            check_lead(event_date, self.rules.publish_lead)?;
        }
        if let Some(category) = patch.category {
            self.require_category(category).await?;
        }
        patch.apply(&mut event);

        if let Some(action) = state_action {
            let target = action.target();
            self.transition(&mut event, target)?;
            if target == EventState::Published {
                let now = Utc::now();
                if event.event_date < now + self.rules.publish_lead {
                    tracing::info!("Rejected publication of event {event_id}, it starts too soon");
                    return Err(AppError::IllegalState(format!(
                        "Event {event_id} starts at {}, too soon to publish",
                        event.event_date.format(FORMAT)
                    )));
                }
                event.published_on = Some(now);
            }
        }

        let event = self.store.update_event(&event).await?;
        tracing::info!("Event {event_id} moderated, state {}", event.state);
        Ok(event)
    }

    fn transition(&self, event: &mut Event, to: EventState) -> Result<(), AppError> {
        if !self.rules.transitions.allows(event.state, to) {
            tracing::info!("Rejected transition of event {} from {} to {to}", event.id, event.state);
            return Err(AppError::IllegalState(format!(
                "Cannot move event {} from {} to {to}",
                event.id, event.state
            )));
        }
        event.state = to;
        Ok(())
    }

    async fn require_user(&self, user_id: i64) -> Result<(), AppError> {
        if !self.store.user_exists(user_id).await? {
            return Err(AppError::NotFound(format!("User with id={user_id} was not found")));
        }
        Ok(())
    }

    async fn require_category(&self, category_id: i64) -> Result<(), AppError> {
        if self.store.find_category(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Category with id={category_id} was not found"
            )));
        }
        Ok(())
    }
}
