use std::cell::RefCell;
use std::collections::VecDeque;

use crate::models::interaction::{Interaction, InteractionHandle};
use crate::providers::base::{InteractionProvider, NewInteraction, ProviderError};

/// A mock provider that replays pre-configured status snapshots for testing
pub struct MockProvider {
    handle: InteractionHandle,
    statuses: RefCell<VecDeque<Interaction>>,
    last: RefCell<Option<Interaction>>,
    queries: RefCell<usize>,
    submitted: RefCell<Vec<String>>,
}

impl MockProvider {
    /// Each `get` pops the next snapshot; once drained the last one repeats.
    pub fn new<S: Into<String>>(id: S, statuses: Vec<Interaction>) -> Self {
        Self {
            handle: InteractionHandle::new(id),
            statuses: RefCell::new(statuses.into()),
            last: RefCell::new(None),
            queries: RefCell::new(0),
            submitted: RefCell::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> usize {
        *self.queries.borrow()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.borrow().clone()
    }
}

impl InteractionProvider for MockProvider {
    fn create(&self, request: &NewInteraction<'_>) -> Result<Interaction, ProviderError> {
        self.submitted.borrow_mut().push(request.input.to_string());
        Ok(Interaction::pending(self.handle.as_str()))
    }

    fn get(&self, handle: &InteractionHandle) -> Result<Interaction, ProviderError> {
        assert_eq!(handle, &self.handle, "queried an unknown interaction");
        *self.queries.borrow_mut() += 1;

        let next = self.statuses.borrow_mut().pop_front();
        match next {
            Some(interaction) => {
                *self.last.borrow_mut() = Some(interaction.clone());
                Ok(interaction)
            }
            None => self
                .last
                .borrow()
                .clone()
                .ok_or_else(|| ProviderError::InvalidResponse("no scripted status".to_string())),
        }
    }
}
