//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Per port/method queues of recorded interactions.
#[derive(Debug)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Index a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction);
        }
        Self { queues }
    }

    /// Take the next interaction for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns a message if nothing was recorded for the pair or every
    /// recorded interaction has been consumed.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<Interaction, String> {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get_mut(&key) else {
            let mut available: Vec<_> = self
                .queues
                .keys()
                .map(|(p, m)| format!("{p}::{m}"))
                .collect();
            available.sort();
            return Err(format!(
                "no interactions recorded for {port}::{method}. Available: [{}]",
                available.join(", ")
            ));
        };
        queue
            .pop_front()
            .ok_or_else(|| format!("cassette exhausted for {port}::{method}"))
    }
}
