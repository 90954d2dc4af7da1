//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
#[derive(Debug)]
pub struct CassetteReplayer {
    /// Per port+method queue of interactions (in order).
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    /// Per port+method cursor tracking position.
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        Self::from_interactions(cassette.interactions.iter().cloned())
    }

    /// Create a replayer directly from interactions, without a cassette
    /// header.
    pub fn from_interactions(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction);
        }
        let cursors = queues.keys().map(|k| (k.clone(), 0)).collect();
        Self { queues, cursors }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Panics
    ///
    /// Panics if the cassette has no (more) interactions for the given
    /// port/method combination, printing a clear error showing what was
    /// requested versus what interactions remain.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> &Interaction {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let queue = self.queues.get(&key).unwrap_or_else(|| {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            panic!(
                "Cassette exhausted: no interactions recorded for port={port:?} method={method:?}. \
                 Available port::method pairs: [{}]",
                available.join(", ")
            );
        });

        let cursor = self.cursors.get_mut(&key).expect("cursor must exist");
        assert!(
            *cursor < queue.len(),
            "Cassette exhausted: all {count} interactions for port={port:?} method={method:?} \
             have been consumed. Last interaction was seq={last_seq}.",
            count = queue.len(),
            last_seq = queue.last().map_or(0, |i| i.seq),
        );

        let interaction = &queue[*cursor];
        *cursor += 1;
        tracing::trace!(port, method, seq = interaction.seq, "replaying interaction");
        interaction
    }

    /// Lists the interactions not yet served, as `port::method#seq`, in
    /// sequence order.
    #[must_use]
    pub fn remaining(&self) -> Vec<String> {
        let mut pending: Vec<&Interaction> = self
            .queues
            .iter()
            .flat_map(|(key, queue)| {
                let cursor = self.cursors.get(key).copied().unwrap_or(0);
                queue[cursor..].iter()
            })
            .collect();
        pending.sort_by_key(|i| i.seq);
        pending.iter().map(|i| format!("{}::{}#{}", i.port, i.method, i.seq)).collect()
    }

    /// Whether every interaction has been served.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.queues
            .iter()
            .all(|(key, queue)| self.cursors.get(key).copied().unwrap_or(0) >= queue.len())
    }
}
