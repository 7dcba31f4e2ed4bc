use std::collections::BTreeMap;

/// One played move with the positions on either side of it.
#[derive(Clone, Debug)]
pub struct PlayedPly<S, A> {
    pub before: S,
    pub action: A,
    pub after: S,
}

/// A finished or in progress game as supplied by a game source.
#[derive(Clone, Debug)]
pub struct GameRecord<S, A> {
    pub tags: BTreeMap<String, String>,
    pub initial: S,
    pub plies: Vec<PlayedPly<S, A>>,
}

impl<S, A> GameRecord<S, A> {
    pub fn new(initial: S) -> Self {
        Self {
            tags: BTreeMap::new(),
            initial,
            plies: Vec::new(),
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }
}

impl<S: Clone, A> GameRecord<S, A> {
    /// Appends a move, computing the resulting position with `take_action`.
    pub fn push<F>(&mut self, action: A, take_action: F)
    where
        F: FnOnce(&S, &A) -> S,
    {
        let before = self
            .plies
            .last()
            .map(|p| p.after.clone())
            .unwrap_or_else(|| self.initial.clone());
        let after = take_action(&before, &action);

        self.plies.push(PlayedPly {
            before,
            action,
            after,
        });
    }
}
