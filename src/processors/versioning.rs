/// History of how a processor behaved, as `(introduced_in_version, behaviour)` pairs in
/// ascending version order.
pub struct Behaviours<B: Copy + 'static> {
    history: &'static [(u32, B)],
}

impl<B: Copy + 'static> Behaviours<B> {
    pub const fn new(history: &'static [(u32, B)]) -> Self {
        Self { history }
    }

    /// Behaviour in effect at `version`, `None` if the processor did nothing yet.
    pub fn at(&self, version: u32) -> Option<B> {
        self.history
            .iter()
            .rev()
            .find(|(since, _)| *since <= version)
            .map(|(_, behaviour)| *behaviour)
    }

    pub fn is_active(&self, version: u32) -> bool {
        self.at(version).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Counting {
        Folded,
        Separate,
    }

    const HISTORY: Behaviours<Counting> =
        Behaviours::new(&[(2, Counting::Folded), (5, Counting::Separate)]);

    #[test]
    fn looks_up_behaviour_by_version() {
        assert_eq!(HISTORY.at(1), None);
        assert_eq!(HISTORY.at(2), Some(Counting::Folded));
        assert_eq!(HISTORY.at(4), Some(Counting::Folded));
        assert_eq!(HISTORY.at(5), Some(Counting::Separate));
        assert_eq!(HISTORY.at(9), Some(Counting::Separate));
        assert!(!HISTORY.is_active(0));
    }
}
