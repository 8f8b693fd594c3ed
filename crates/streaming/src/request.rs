/// Identifies one load attempt.
///
/// Every fetch is tagged with the token current when it started. Progress and
/// completion carrying an older token belong to a superseded fetch and are
/// dropped by the receiver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(pub u64);

/// Issues monotonically increasing [`FetchToken`]s and remembers the newest.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    next: u64,
    current: Option<FetchToken>,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new attempt, invalidating every earlier token.
    pub fn issue(&mut self) -> FetchToken {
        self.next += 1;
        let token = FetchToken(self.next);
        self.current = Some(token);
        token
    }

    pub fn current(&self) -> Option<FetchToken> {
        self.current
    }

    pub fn is_current(&self, token: FetchToken) -> bool {
        self.current == Some(token)
    }
}
