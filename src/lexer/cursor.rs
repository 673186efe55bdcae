use super::ClassifiedToken;

/// A position in a borrowed, never-empty token buffer.
///
/// Cursors are `Copy`: to look ahead speculatively, copy the cursor and advance the copy.
/// The position never leaves the buffer, so [TokenCursor::current] always has a token to return.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'a> {
    tokens: &'a [ClassifiedToken],
    position: usize,
}
impl<'a> TokenCursor<'a> {
    /// Returns `None` if `tokens` is empty
    pub fn new(tokens: &'a [ClassifiedToken]) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self {
                tokens,
                position: 0,
            })
        }
    }

    /// Move to the next token. Returns false, without moving, if already on the last token.
    pub fn advance(&mut self) -> bool {
        if self.can_peek_next() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn can_peek_next(&self) -> bool {
        self.position + 1 < self.tokens.len()
    }

    pub fn peek_next(&self) -> Option<&'a ClassifiedToken> {
        self.tokens.get(self.position + 1)
    }

    pub fn current(&self) -> &'a ClassifiedToken {
        &self.tokens[self.position]
    }

    /// The token before the current one, or the current one at the start of the buffer
    pub fn last(&self) -> &'a ClassifiedToken {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn tokens(&self) -> &'a [ClassifiedToken] {
        self.tokens
    }
}
