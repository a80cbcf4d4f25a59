#[derive(Debug)]
pub enum Signal<M, R> {
    Custom(M),
    /// Percent done, 0..=100
    Progress(u8),
    Complete(R),
}

impl<M, R> Signal<M, R> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Signal::Complete(_))
    }
}
