//! Handler-chain cursor and the transitions handlers may request.

/// Lifecycle of a context within one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Unmatched,
    Matched,
    Executing,
    Terminated,
    Released,
}

/// What a handler asked the dispatcher to do once it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next,
    Restart,
    End,
    Drop,
}

impl Transition {
    fn is_terminal(self) -> bool {
        matches!(self, Transition::End | Transition::Drop)
    }
}

/// How a dispatch pass finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Chain exhausted or stopped; the transport writes the response.
    Completed,
    /// `end()`: the buffered response was flushed and the connection closed.
    Ended,
    /// `drop_connection()`: the connection was closed without a response.
    Dropped,
}

/// Cursor over routes and handlers.
///
/// The cursor only moves forward within a pass; `restart` is the sole way
/// back to the first route.
#[derive(Debug, Default)]
pub struct DispatchState {
    phase: Phase,
    route: Option<usize>,
    next_handler: usize,
    pending: Option<Transition>,
    terminal: Option<Transition>,
}

impl DispatchState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the matched route, if any.
    pub fn route(&self) -> Option<usize> {
        self.route
    }

    /// Index of the handler currently executing (or last executed).
    pub fn handler(&self) -> usize {
        self.next_handler.saturating_sub(1)
    }

    pub fn is_dropped(&self) -> bool {
        self.terminal == Some(Transition::Drop)
    }

    pub fn is_ended(&self) -> bool {
        self.terminal == Some(Transition::End)
    }

    /// Writes are ignored once the response was flushed or abandoned.
    pub fn is_frozen(&self) -> bool {
        self.terminal.is_some()
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records a transition. End and Drop are sticky; Drop outranks End.
    pub(crate) fn request(&mut self, transition: Transition) {
        match self.terminal {
            Some(Transition::Drop) => return,
            Some(Transition::End) if transition != Transition::Drop => return,
            _ => {}
        }

        if transition.is_terminal() {
            self.terminal = Some(transition);
        }
        self.pending = Some(transition);
    }

    pub(crate) fn take_pending(&mut self) -> Option<Transition> {
        self.pending.take()
    }

    /// Position the next route search starts from.
    pub(crate) fn search_from(&self) -> usize {
        self.route.map_or(0, |route| route + 1)
    }

    pub(crate) fn next_handler_index(&self) -> usize {
        self.next_handler
    }

    pub(crate) fn match_route(&mut self, route: usize) {
        self.route = Some(route);
        self.next_handler = 0;
        self.phase = Phase::Matched;
    }

    pub(crate) fn enter_handler(&mut self) {
        self.next_handler += 1;
        self.phase = Phase::Executing;
    }

    pub(crate) fn restart(&mut self) {
        self.route = None;
        self.next_handler = 0;
        self.phase = Phase::Unmatched;
    }

    pub(crate) fn terminate(&mut self) -> Termination {
        self.phase = Phase::Terminated;
        match self.terminal {
            Some(Transition::Drop) => Termination::Dropped,
            Some(Transition::End) => Termination::Ended,
            _ => Termination::Completed,
        }
    }

    pub(crate) fn release(&mut self) {
        self.reset();
        self.phase = Phase::Released;
    }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod dispatch_test;
